//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use zi_wrangle::directive::{ZiDirective, ZiDirectiveState, ZiExecutorContext};
use zi_wrangle::dsl::ZiUsageDefinition;
use zi_wrangle::errors::{Result, ZiError};
use zi_wrangle::pipeline::{ZiPipelinePhase, ZiRecipeRunner};
use zi_wrangle::record::{ZiRow, ZiRowBatch, ZiValue};
use zi_wrangle::registry::{ZiDirectiveEntry, ZiDirectiveRegistry};
use zi_wrangle::token::{ZiArguments, ZiTokenType};
use zi_wrangle::ZiEngineConfig;

static BOOM_DESTROYED: AtomicUsize = AtomicUsize::new(0);
static PICKY_DESTROYED: AtomicUsize = AtomicUsize::new(0);

/// Passes rows through and emits how many it saw when finishing.
#[derive(Debug, Default)]
struct Tally;

impl ZiDirective for Tally {
    fn name(&self) -> &'static str {
        "tally"
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder("tally").build()
    }

    fn initialize(&mut self, _args: &ZiArguments) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, rows: ZiRowBatch, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        ctx.store().increment("seen", rows.len() as i64)?;
        Ok(rows)
    }

    fn finish(&mut self, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        let seen = ctx.store().int("seen")?;
        Ok(vec![ZiRow::new().with("tally", seen)])
    }
}

/// Fails on any row holding `explode`.
#[derive(Debug, Default)]
struct Boom;

impl ZiDirective for Boom {
    fn name(&self) -> &'static str {
        "boom"
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder("boom").build()
    }

    fn initialize(&mut self, _args: &ZiArguments) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, rows: ZiRowBatch, _ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        if rows.iter().any(|row| row.get("explode").is_some()) {
            return Err(ZiError::internal("row asked to explode"));
        }
        Ok(rows)
    }

    fn destroy(&mut self) {
        BOOM_DESTROYED.fetch_add(1, Ordering::SeqCst);
    }
}

/// Requires a column argument; counts its teardowns.
#[derive(Debug, Default)]
struct Picky;

impl ZiDirective for Picky {
    fn name(&self) -> &'static str {
        "picky"
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder("picky")
            .define("column", ZiTokenType::ColumnName)
            .build()
    }

    fn initialize(&mut self, _args: &ZiArguments) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, rows: ZiRowBatch, _ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        Ok(rows)
    }

    fn destroy(&mut self) {
        PICKY_DESTROYED.fetch_add(1, Ordering::SeqCst);
    }
}

fn picky() -> Box<dyn ZiDirective + Send> {
    Box::new(Picky)
}

fn tally() -> Box<dyn ZiDirective + Send> {
    Box::new(Tally)
}

fn boom() -> Box<dyn ZiDirective + Send> {
    Box::new(Boom)
}

fn registry() -> Arc<ZiDirectiveRegistry> {
    let mut registry = ZiDirectiveRegistry::with_defaults();
    registry
        .register(ZiDirectiveEntry {
            name: "tally",
            description: "Counts rows.",
            categories: &["test"],
            factory: tally,
        })
        .unwrap();
    registry
        .register(ZiDirectiveEntry {
            name: "boom",
            description: "Fails on demand.",
            categories: &["test"],
            factory: boom,
        })
        .unwrap();
    registry
        .register(ZiDirectiveEntry {
            name: "picky",
            description: "Needs a column.",
            categories: &["test"],
            factory: picky,
        })
        .unwrap();
    Arc::new(registry)
}

fn rows(n: usize) -> ZiRowBatch {
    (0..n).map(|i| ZiRow::new().with("i", i as i64)).collect()
}

#[test]
fn test_finish_output_flows_through_later_directives() {
    let runner = ZiRecipeRunner::new("tally\ntally").with_registry(registry());
    let out = runner.run(rows(3)).unwrap();

    assert_eq!(out.len(), 5);
    assert_eq!(out[3].get("tally"), Some(&ZiValue::Int(3)));
    assert_eq!(out[4].get("tally"), Some(&ZiValue::Int(4)));
}

#[test]
fn test_multiple_batches_before_finish() {
    let mut pipeline = ZiRecipeRunner::new("tally")
        .with_registry(registry())
        .compile()
        .unwrap()
        .into_pipeline();

    assert_eq!(pipeline.phase(), ZiPipelinePhase::Ready);
    assert_eq!(pipeline.execute(rows(2)).unwrap().len(), 2);
    assert_eq!(pipeline.execute(rows(5)).unwrap().len(), 5);
    let tail = pipeline.finish().unwrap();

    assert_eq!(tail, vec![ZiRow::new().with("tally", 7)]);
    assert_eq!(pipeline.phase(), ZiPipelinePhase::Finished);
    assert_eq!(pipeline.states(), vec![("tally", ZiDirectiveState::Finished)]);
    assert!(matches!(pipeline.execute(rows(1)), Err(ZiError::Pipeline { .. })));
}

#[test]
fn test_failure_aborts_and_destroys_every_directive() {
    let mut pipeline = ZiRecipeRunner::new("flatten :items\nboom\nflatten :other")
        .with_registry(registry())
        .compile()
        .unwrap()
        .into_pipeline();
    let before = BOOM_DESTROYED.load(Ordering::SeqCst);

    assert!(pipeline.execute(rows(2)).is_ok());
    let err = pipeline
        .execute(vec![ZiRow::new().with("explode", true)])
        .unwrap_err();

    assert!(matches!(err, ZiError::DirectiveExecution { ref directive, .. } if directive == "boom"));
    assert_eq!(pipeline.phase(), ZiPipelinePhase::Failed);
    assert!(pipeline
        .states()
        .iter()
        .all(|(_, state)| *state == ZiDirectiveState::Destroyed));
    assert!(matches!(pipeline.finish(), Err(ZiError::Pipeline { .. })));

    drop(pipeline);
    assert_eq!(BOOM_DESTROYED.load(Ordering::SeqCst) - before, 1);
}

#[test]
fn test_run_many_keeps_executions_apart() {
    let runner = ZiRecipeRunner::new("aggregate-stats :size :time :bytes :nanos");
    let inputs = vec![
        vec![ZiRow::new().with("size", "1KB").with("time", "1ms")],
        Vec::new(),
        vec![
            ZiRow::new().with("size", "2KB").with("time", "1s"),
            ZiRow::new().with("size", "2KB").with("time", "1s"),
        ],
    ];
    let outputs = runner.run_many(inputs).unwrap();

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0][0].get("bytes"), Some(&ZiValue::Int(1024)));
    assert!(outputs[1].is_empty());
    assert_eq!(outputs[2][0].get("bytes"), Some(&ZiValue::Int(4096)));
    assert_eq!(outputs[2][0].get("nanos"), Some(&ZiValue::Int(2_000_000_000)));
}

#[test]
fn test_lineage_is_static() {
    let recipe = ZiRecipeRunner::new("flatten :items\ntext-metric cosine :a :b :score")
        .compile()
        .unwrap();
    let lineage = recipe.lineage();

    assert_eq!(lineage.len(), 2);
    assert_eq!(lineage.entries()[1].statement, 1);
    assert_eq!(lineage.writers_of("score").len(), 1);
    assert_eq!(lineage.upstream_of("score"), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_unbound_directive_is_destroyed() {
    let err = ZiRecipeRunner::new("picky")
        .with_registry(registry())
        .compile()
        .unwrap_err();

    assert!(matches!(err, ZiError::Compile { .. }));
    assert_eq!(err.syntax_errors()[0].line, 1);
    assert_eq!(PICKY_DESTROYED.load(Ordering::SeqCst), 1);
}

#[test]
fn test_config_installs_logger() {
    let mut config = ZiEngineConfig::default();
    config.log.default_level = "DEBUG".to_string();
    let runner = ZiRecipeRunner::new("flatten :items").with_config(config);

    assert_ne!(log::max_level(), log::LevelFilter::Off);
    assert!(runner.run(Vec::new()).unwrap().is_empty());
}

#[test]
fn test_config_file_drives_runner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "aliases:\n  explode: flatten\nexcluded: [parse-as-log]\nbatch_size: 2\n",
    )
    .unwrap();
    let config = ZiEngineConfig::from_path(&path).unwrap();
    assert_eq!(config.batch_size, Some(2));

    let runner = ZiRecipeRunner::new("explode :items").with_config(config.clone());
    let input = vec![ZiRow::new().with("items", ZiValue::Array(vec![1.into(), 2.into(), 3.into()]))];
    assert_eq!(runner.run(input).unwrap().len(), 3);

    let err = ZiRecipeRunner::new("parse-as-log :line common")
        .with_config(config)
        .run(Vec::new())
        .unwrap_err();
    assert!(matches!(err, ZiError::Compile { .. }));
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(ZiEngineConfig::from_json_str(r#"{"batch_size": 0}"#).is_err());
    assert!(ZiEngineConfig::from_json_str(r#"{"aliases": {"a": "b", "b": "flatten"}}"#).is_err());
}
