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


//! # Zi Wrangle Pipeline Module
//!
//! Execution side of a compiled recipe.
//!
//! - [`ZiRecipe`]: initialized directive instances in statement order plus the
//!   recipe's static lineage
//! - [`ZiRecipePipeline`]: one execution of a recipe. Batches flow through
//!   every directive in order; `finish` then runs each directive's finish
//!   stage and routes its output through the directives after it; `destroy`
//!   tears everything down exactly once
//! - [`ZiRecipeRunner`]: compiles a fresh recipe for every execution, so
//!   independent executions may run concurrently
//!
//! ## Usage Example
//!
//! ```rust
//! use zi_wrangle::pipeline::ZiRecipeRunner;
//! use zi_wrangle::record::{ZiRow, ZiValue};
//!
//! let runner = ZiRecipeRunner::new("flatten :items");
//! let rows = vec![ZiRow::new()
//!     .with("id", 1)
//!     .with("items", ZiValue::Array(vec![1.into(), 2.into()]))];
//! let output = runner.run(rows).unwrap();
//! assert_eq!(output.len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::ZiEngineConfig;
use crate::directive::{
    execute_directive, finish_directive, ZiDirective, ZiDirectiveState, ZiExecutorContext,
    ZiRowIssue,
};
use crate::dsl::compiler::ZiRecipeCompiler;
use crate::dsl::ir::ZiStatement;
use crate::errors::{Result, ZiError};
use crate::lineage::ZiLineageGraph;
use crate::log::ZiLogger;
use crate::record::{ZiRow, ZiRowBatch};
use crate::registry::ZiDirectiveRegistry;
use crate::store::{ZiStoreScope, ZiTransientStore};

/// A directive instance bound to one statement.
#[derive(Debug)]
pub struct ZiRecipeStep {
    index: usize,
    line: usize,
    text: String,
    directive: Box<dyn ZiDirective + Send>,
    state: ZiDirectiveState,
}

impl ZiRecipeStep {
    pub(crate) fn new(index: usize, statement: &ZiStatement, directive: Box<dyn ZiDirective + Send>) -> Self {
        ZiRecipeStep {
            index,
            line: statement.line,
            text: statement.text.clone(),
            directive,
            state: ZiDirectiveState::Initialized,
        }
    }

    /// Position of the statement in the recipe, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn name(&self) -> &'static str {
        self.directive.name()
    }

    pub fn state(&self) -> ZiDirectiveState {
        self.state
    }

    pub(crate) fn directive(&self) -> &dyn ZiDirective {
        self.directive.as_ref()
    }

    fn scope(&self) -> ZiStoreScope {
        ZiStoreScope::new(self.name(), self.index)
    }

    fn destroy(&mut self) {
        if self.state != ZiDirectiveState::Destroyed {
            self.directive.destroy();
            self.state = ZiDirectiveState::Destroyed;
            log::debug!("directive '{}' (statement {}) destroyed", self.name(), self.index);
        }
    }
}

/// A compiled recipe. Dropping it destroys any directive that was not
/// destroyed yet.
#[derive(Debug)]
pub struct ZiRecipe {
    steps: Vec<ZiRecipeStep>,
    lineage: ZiLineageGraph,
}

impl ZiRecipe {
    pub(crate) fn new(steps: Vec<ZiRecipeStep>, lineage: ZiLineageGraph) -> Self {
        ZiRecipe { steps, lineage }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ZiRecipeStep] {
        &self.steps
    }

    pub fn directive_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(ZiRecipeStep::name).collect()
    }

    pub fn lineage(&self) -> &ZiLineageGraph {
        &self.lineage
    }

    pub fn into_pipeline(self) -> ZiRecipePipeline {
        ZiRecipePipeline::new(self)
    }

    fn destroy_all(&mut self) {
        for step in &mut self.steps {
            step.destroy();
        }
    }
}

impl Drop for ZiRecipe {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

/// Where a pipeline is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiPipelinePhase {
    Ready,
    Running,
    Finished,
    Failed,
    Destroyed,
}

impl fmt::Display for ZiPipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZiPipelinePhase::Ready => "ready",
            ZiPipelinePhase::Running => "running",
            ZiPipelinePhase::Finished => "finished",
            ZiPipelinePhase::Failed => "failed",
            ZiPipelinePhase::Destroyed => "destroyed",
        };
        f.write_str(label)
    }
}

/// One execution of a recipe.
///
/// `execute` may be called any number of times before `finish`. The first
/// failure destroys every directive and leaves the pipeline unusable.
#[derive(Debug)]
pub struct ZiRecipePipeline {
    recipe: ZiRecipe,
    store: ZiTransientStore,
    issues: Vec<ZiRowIssue>,
    phase: ZiPipelinePhase,
}

impl ZiRecipePipeline {
    pub fn new(recipe: ZiRecipe) -> Self {
        ZiRecipePipeline {
            recipe,
            store: ZiTransientStore::new(),
            issues: Vec::new(),
            phase: ZiPipelinePhase::Ready,
        }
    }

    pub fn phase(&self) -> ZiPipelinePhase {
        self.phase
    }

    pub fn lineage(&self) -> &ZiLineageGraph {
        self.recipe.lineage()
    }

    /// Recoverable row problems reported so far.
    pub fn issues(&self) -> &[ZiRowIssue] {
        &self.issues
    }

    pub fn take_issues(&mut self) -> Vec<ZiRowIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Lifecycle state of every directive, in statement order.
    pub fn states(&self) -> Vec<(&'static str, ZiDirectiveState)> {
        self.recipe
            .steps
            .iter()
            .map(|step| (step.name(), step.state()))
            .collect()
    }

    pub fn store(&self) -> &ZiTransientStore {
        &self.store
    }

    fn ensure_open(&self, stage: &str) -> Result<()> {
        match self.phase {
            ZiPipelinePhase::Ready | ZiPipelinePhase::Running => Ok(()),
            other => Err(ZiError::pipeline(
                stage,
                format!("pipeline is already {other}"),
            )),
        }
    }

    /// Sends `rows` through the directives from position `from` on.
    fn flow(&mut self, from: usize, rows: ZiRowBatch) -> Result<ZiRowBatch> {
        let mut current = rows;
        for step in self.recipe.steps.iter_mut().skip(from) {
            step.state = ZiDirectiveState::Executing;
            let mut ctx = ZiExecutorContext::new(self.store.scoped(step.scope()), &mut self.issues);
            current = execute_directive(step.directive.as_mut(), current, &mut ctx)?;
        }
        Ok(current)
    }

    fn fail(&mut self, err: ZiError) -> ZiError {
        log::error!("recipe execution failed: {err}");
        self.recipe.destroy_all();
        self.phase = ZiPipelinePhase::Failed;
        err
    }

    /// Runs one batch through every directive.
    pub fn execute(&mut self, rows: ZiRowBatch) -> Result<ZiRowBatch> {
        self.ensure_open("execute")?;
        self.phase = ZiPipelinePhase::Running;
        self.flow(0, rows).map_err(|err| self.fail(err))
    }

    /// Runs every finish stage in statement order. Rows a directive emits
    /// while finishing pass through the directives that follow it before
    /// those finish in turn.
    pub fn finish(&mut self) -> Result<ZiRowBatch> {
        self.ensure_open("finish")?;
        let mut output = Vec::new();

        for idx in 0..self.recipe.steps.len() {
            let finished = {
                let step = &mut self.recipe.steps[idx];
                let mut ctx =
                    ZiExecutorContext::new(self.store.scoped(step.scope()), &mut self.issues);
                finish_directive(step.directive.as_mut(), &mut ctx)
            };
            let emitted = match finished {
                Ok(rows) => rows,
                Err(err) => return Err(self.fail(err)),
            };
            let step = &mut self.recipe.steps[idx];
            step.state = ZiDirectiveState::Finished;
            log::debug!(
                "directive '{}' (statement {}) finished with {} row(s)",
                step.name(),
                step.index,
                emitted.len()
            );

            if !emitted.is_empty() {
                match self.flow(idx + 1, emitted) {
                    Ok(rows) => output.extend(rows),
                    Err(err) => return Err(self.fail(err)),
                }
            }
        }

        self.phase = ZiPipelinePhase::Finished;
        Ok(output)
    }

    /// Destroys every directive. Calling it again has no effect.
    pub fn destroy(&mut self) {
        self.recipe.destroy_all();
        if self.phase != ZiPipelinePhase::Failed {
            self.phase = ZiPipelinePhase::Destroyed;
        }
    }

    /// Executes `rows` as the whole input, then finishes and destroys.
    pub fn run(&mut self, rows: ZiRowBatch) -> Result<ZiRowBatch> {
        let mut output = self.execute(rows)?;
        output.extend(self.finish()?);
        self.destroy();
        Ok(output)
    }

    /// Like [`ZiRecipePipeline::run`] but feeds the input in chunks of
    /// `chunk_size` rows.
    pub fn run_chunked(&mut self, rows: ZiRowBatch, chunk_size: usize) -> Result<ZiRowBatch> {
        if chunk_size == 0 {
            return Err(ZiError::validation("chunk size must be greater than zero"));
        }
        let mut output = Vec::new();
        let mut rows = rows.into_iter();
        loop {
            let chunk: Vec<ZiRow> = rows.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            output.extend(self.execute(chunk)?);
        }
        output.extend(self.finish()?);
        self.destroy();
        Ok(output)
    }
}

impl Drop for ZiRecipePipeline {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Compiles and runs one recipe source, once per execution.
#[derive(Clone, Debug)]
pub struct ZiRecipeRunner {
    source: String,
    registry: Arc<ZiDirectiveRegistry>,
    config: ZiEngineConfig,
}

impl ZiRecipeRunner {
    /// Runner over the built-in directives with the default configuration.
    pub fn new(source: impl Into<String>) -> Self {
        ZiRecipeRunner {
            source: source.into(),
            registry: Arc::new(ZiDirectiveRegistry::with_defaults()),
            config: ZiEngineConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<ZiDirectiveRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the configuration and installs the global logger it
    /// describes. Only the first logger installed in a process takes effect.
    pub fn with_config(mut self, config: ZiEngineConfig) -> Self {
        match ZiLogger::init(config.log.clone()) {
            Ok(true) => log::debug!("logger installed at {}", config.log.default_level),
            Ok(false) => {}
            Err(err) => log::warn!("logging configuration ignored: {err}"),
        }
        self.config = config;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn config(&self) -> &ZiEngineConfig {
        &self.config
    }

    /// A fresh recipe with new directive instances.
    pub fn compile(&self) -> Result<ZiRecipe> {
        ZiRecipeCompiler::new(&self.registry, &self.config).compile(&self.source)
    }

    /// Runs the recipe over `rows`, chunked by the configured batch size.
    pub fn run(&self, rows: ZiRowBatch) -> Result<ZiRowBatch> {
        let mut pipeline = self.compile()?.into_pipeline();
        match self.config.batch_size {
            Some(size) => pipeline.run_chunked(rows, size),
            None => pipeline.run(rows),
        }
    }

    /// Runs independent executions, one per input, each with its own
    /// directive instances and store. Results keep input order.
    pub fn run_many(&self, inputs: Vec<ZiRowBatch>) -> Result<Vec<ZiRowBatch>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            inputs.into_par_iter().map(|rows| self.run(rows)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            inputs.into_iter().map(|rows| self.run(rows)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ZiValue;

    #[test]
    fn lifecycle_misuse_is_reported() {
        let mut pipeline = ZiRecipeRunner::new("flatten :a").compile().unwrap().into_pipeline();
        assert_eq!(pipeline.states(), vec![("flatten", ZiDirectiveState::Initialized)]);

        pipeline.execute(vec![ZiRow::new().with("a", 1)]).unwrap();
        assert_eq!(pipeline.phase(), ZiPipelinePhase::Running);
        assert!(pipeline.finish().unwrap().is_empty());
        assert!(matches!(pipeline.execute(Vec::new()), Err(ZiError::Pipeline { .. })));
        assert!(matches!(pipeline.finish(), Err(ZiError::Pipeline { .. })));

        pipeline.destroy();
        pipeline.destroy();
        assert_eq!(pipeline.states(), vec![("flatten", ZiDirectiveState::Destroyed)]);
        assert_eq!(pipeline.phase(), ZiPipelinePhase::Destroyed);
    }

    #[test]
    fn failure_destroys_and_closes_pipeline() {
        let mut pipeline = ZiRecipeRunner::new("parse-as-log :line common")
            .compile()
            .unwrap()
            .into_pipeline();
        let err = pipeline.execute(vec![ZiRow::new().with("line", ZiValue::Null)]).unwrap_err();

        assert!(matches!(err, ZiError::DirectiveExecution { .. }));
        assert_eq!(pipeline.phase(), ZiPipelinePhase::Failed);
        assert_eq!(pipeline.states()[0].1, ZiDirectiveState::Destroyed);
        assert!(pipeline.execute(Vec::new()).is_err());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut pipeline = ZiRecipeRunner::new("flatten :a").compile().unwrap().into_pipeline();
        assert!(pipeline.run_chunked(Vec::new(), 0).is_err());
    }
}
