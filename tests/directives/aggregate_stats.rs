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


use zi_wrangle::{ZiEngineConfig, ZiRecipeRunner, ZiRow, ZiValue};

use crate::{row, run};

const RECIPE: &str = "aggregate-stats :size :time :total_mb :total_s size_unit:MB time_unit:s time_mode:total";

fn sample() -> Vec<ZiRow> {
    vec![
        row(&[("size", "1MB"), ("time", "100ms")]),
        row(&[("size", "512KB"), ("time", "0.5s")]),
        row(&[("size", "2097152"), ("time", "1500ms")]),
    ]
}

fn number(row: &ZiRow, column: &str) -> f64 {
    row.get(column).and_then(ZiValue::as_f64).unwrap()
}

#[test]
fn test_aggregate_stats_emits_single_summary_row() {
    let out = run(RECIPE, sample()).unwrap();

    assert_eq!(out.len(), 1);
    assert!((number(&out[0], "total_mb") - 3.5).abs() < 0.001);
    assert!((number(&out[0], "total_s") - 2.1).abs() < 0.001);
    assert_eq!(out[0].column_names(), vec!["total_mb", "total_s"]);
}

#[test]
fn test_aggregate_stats_same_totals_when_chunked() {
    let runner = ZiRecipeRunner::new(RECIPE).with_config(ZiEngineConfig::default().with_batch_size(1));
    let out = runner.run(sample()).unwrap();

    assert_eq!(out.len(), 1);
    assert!((number(&out[0], "total_mb") - 3.5).abs() < 0.001);
}

#[test]
fn test_aggregate_stats_average_in_milliseconds() {
    let recipe = "aggregate-stats :size :time :bytes :avg_ms time_unit:MS time_mode:AVERAGE";
    let out = run(recipe, sample()).unwrap();

    assert_eq!(out[0].get("bytes"), Some(&ZiValue::Int(3_670_016)));
    assert!((number(&out[0], "avg_ms") - 700.0).abs() < 0.001);
}

#[test]
fn test_aggregate_stats_without_rows_emits_nothing() {
    assert!(run(RECIPE, Vec::new()).unwrap().is_empty());
}

#[test]
fn test_aggregate_stats_feeds_later_directives() {
    let recipe = format!("{RECIPE}\ntext-metric identity :total_mb :total_s :same");
    let out = run(&recipe, sample()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("same"), Some(&ZiValue::Float(0.0)));
}
