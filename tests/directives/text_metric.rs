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


use zi_wrangle::{ZiRow, ZiValue};

use crate::{row, run};

fn score(recipe: &str, input: ZiRow) -> f64 {
    let out = run(recipe, vec![input]).unwrap();
    out[0].get("score").and_then(ZiValue::as_f64).unwrap()
}

#[test]
fn test_text_metric_levenshtein() {
    let value = score(
        "text-metric levenshtein :a :b :score",
        row(&[("a", "kitten"), ("b", "sitting")]),
    );
    assert!((value - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
}

#[test]
fn test_text_metric_unknown_method_falls_back_to_cosine() {
    let input = row(&[("a", "red green blue"), ("b", "red green")]);
    let fallback = score("text-metric sorcery :a :b :score", input.clone());
    let cosine = score("text-metric cosine :a :b :score", input);
    assert_eq!(fallback, cosine);
    assert!(cosine > 0.8 && cosine < 0.9);
}

#[test]
fn test_text_metric_missing_inputs_score_zero() {
    let recipe = "text-metric jaro :a :b :score";
    assert_eq!(score(recipe, row(&[("a", "x")])), 0.0);
    assert_eq!(score(recipe, row(&[("a", "x"), ("b", "")])), 0.0);
    assert_eq!(score(recipe, ZiRow::new().with("a", "x").with("b", ZiValue::Null)), 0.0);
    assert_eq!(score(recipe, ZiRow::new().with("a", "x").with("b", 5)), 0.0);
}

#[test]
fn test_text_metric_keeps_source_columns() {
    let out = run(
        "text-metric dice :a :b :score",
        vec![row(&[("a", "one two"), ("b", "two three")])],
    )
    .unwrap();
    assert_eq!(out[0].column_names(), vec!["a", "b", "score"]);
}
