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

use crate::run;

fn items(values: &[i64]) -> ZiValue {
    ZiValue::Array(values.iter().map(|&v| ZiValue::Int(v)).collect())
}

#[test]
fn test_flatten_emits_one_row_per_element() {
    let input = ZiRow::new().with("id", "r1").with("items", items(&[10, 20, 30]));
    let out = run("flatten :items", vec![input]).unwrap();

    assert_eq!(out.len(), 3);
    for (row, expected) in out.iter().zip([10, 20, 30]) {
        assert_eq!(row.get("id"), Some(&ZiValue::from("r1")));
        assert_eq!(row.get("items"), Some(&ZiValue::Int(expected)));
    }
}

#[test]
fn test_flatten_empty_array_keeps_one_null_row() {
    let input = ZiRow::new().with("id", "r1").with("items", items(&[]));
    let out = run("flatten :items", vec![input]).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("items"), Some(&ZiValue::Null));
    assert_eq!(out[0].get("id"), Some(&ZiValue::from("r1")));
}

#[test]
fn test_flatten_pads_ragged_arrays() {
    let input = ZiRow::new().with("a", items(&[1, 2, 3])).with("b", items(&[7]));
    let out = run("flatten :a,:b", vec![input]).unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].get("b"), Some(&ZiValue::Int(7)));
    assert_eq!(out[1].get("b"), Some(&ZiValue::Null));
    assert_eq!(out[2].get("a"), Some(&ZiValue::Int(3)));
}

#[test]
fn test_flatten_adds_missing_columns_as_null() {
    let input = ZiRow::new().with("a", items(&[1, 2]));
    let out = run("flatten :a :b", vec![input]).unwrap();

    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|row| row.get("b") == Some(&ZiValue::Null)));
}

#[test]
fn test_flatten_keeps_rows_without_target_columns() {
    let rows = vec![
        ZiRow::new().with("items", items(&[1, 2])),
        ZiRow::new().with("other", 5),
        ZiRow::new().with("items", items(&[3])),
    ];
    let out = run("flatten :items", rows).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[2].get("other"), Some(&ZiValue::Int(5)));
}
