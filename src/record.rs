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


//! # Zi Wrangle Record Module
//!
//! This module provides the row data model that directives operate on. A
//! [`ZiRow`] is an ordered sequence of `(column, value)` pairs whose values are
//! dynamically typed [`ZiValue`]s.
//!
//! ## Design Principles
//!
//! - **Ordered columns**: rows keep insertion order; lookups by name return
//!   the first matching column
//! - **Value semantics**: rows are cheap to clone, and directives producing
//!   several outputs from one input copy the row rather than share it
//! - **JSON interop**: rows convert to and from JSON objects so hosting code
//!   can feed records without depending on the value enum
//!
//! ## Usage Example
//!
//! ```rust
//! use zi_wrangle::record::{ZiRow, ZiValue};
//!
//! let mut row = ZiRow::new()
//!     .with("id", 7)
//!     .with("items", ZiValue::Array(vec!["a".into(), "b".into()]));
//!
//! row.add_or_set("status", "ok");
//! assert_eq!(row.width(), 3);
//! assert_eq!(row.get("id"), Some(&ZiValue::Int(7)));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::literal::{ZiByteSize, ZiTimeDuration};

/// Dynamically typed cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<ZiValue>),
    ByteSize(ZiByteSize),
    TimeDuration(ZiTimeDuration),
}

impl ZiValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ZiValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZiValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ZiValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ZiValue::Int(value) => Some(*value as f64),
            ZiValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ZiValue]> {
        match self {
            ZiValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ZiValue::Null => "null",
            ZiValue::Bool(_) => "bool",
            ZiValue::Int(_) => "int",
            ZiValue::Float(_) => "float",
            ZiValue::String(_) => "string",
            ZiValue::Bytes(_) => "bytes",
            ZiValue::Array(_) => "array",
            ZiValue::ByteSize(_) => "byte size",
            ZiValue::TimeDuration(_) => "time duration",
        }
    }

    /// Converts a JSON value. Objects have no row-level counterpart and are
    /// kept as their serialized text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ZiValue::Null,
            Value::Bool(flag) => ZiValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => ZiValue::Int(int),
                None => ZiValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => ZiValue::String(text.clone()),
            Value::Array(items) => ZiValue::Array(items.iter().map(ZiValue::from_json).collect()),
            Value::Object(_) => ZiValue::String(value.to_string()),
        }
    }

    /// Converts to JSON. Literal values render as their original text, bytes
    /// as an array of numbers and non-finite floats as null.
    pub fn to_json(&self) -> Value {
        match self {
            ZiValue::Null => Value::Null,
            ZiValue::Bool(flag) => Value::Bool(*flag),
            ZiValue::Int(int) => Value::Number((*int).into()),
            ZiValue::Float(float) => Number::from_f64(*float).map_or(Value::Null, Value::Number),
            ZiValue::String(text) => Value::String(text.clone()),
            ZiValue::Bytes(bytes) => {
                Value::Array(bytes.iter().map(|byte| Value::Number((*byte).into())).collect())
            }
            ZiValue::Array(items) => Value::Array(items.iter().map(ZiValue::to_json).collect()),
            ZiValue::ByteSize(size) => Value::String(size.original().to_string()),
            ZiValue::TimeDuration(duration) => Value::String(duration.original().to_string()),
        }
    }
}

impl fmt::Display for ZiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiValue::String(text) => f.write_str(text),
            ZiValue::ByteSize(size) => write!(f, "{size}"),
            ZiValue::TimeDuration(duration) => write!(f, "{duration}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for ZiValue {
    fn from(value: &str) -> Self {
        ZiValue::String(value.to_string())
    }
}

impl From<String> for ZiValue {
    fn from(value: String) -> Self {
        ZiValue::String(value)
    }
}

impl From<i64> for ZiValue {
    fn from(value: i64) -> Self {
        ZiValue::Int(value)
    }
}

impl From<i32> for ZiValue {
    fn from(value: i32) -> Self {
        ZiValue::Int(i64::from(value))
    }
}

impl From<f64> for ZiValue {
    fn from(value: f64) -> Self {
        ZiValue::Float(value)
    }
}

impl From<bool> for ZiValue {
    fn from(value: bool) -> Self {
        ZiValue::Bool(value)
    }
}

impl From<Vec<ZiValue>> for ZiValue {
    fn from(values: Vec<ZiValue>) -> Self {
        ZiValue::Array(values)
    }
}

impl From<ZiByteSize> for ZiValue {
    fn from(value: ZiByteSize) -> Self {
        ZiValue::ByteSize(value)
    }
}

impl From<ZiTimeDuration> for ZiValue {
    fn from(value: ZiTimeDuration) -> Self {
        ZiValue::TimeDuration(value)
    }
}

impl<T: Into<ZiValue>> From<Option<T>> for ZiValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ZiValue::Null, Into::into)
    }
}

/// Ordered column-value record processed by directives.
///
/// Column names are not required to be unique; name lookups return the first
/// match. Positional accessors address a column by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiRow {
    columns: Vec<(String, ZiValue)>,
}

impl ZiRow {
    pub fn new() -> Self {
        ZiRow::default()
    }

    /// Builder-style append.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ZiValue>) -> Self {
        self.add(column, value);
        self
    }

    /// Appends a column even if one with the same name exists.
    pub fn add(&mut self, column: impl Into<String>, value: impl Into<ZiValue>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Replaces the first column named `column`, or appends it.
    pub fn add_or_set(&mut self, column: &str, value: impl Into<ZiValue>) {
        let value = value.into();
        match self.find(column) {
            Some(idx) => self.columns[idx].1 = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    /// Index of the first column named `column`.
    pub fn find(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|(name, _)| name == column)
    }

    pub fn get(&self, column: &str) -> Option<&ZiValue> {
        self.find(column).map(|idx| &self.columns[idx].1)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut ZiValue> {
        let idx = self.find(column)?;
        Some(&mut self.columns[idx].1)
    }

    pub fn column_at(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|(name, _)| name.as_str())
    }

    pub fn value_at(&self, idx: usize) -> Option<&ZiValue> {
        self.columns.get(idx).map(|(_, value)| value)
    }

    /// Overwrites the value at `idx`; returns false when out of range.
    pub fn set_value(&mut self, idx: usize, value: impl Into<ZiValue>) -> bool {
        match self.columns.get_mut(idx) {
            Some(slot) => {
                slot.1 = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, idx: usize) -> Option<(String, ZiValue)> {
        if idx < self.columns.len() {
            Some(self.columns.remove(idx))
        } else {
            None
        }
    }

    /// Removes the first column named `column`.
    pub fn remove_column(&mut self, column: &str) -> Option<ZiValue> {
        let idx = self.find(column)?;
        Some(self.columns.remove(idx).1)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ZiValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Builds a row from a JSON object, keeping key order.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(ZiRow {
            columns: object
                .iter()
                .map(|(name, value)| (name.clone(), ZiValue::from_json(value)))
                .collect(),
        })
    }

    /// JSON object view of the row. Duplicate column names keep the first
    /// value.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.columns {
            if !object.contains_key(name) {
                object.insert(name.clone(), value.to_json());
            }
        }
        Value::Object(object)
    }
}

impl<K: Into<String>, V: Into<ZiValue>> FromIterator<(K, V)> for ZiRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ZiRow {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Convenience alias for working on batches of rows.
pub type ZiRowBatch = Vec<ZiRow>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookups_return_first_match() {
        let mut row = ZiRow::new().with("a", 1).with("b", 2);
        row.add("a", 3);

        assert_eq!(row.find("a"), Some(0));
        assert_eq!(row.get("a"), Some(&ZiValue::Int(1)));
        assert_eq!(row.width(), 3);

        row.add_or_set("a", 10);
        assert_eq!(row.value_at(0), Some(&ZiValue::Int(10)));
        assert_eq!(row.value_at(2), Some(&ZiValue::Int(3)));
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let source = json!({"z": 1, "a": [true, null], "m": 1.5});
        let row = ZiRow::from_json(&source).unwrap();

        assert_eq!(row.column_names(), vec!["z", "a", "m"]);
        assert_eq!(row.to_json(), source);
        assert!(ZiRow::from_json(&json!([1, 2])).is_none());
    }

    #[test]
    fn removal_and_positional_updates() {
        let mut row: ZiRow = vec![("x", 1), ("y", 2)].into_iter().collect();

        assert!(row.set_value(1, 20));
        assert!(!row.set_value(5, 0));
        assert_eq!(row.remove_column("x"), Some(ZiValue::Int(1)));
        assert_eq!(row.column_at(0), Some("y"));
        assert_eq!(row.get("y"), Some(&ZiValue::Int(20)));
    }
}
