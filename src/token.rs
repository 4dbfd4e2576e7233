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


//! # Zi Wrangle Token Module
//!
//! Typed argument values bound from recipe text. [`ZiToken`] is a closed set
//! of variants, one per [`ZiTokenType`], each holding its parsed value. The
//! binder collects tokens into a [`ZiArguments`] bag that directives read
//! while initializing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::literal::{ZiByteSize, ZiTimeDuration};
use crate::record::ZiValue;

/// The argument types a directive can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiTokenType {
    DirectiveName,
    ColumnName,
    ColumnNameList,
    Text,
    QuotedString,
    Numeric,
    ByteSize,
    TimeDuration,
    Property,
}

impl ZiTokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiTokenType::DirectiveName => "directive name",
            ZiTokenType::ColumnName => "column name",
            ZiTokenType::ColumnNameList => "column name list",
            ZiTokenType::Text => "text",
            ZiTokenType::QuotedString => "quoted string",
            ZiTokenType::Numeric => "numeric",
            ZiTokenType::ByteSize => "byte size",
            ZiTokenType::TimeDuration => "time duration",
            ZiTokenType::Property => "property",
        }
    }
}

impl fmt::Display for ZiTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number literal; integers stay exact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiNumeric {
    Int(i64),
    Float(f64),
}

impl ZiNumeric {
    pub fn as_f64(&self) -> f64 {
        match self {
            ZiNumeric::Int(value) => *value as f64,
            ZiNumeric::Float(value) => *value,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ZiNumeric::Int(value) => Some(*value),
            ZiNumeric::Float(_) => None,
        }
    }
}

impl fmt::Display for ZiNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiNumeric::Int(value) => write!(f, "{value}"),
            ZiNumeric::Float(value) => write!(f, "{value}"),
        }
    }
}

/// `key:value` pair with the value kept as written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiProperty {
    pub key: String,
    pub value: String,
}

/// A bound argument value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiToken {
    DirectiveName(String),
    ColumnName(String),
    ColumnNameList(Vec<String>),
    Text(String),
    QuotedString(String),
    Numeric(ZiNumeric),
    ByteSize(ZiByteSize),
    TimeDuration(ZiTimeDuration),
    Property(ZiProperty),
}

impl ZiToken {
    pub fn token_type(&self) -> ZiTokenType {
        match self {
            ZiToken::DirectiveName(_) => ZiTokenType::DirectiveName,
            ZiToken::ColumnName(_) => ZiTokenType::ColumnName,
            ZiToken::ColumnNameList(_) => ZiTokenType::ColumnNameList,
            ZiToken::Text(_) => ZiTokenType::Text,
            ZiToken::QuotedString(_) => ZiTokenType::QuotedString,
            ZiToken::Numeric(_) => ZiTokenType::Numeric,
            ZiToken::ByteSize(_) => ZiTokenType::ByteSize,
            ZiToken::TimeDuration(_) => ZiTokenType::TimeDuration,
            ZiToken::Property(_) => ZiTokenType::Property,
        }
    }

    /// Row value equivalent of the token.
    pub fn to_value(&self) -> ZiValue {
        match self {
            ZiToken::DirectiveName(text)
            | ZiToken::ColumnName(text)
            | ZiToken::Text(text)
            | ZiToken::QuotedString(text) => ZiValue::String(text.clone()),
            ZiToken::ColumnNameList(columns) => {
                ZiValue::Array(columns.iter().map(|c| ZiValue::String(c.clone())).collect())
            }
            ZiToken::Numeric(ZiNumeric::Int(value)) => ZiValue::Int(*value),
            ZiToken::Numeric(ZiNumeric::Float(value)) => ZiValue::Float(*value),
            ZiToken::ByteSize(size) => ZiValue::ByteSize(size.clone()),
            ZiToken::TimeDuration(duration) => ZiValue::TimeDuration(duration.clone()),
            ZiToken::Property(property) => {
                ZiValue::String(format!("{}:{}", property.key, property.value))
            }
        }
    }
}

impl fmt::Display for ZiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiToken::ColumnNameList(columns) => f.write_str(&columns.join(",")),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

/// Arguments bound for one statement, keyed by the usage definition's names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiArguments {
    directive: String,
    line: usize,
    values: Vec<(String, ZiToken)>,
}

impl ZiArguments {
    pub fn new(directive: impl Into<String>, line: usize) -> Self {
        ZiArguments {
            directive: directive.into(),
            line,
            values: Vec::new(),
        }
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Source line of the statement these arguments came from.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn insert(&mut self, name: impl Into<String>, token: ZiToken) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ZiError::recipe_parse(
                &self.directive,
                format!("argument '{name}' is specified more than once"),
            ));
        }
        self.values.push((name, token));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(key, _)| key == name)
    }

    pub fn get(&self, name: &str) -> Option<&ZiToken> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, token)| token)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ZiToken)> {
        self.values.iter().map(|(key, token)| (key.as_str(), token))
    }

    fn require(&self, name: &str) -> Result<&ZiToken> {
        self.get(name).ok_or_else(|| {
            ZiError::directive_parse(&self.directive, format!("argument '{name}' is missing"))
        })
    }

    fn mismatch(&self, name: &str, expected: ZiTokenType, token: &ZiToken) -> ZiError {
        ZiError::directive_parse(
            &self.directive,
            format!(
                "argument '{name}' is a {}, expected {expected}",
                token.token_type()
            ),
        )
    }

    pub fn column(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            ZiToken::ColumnName(column) => Ok(column),
            other => Err(self.mismatch(name, ZiTokenType::ColumnName, other)),
        }
    }

    /// Column list; a single column name reads as a one-element list.
    pub fn columns(&self, name: &str) -> Result<Vec<String>> {
        match self.require(name)? {
            ZiToken::ColumnNameList(columns) => Ok(columns.clone()),
            ZiToken::ColumnName(column) => Ok(vec![column.clone()]),
            other => Err(self.mismatch(name, ZiTokenType::ColumnNameList, other)),
        }
    }

    /// Text content of a text or quoted-string argument.
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            ZiToken::Text(text) | ZiToken::QuotedString(text) => Ok(text),
            other => Err(self.mismatch(name, ZiTokenType::Text, other)),
        }
    }

    /// Like [`ZiArguments::text`] but `None` when the argument was not given.
    pub fn optional_text(&self, name: &str) -> Result<Option<&str>> {
        if self.contains(name) {
            self.text(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn numeric(&self, name: &str) -> Result<ZiNumeric> {
        match self.require(name)? {
            ZiToken::Numeric(value) => Ok(*value),
            other => Err(self.mismatch(name, ZiTokenType::Numeric, other)),
        }
    }

    pub fn byte_size(&self, name: &str) -> Result<&ZiByteSize> {
        match self.require(name)? {
            ZiToken::ByteSize(size) => Ok(size),
            other => Err(self.mismatch(name, ZiTokenType::ByteSize, other)),
        }
    }

    pub fn time_duration(&self, name: &str) -> Result<&ZiTimeDuration> {
        match self.require(name)? {
            ZiToken::TimeDuration(duration) => Ok(duration),
            other => Err(self.mismatch(name, ZiTokenType::TimeDuration, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_check_token_types() {
        let mut args = ZiArguments::new("demo", 1);
        args.insert("col", ZiToken::ColumnName("a".into())).unwrap();
        args.insert("unit", ZiToken::Text("MB".into())).unwrap();

        assert_eq!(args.column("col").unwrap(), "a");
        assert_eq!(args.columns("col").unwrap(), vec!["a".to_string()]);
        assert_eq!(args.optional_text("unit").unwrap(), Some("MB"));
        assert_eq!(args.optional_text("mode").unwrap(), None);
        assert!(args.text("col").is_err());
        assert!(matches!(
            args.column("missing"),
            Err(ZiError::DirectiveParse { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut args = ZiArguments::new("demo", 3);
        args.insert("x", ZiToken::Numeric(ZiNumeric::Int(1))).unwrap();
        let err = args.insert("x", ZiToken::Numeric(ZiNumeric::Int(2))).unwrap_err();
        assert!(matches!(err, ZiError::RecipeParse { .. }));
        assert_eq!(args.len(), 1);
    }
}
