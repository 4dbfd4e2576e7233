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


//! Intermediate representation produced by the recipe parser: one
//! [`ZiStatement`] per recipe line, each carrying classified fragments with
//! their source spans.

use serde::{Deserialize, Serialize};

use crate::literal::{ZiByteSize, ZiTimeDuration};
use crate::token::ZiNumeric;

/// Source location of a fragment. `line` is 1-based; `start` and `end` are
/// 0-based character offsets and `end` is inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZiSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl ZiSpan {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        ZiSpan { line, start, end }
    }
}

/// Syntactic class of a fragment, decided once while scanning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZiFragmentKind {
    /// `:name`
    Column(String),
    /// `a,b` or `:a,:b`
    ColumnList(Vec<String>),
    Identifier(String),
    /// Unescaped content of a `'...'` or `"..."` string.
    Quoted(String),
    Numeric(ZiNumeric),
    ByteSize(ZiByteSize),
    TimeDuration(ZiTimeDuration),
    Text(String),
    Property {
        key: String,
        value: Box<ZiFragment>,
    },
}

impl ZiFragmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ZiFragmentKind::Column(_) => "column reference",
            ZiFragmentKind::ColumnList(_) => "column list",
            ZiFragmentKind::Identifier(_) => "identifier",
            ZiFragmentKind::Quoted(_) => "quoted string",
            ZiFragmentKind::Numeric(_) => "number",
            ZiFragmentKind::ByteSize(_) => "byte size",
            ZiFragmentKind::TimeDuration(_) => "time duration",
            ZiFragmentKind::Text(_) => "text",
            ZiFragmentKind::Property { .. } => "property",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiFragment {
    pub kind: ZiFragmentKind,
    /// Text as written, quotes included.
    pub text: String,
    pub span: ZiSpan,
}

impl ZiFragment {
    /// Text without surrounding quotes.
    pub fn content(&self) -> &str {
        match &self.kind {
            ZiFragmentKind::Quoted(content) => content,
            _ => &self.text,
        }
    }
}

/// One parsed recipe line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiStatement {
    pub directive: String,
    pub name_span: ZiSpan,
    pub fragments: Vec<ZiFragment>,
    pub line: usize,
    /// The trimmed source line.
    pub text: String,
}

impl ZiStatement {
    /// Span covering the whole statement.
    pub fn span(&self) -> ZiSpan {
        let end = self
            .fragments
            .last()
            .map_or(self.name_span.end, |fragment| fragment.span.end);
        ZiSpan::new(self.line, self.name_span.start, end)
    }
}
