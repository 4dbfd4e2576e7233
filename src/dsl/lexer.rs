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


//! Line scanner for recipe source.
//!
//! Each line is split into whitespace separated words (quoted strings may
//! contain whitespace) and every word is classified into a [`ZiFragment`].
//! Word classes are tried in this order: `:column`, column list, `key:value`
//! property, byte size, time duration, number, identifier, free text.

use std::sync::OnceLock;

use crate::dsl::ir::{ZiFragment, ZiFragmentKind, ZiSpan, ZiStatement};
use crate::errors::{Result, ZiError, ZiSyntaxError};
use crate::literal::{cached_pattern, ZiByteSize, ZiPatternCell, ZiTimeDuration};
use crate::token::ZiNumeric;

static DIRECTIVE_NAME: ZiPatternCell = OnceLock::new();
static IDENTIFIER: ZiPatternCell = OnceLock::new();
static COLUMN: ZiPatternCell = OnceLock::new();
static LIST_ITEM: ZiPatternCell = OnceLock::new();
static PROPERTY: ZiPatternCell = OnceLock::new();
static BYTE_SIZE_SHAPE: ZiPatternCell = OnceLock::new();
static DURATION_SHAPE: ZiPatternCell = OnceLock::new();
static INTEGER: ZiPatternCell = OnceLock::new();
static FLOAT: ZiPatternCell = OnceLock::new();

/// Outcome of scanning one source line.
#[derive(Debug, Default)]
pub(crate) struct ZiLineScan {
    pub statement: Option<ZiStatement>,
    pub errors: Vec<ZiSyntaxError>,
    /// A literal failed to construct; scanning must stop.
    pub fatal: bool,
}

impl ZiLineScan {
    fn lexical(error: ZiSyntaxError) -> Self {
        ZiLineScan {
            statement: None,
            errors: vec![error],
            fatal: false,
        }
    }

    fn literal(error: ZiSyntaxError) -> Self {
        ZiLineScan {
            statement: None,
            errors: vec![error],
            fatal: true,
        }
    }
}

enum ZiScanFailure {
    Lexical(ZiSyntaxError),
    Literal(ZiSyntaxError),
}

enum ZiRawShape {
    Plain,
    Quoted(String),
    QuotedProperty {
        key: String,
        value: String,
        value_start: usize,
    },
}

struct ZiRawWord {
    text: String,
    start: usize,
    end: usize,
    shape: ZiRawShape,
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Scans `source`, the text of recipe line `line` (1-based).
pub(crate) fn scan_line(line: usize, source: &str) -> Result<ZiLineScan> {
    let trimmed = source.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return Ok(ZiLineScan::default());
    }

    let lexer = ZiLexer {
        line,
        chars: source.chars().collect(),
    };
    let mut words = match lexer.split_words() {
        Ok(words) => words.into_iter(),
        Err(error) => return Ok(ZiLineScan::lexical(error)),
    };
    let Some(head) = words.next() else {
        return Ok(ZiLineScan::default());
    };

    let name_pattern = cached_pattern(&DIRECTIVE_NAME, r"^[A-Za-z_][A-Za-z0-9_\-.]*$")?;
    if !matches!(head.shape, ZiRawShape::Plain) || !name_pattern.is_match(&head.text) {
        return Ok(ZiLineScan::lexical(lexer.error(
            head.start,
            head.end,
            &head.text,
            format!("invalid directive name '{}'", head.text),
        )));
    }

    let mut fragments = Vec::new();
    for word in words {
        match lexer.classify(word)? {
            Ok(fragment) => fragments.push(fragment),
            Err(ZiScanFailure::Lexical(error)) => return Ok(ZiLineScan::lexical(error)),
            Err(ZiScanFailure::Literal(error)) => {
                log::error!("unparsable literal in recipe: {error}");
                return Ok(ZiLineScan::literal(error));
            }
        }
    }

    Ok(ZiLineScan {
        statement: Some(ZiStatement {
            directive: head.text,
            name_span: ZiSpan::new(line, head.start, head.end),
            fragments,
            line,
            text: trimmed.to_string(),
        }),
        errors: Vec::new(),
        fatal: false,
    })
}

struct ZiLexer {
    line: usize,
    chars: Vec<char>,
}

impl ZiLexer {
    fn error(
        &self,
        start: usize,
        end: usize,
        text: &str,
        message: impl Into<String>,
    ) -> ZiSyntaxError {
        ZiSyntaxError::new(self.line, start, end, text, message)
    }

    fn slice(&self, start: usize, end_exclusive: usize) -> String {
        self.chars[start..end_exclusive].iter().collect()
    }

    fn split_words(&self) -> std::result::Result<Vec<ZiRawWord>, ZiSyntaxError> {
        let chars = &self.chars;
        let mut words = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }
            let start = i;

            if is_quote(chars[i]) {
                let (content, next) = self.read_quoted(i)?;
                self.expect_separator(next)?;
                words.push(ZiRawWord {
                    text: self.slice(start, next),
                    start,
                    end: next - 1,
                    shape: ZiRawShape::Quoted(content),
                });
                i = next;
                continue;
            }

            let mut j = i;
            let mut shape = ZiRawShape::Plain;
            while j < chars.len() && !chars[j].is_whitespace() {
                if is_quote(chars[j]) && j > start && chars[j - 1] == ':' {
                    let key = self.slice(start, j - 1);
                    let (value, next) = self.read_quoted(j)?;
                    self.expect_separator(next)?;
                    shape = ZiRawShape::QuotedProperty {
                        key,
                        value,
                        value_start: j,
                    };
                    j = next;
                    break;
                }
                j += 1;
            }
            words.push(ZiRawWord {
                text: self.slice(start, j),
                start,
                end: j - 1,
                shape,
            });
            i = j;
        }

        // A statement may end with a semicolon.
        let mut drop_last = false;
        if let Some(last) = words.last_mut() {
            if matches!(last.shape, ZiRawShape::Plain) && last.text.ends_with(';') {
                last.text.pop();
                if last.text.is_empty() {
                    drop_last = true;
                } else {
                    last.end -= 1;
                }
            }
        }
        if drop_last {
            words.pop();
        }
        Ok(words)
    }

    fn read_quoted(&self, open: usize) -> std::result::Result<(String, usize), ZiSyntaxError> {
        let chars = &self.chars;
        let quote = chars[open];
        let mut content = String::new();
        let mut j = open + 1;

        while j < chars.len() {
            let c = chars[j];
            if c == '\\' && j + 1 < chars.len() && (is_quote(chars[j + 1]) || chars[j + 1] == '\\') {
                content.push(chars[j + 1]);
                j += 2;
                continue;
            }
            if c == quote {
                return Ok((content, j + 1));
            }
            content.push(c);
            j += 1;
        }

        let end = chars.len() - 1;
        Err(self.error(open, end, &self.slice(open, chars.len()), "unterminated quoted string"))
    }

    fn expect_separator(&self, next: usize) -> std::result::Result<(), ZiSyntaxError> {
        match self.chars.get(next) {
            Some(c) if !c.is_whitespace() && *c != ';' => Err(self.error(
                next,
                next,
                &c.to_string(),
                "expected whitespace after closing quote",
            )),
            _ => Ok(()),
        }
    }

    fn classify(&self, word: ZiRawWord) -> Result<std::result::Result<ZiFragment, ZiScanFailure>> {
        let span = ZiSpan::new(self.line, word.start, word.end);
        match word.shape {
            ZiRawShape::Quoted(content) => Ok(Ok(ZiFragment {
                kind: ZiFragmentKind::Quoted(content),
                text: word.text,
                span,
            })),
            ZiRawShape::QuotedProperty {
                key,
                value,
                value_start,
            } => {
                if !cached_pattern(&IDENTIFIER, r"^[A-Za-z_][A-Za-z0-9_.\-]*$")?.is_match(&key) {
                    return Ok(Err(ZiScanFailure::Lexical(self.error(
                        word.start,
                        word.end,
                        &word.text,
                        format!("invalid property key '{key}'"),
                    ))));
                }
                let value = ZiFragment {
                    kind: ZiFragmentKind::Quoted(value),
                    text: self.slice(value_start, word.end + 1),
                    span: ZiSpan::new(self.line, value_start, word.end),
                };
                Ok(Ok(ZiFragment {
                    kind: ZiFragmentKind::Property {
                        key,
                        value: Box::new(value),
                    },
                    text: word.text,
                    span,
                }))
            }
            ZiRawShape::Plain => self.classify_plain(&word.text, span),
        }
    }

    fn classify_plain(
        &self,
        text: &str,
        span: ZiSpan,
    ) -> Result<std::result::Result<ZiFragment, ZiScanFailure>> {
        type Classified = Result<std::result::Result<ZiFragment, ZiScanFailure>>;
        let fragment = |kind: ZiFragmentKind| -> Classified {
            Ok(Ok(ZiFragment {
                kind,
                text: text.to_string(),
                span,
            }))
        };
        let lexical = |message: String| -> Classified {
            Ok(Err(ZiScanFailure::Lexical(self.error(span.start, span.end, text, message))))
        };
        let literal = |err: ZiError| -> Classified {
            Ok(Err(ZiScanFailure::Literal(self.error(
                span.start,
                span.end,
                text,
                err.to_string(),
            ))))
        };

        if let Some(caps) = cached_pattern(&COLUMN, r"^:([A-Za-z_][A-Za-z0-9_.\-]*)$")?.captures(text) {
            return fragment(ZiFragmentKind::Column(caps[1].to_string()));
        }

        if text.contains(',') {
            let item = cached_pattern(&LIST_ITEM, r"^:?([A-Za-z_][A-Za-z0-9_.\-]*)$")?;
            let columns: Option<Vec<String>> = text
                .split(',')
                .map(|part| item.captures(part).map(|caps| caps[1].to_string()))
                .collect();
            match columns {
                Some(columns) => return fragment(ZiFragmentKind::ColumnList(columns)),
                None if text.starts_with(':') => {
                    return lexical(format!("malformed column list '{text}'"));
                }
                None => {}
            }
        }

        if text.starts_with(':') {
            return lexical(format!("malformed column reference '{text}'"));
        }

        if let Some(caps) = cached_pattern(&PROPERTY, r"^([A-Za-z_][A-Za-z0-9_.\-]*):(.*)$")?.captures(text) {
            let key = caps[1].to_string();
            let raw_value = &caps[2];
            if raw_value.is_empty() {
                return lexical(format!("property '{key}' has no value"));
            }
            let value_start = span.start + key.chars().count() + 1;
            let value_span = ZiSpan::new(span.line, value_start, span.end);
            return match self.classify_plain(raw_value, value_span)? {
                Ok(value) => fragment(ZiFragmentKind::Property {
                    key,
                    value: Box::new(value),
                }),
                Err(failure) => Ok(Err(failure)),
            };
        }

        if cached_pattern(&BYTE_SIZE_SHAPE, r"^\d+(\.\d+)?[kKmMgGtTpP][bB]?$")?.is_match(text) {
            return match ZiByteSize::parse(text) {
                Ok(size) => fragment(ZiFragmentKind::ByteSize(size)),
                Err(err) => literal(err),
            };
        }

        if cached_pattern(
            &DURATION_SHAPE,
            r"(?i)^\d+(\.\d+)?(nanoseconds?|nanos?|ns|microseconds?|micros?|us|milliseconds?|millis?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|hr|h|days?|d)$",
        )?
        .is_match(text)
        {
            return match ZiTimeDuration::parse(text) {
                Ok(duration) => fragment(ZiFragmentKind::TimeDuration(duration)),
                Err(err) => literal(err),
            };
        }

        if cached_pattern(&INTEGER, r"^[+-]?\d+$")?.is_match(text) {
            return match text.parse::<i64>() {
                Ok(value) => fragment(ZiFragmentKind::Numeric(ZiNumeric::Int(value))),
                Err(_) => literal(ZiError::invalid_literal(
                    "numeric",
                    text,
                    "value does not fit in a 64-bit integer",
                )),
            };
        }

        if cached_pattern(&FLOAT, r"^[+-]?(\d+\.\d*|\.\d+|\d+)([eE][+-]?\d+)?$")?.is_match(text) {
            return match text.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    fragment(ZiFragmentKind::Numeric(ZiNumeric::Float(value)))
                }
                _ => literal(ZiError::invalid_literal("numeric", text, "value is out of range")),
            };
        }

        if cached_pattern(&IDENTIFIER, r"^[A-Za-z_][A-Za-z0-9_.\-]*$")?.is_match(text) {
            return fragment(ZiFragmentKind::Identifier(text.to_string()));
        }

        fragment(ZiFragmentKind::Text(text.to_string()))
    }
}
