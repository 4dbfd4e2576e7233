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


//! Parses webserver access log lines described by an Apache `LogFormat`
//! string into individual columns.

use regex::Regex;

use crate::directive::{ZiDirective, ZiExecutorContext};
use crate::dsl::usage::ZiUsageDefinition;
use crate::errors::{Result, ZiError};
use crate::lineage::ZiMutation;
use crate::record::{ZiRow, ZiRowBatch, ZiValue};
use crate::token::{ZiArguments, ZiTokenType};

pub const NAME: &str = "parse-as-log";

/// Column set on rows whose line does not match the format.
pub const PARSE_ERROR_COLUMN: &str = "log.parse.error";

pub const COMMON_FORMAT: &str = r#"%h %l %u %t "%r" %>s %b"#;
pub const COMBINED_FORMAT: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i""#;

const TOKEN_CAPTURE: &str = r"(\S+)";
const OPTIONAL_CAPTURE: &str = r"(\S*)";
const QUOTED_CAPTURE: &str = r#"((?:[^"\\]|\\.)*)"#;
const TIME_CAPTURE: &str = r"\[([^\]]+)\]";

#[derive(Clone, Debug, PartialEq, Eq)]
enum ZiLogField {
    Plain(String),
    FirstLine,
    Bytes,
}

impl ZiLogField {
    fn emit(&self, raw: &str, out: &mut Vec<(String, ZiValue)>) {
        let text = |value: &str| {
            if value == "-" {
                ZiValue::Null
            } else {
                ZiValue::from(value)
            }
        };
        match self {
            ZiLogField::Plain(path) => out.push((path.clone(), text(raw))),
            ZiLogField::Bytes => {
                let bytes = if raw == "-" { "0" } else { raw };
                out.push(("BYTES:response.body.bytes".into(), bytes.into()));
                out.push(("BYTESCLF:response.body.bytesclf".into(), text(raw)));
            }
            ZiLogField::FirstLine => {
                out.push(("HTTP.FIRSTLINE:request.firstline".into(), text(raw)));
                let mut parts = raw.split_whitespace();
                let names = [
                    "HTTP.METHOD:request.firstline.method",
                    "HTTP.URI:request.firstline.uri",
                    "HTTP.PROTOCOL:request.firstline.protocol",
                ];
                if raw != "-" {
                    for name in names {
                        if let Some(part) = parts.next() {
                            out.push((name.into(), part.into()));
                        }
                    }
                }
            }
        }
    }
}

/// A `LogFormat` compiled into an anchored pattern with one capture group per
/// field.
#[derive(Clone, Debug)]
pub struct ZiLogFormat {
    source: String,
    pattern: Regex,
    fields: Vec<ZiLogField>,
}

impl ZiLogFormat {
    /// Compiles `common`, `combined` or a raw format string.
    pub fn compile(format: &str) -> Result<Self> {
        let source = match format.trim().to_ascii_lowercase().as_str() {
            "common" => COMMON_FORMAT.to_string(),
            "combined" => COMBINED_FORMAT.to_string(),
            _ => format.to_string(),
        };

        let mut pattern = String::from("^");
        let mut fields = Vec::new();
        let mut previous: Option<char> = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                pattern.push_str(&regex::escape(&c.to_string()));
                previous = Some(c);
                continue;
            }

            let mut last = false;
            while let Some(&modifier) = chars.peek() {
                if modifier == '>' {
                    last = true;
                } else if !(modifier == '<' || modifier == '!' || modifier == ',' || modifier.is_ascii_digit()) {
                    break;
                }
                chars.next();
            }

            let mut name = None;
            if chars.peek() == Some(&'{') {
                chars.next();
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => inner.push(ch),
                        None => return Err(unsupported(&source, "unterminated '%{'")),
                    }
                }
                name = Some(inner);
            }

            let Some(directive) = chars.next() else {
                return Err(unsupported(&source, "format ends with '%'"));
            };
            if directive == '%' && name.is_none() {
                pattern.push('%');
                previous = Some('%');
                continue;
            }

            let quoted = previous == Some('"');
            let capture = if quoted { QUOTED_CAPTURE } else { TOKEN_CAPTURE };
            let (field, capture) = match (directive, name.as_deref()) {
                ('h', None) => (plain("IP:connection.client.host"), capture),
                ('a', None) => (plain("IP:connection.client.ip"), capture),
                ('A', None) => (plain("IP:connection.server.ip"), capture),
                ('l', None) => (plain("STRING:connection.client.logname"), capture),
                ('u', None) => (plain("STRING:connection.client.user"), capture),
                ('t', None) => (plain("TIME.STAMP:request.receive.time"), TIME_CAPTURE),
                ('r', None) => (ZiLogField::FirstLine, capture),
                ('s', None) if last => (plain("STRING:request.status.last"), capture),
                ('s', None) => (plain("STRING:request.status.original"), capture),
                ('b' | 'B', None) => (ZiLogField::Bytes, capture),
                ('D', None) => (plain("MICROSECONDS:response.server.processing.time"), capture),
                ('T', None) => (plain("SECONDS:response.server.processing.time"), capture),
                ('v', None) => (plain("STRING:connection.server.name"), capture),
                ('p', None) => (plain("PORT:connection.server.port"), capture),
                ('U', None) => (plain("URI:request.urlpath"), capture),
                ('q', None) if !quoted => (plain("HTTP.QUERYSTRING:request.querystring"), OPTIONAL_CAPTURE),
                ('q', None) => (plain("HTTP.QUERYSTRING:request.querystring"), capture),
                ('m', None) => (plain("HTTP.METHOD:request.method"), capture),
                ('H', None) => (plain("HTTP.PROTOCOL:request.protocol"), capture),
                ('i', Some(header)) => {
                    let header = header.to_ascii_lowercase();
                    let path = match header.as_str() {
                        "referer" => "HTTP.URI:request.referer".to_string(),
                        "user-agent" => "HTTP.USERAGENT:request.user-agent".to_string(),
                        _ => format!("HTTP.HEADER:request.header.{header}"),
                    };
                    (ZiLogField::Plain(path), capture)
                }
                ('o', Some(header)) => (
                    ZiLogField::Plain(format!("HTTP.HEADER:response.header.{}", header.to_ascii_lowercase())),
                    capture,
                ),
                ('C', Some(cookie)) => (
                    ZiLogField::Plain(format!("HTTP.COOKIE:request.cookies.{}", cookie.to_ascii_lowercase())),
                    capture,
                ),
                (other, Some(name)) => {
                    return Err(unsupported(&source, &format!("unsupported directive '%{{{name}}}{other}'")))
                }
                (other, None) => return Err(unsupported(&source, &format!("unsupported directive '%{other}'"))),
            };
            pattern.push_str(capture);
            fields.push(field);
            previous = None;
        }
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|err| unsupported(&source, &err.to_string()))?;
        Ok(ZiLogFormat { source, pattern, fields })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Columns extracted from `line`, or `None` when the line does not match.
    pub fn parse(&self, line: &str) -> Option<Vec<(String, ZiValue)>> {
        let captures = self.pattern.captures(line)?;
        let mut raw = Vec::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let value = captures.get(idx + 1).map_or("", |m| m.as_str());
            field.emit(value, &mut raw);
        }
        Some(
            raw.into_iter()
                .filter_map(|(path, value)| column_name(&path).map(|column| (column, value)))
                .collect(),
        )
    }
}

fn plain(path: &str) -> ZiLogField {
    ZiLogField::Plain(path.to_string())
}

fn unsupported(format: &str, message: &str) -> ZiError {
    ZiError::directive_parse(NAME, format!("invalid log format '{format}': {message}"))
}

/// Column name for a field path; original values, CLF byte counts and cookies
/// are not surfaced.
fn column_name(path: &str) -> Option<String> {
    let key = path.to_lowercase();
    if key.contains("original") || key.contains("bytesclf") || key.contains("cookie") {
        return None;
    }
    Some(
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect(),
    )
}

/// `parse-as-log :column <format>`
#[derive(Debug, Default)]
pub struct ZiParseLog {
    column: String,
    format: Option<ZiLogFormat>,
}

pub fn create() -> Box<dyn ZiDirective + Send> {
    Box::new(ZiParseLog::default())
}

impl ZiParseLog {
    fn line_of(&self, value: &ZiValue) -> Result<String> {
        match value {
            ZiValue::String(text) => Ok(text.clone()),
            ZiValue::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            ZiValue::Null => Err(ZiError::directive_execution(
                NAME,
                format!(
                    "Column '{}' has null value. It should be a non-null 'String' or 'byte array'.",
                    self.column
                ),
            )),
            other => Err(ZiError::directive_execution(
                NAME,
                format!(
                    "Column '{}' is of invalid type '{}'. It should be of type 'String' or 'byte array'.",
                    self.column,
                    other.type_name()
                ),
            )),
        }
    }
}

impl ZiDirective for ZiParseLog {
    fn name(&self) -> &'static str {
        NAME
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder(NAME)
            .define("column", ZiTokenType::ColumnName)
            .define("format", ZiTokenType::Text)
            .build()
    }

    fn initialize(&mut self, args: &ZiArguments) -> Result<()> {
        self.column = args.column("column")?.to_string();
        self.format = Some(ZiLogFormat::compile(args.text("format")?)?);
        Ok(())
    }

    fn execute(&mut self, mut rows: ZiRowBatch, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        let format = self
            .format
            .as_ref()
            .ok_or_else(|| ZiError::internal(format!("{NAME} executed before initialize")))?;

        for (index, row) in rows.iter_mut().enumerate() {
            let Some(value) = row.get(&self.column) else {
                continue;
            };
            let line = self.line_of(value)?;
            match format.parse(&line) {
                Some(columns) => apply(row, columns),
                None => {
                    row.add_or_set(PARSE_ERROR_COLUMN, 1);
                    ctx.report(index, Some(&self.column), "line does not match the log format");
                }
            }
        }
        Ok(rows)
    }

    fn lineage(&self) -> Option<ZiMutation> {
        let format = self.format.as_ref().map_or("", ZiLogFormat::source);
        Some(
            ZiMutation::builder()
                .readable(format!(
                    "Parsed column '{}' as webserver log using format '{}'",
                    self.column, format
                ))
                .all([self.column.clone()], [self.column.clone()])
                .build(),
        )
    }
}

fn apply(row: &mut ZiRow, columns: Vec<(String, ZiValue)>) {
    for (column, value) in columns {
        row.add_or_set(&column, value);
    }
}
