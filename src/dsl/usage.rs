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


//! Usage definitions and argument binding.
//!
//! A directive declares its argument contract with a [`ZiUsageDefinition`]:
//! ordered required arguments followed by optional arguments that are only
//! accepted in `name:value` form. [`bind`] matches a statement's fragments
//! against that contract and produces [`ZiArguments`].

use serde::{Deserialize, Serialize};

use crate::dsl::ir::{ZiFragment, ZiFragmentKind, ZiSpan, ZiStatement};
use crate::errors::{Result, ZiError};
use crate::literal::{ZiByteSize, ZiTimeDuration};
use crate::token::{ZiArguments, ZiNumeric, ZiProperty, ZiToken, ZiTokenType};

/// One declared argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiArgSpec {
    pub name: String,
    pub token_type: ZiTokenType,
    pub optional: bool,
    /// Allowed values, compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl ZiArgSpec {
    fn render(&self) -> String {
        let value = match &self.choices {
            Some(choices) => choices.join("|"),
            None => match self.token_type {
                ZiTokenType::ColumnName => format!(":{}", self.name),
                ZiTokenType::ColumnNameList => format!(":{0}[,:{0}]*", self.name),
                ZiTokenType::QuotedString => format!("'{}'", self.name),
                ZiTokenType::Property => format!("{}:<value>", self.name),
                _ => format!("<{}>", self.name),
            },
        };
        if self.optional {
            format!("[{}:{}]", self.name, value.trim_start_matches(':'))
        } else {
            value
        }
    }
}

/// Argument contract of one directive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiUsageDefinition {
    directive: String,
    arguments: Vec<ZiArgSpec>,
}

impl ZiUsageDefinition {
    pub fn builder(directive: impl Into<String>) -> ZiUsageBuilder {
        ZiUsageBuilder {
            directive: directive.into(),
            arguments: Vec::new(),
        }
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    pub fn arguments(&self) -> &[ZiArgSpec] {
        &self.arguments
    }

    pub fn required(&self) -> impl Iterator<Item = &ZiArgSpec> {
        self.arguments.iter().filter(|spec| !spec.optional)
    }

    pub fn optional(&self) -> impl Iterator<Item = &ZiArgSpec> {
        self.arguments.iter().filter(|spec| spec.optional)
    }

    /// Human readable usage line, e.g. `flatten :column[,:column]*`.
    pub fn render(&self) -> String {
        let mut parts = vec![self.directive.clone()];
        parts.extend(self.arguments.iter().map(ZiArgSpec::render));
        parts.join(" ")
    }
}

pub struct ZiUsageBuilder {
    directive: String,
    arguments: Vec<ZiArgSpec>,
}

impl ZiUsageBuilder {
    pub fn define(mut self, name: &str, token_type: ZiTokenType) -> Self {
        self.arguments.push(ZiArgSpec {
            name: name.to_string(),
            token_type,
            optional: false,
            choices: None,
        });
        self
    }

    pub fn define_optional(mut self, name: &str, token_type: ZiTokenType) -> Self {
        self.arguments.push(ZiArgSpec {
            name: name.to_string(),
            token_type,
            optional: true,
            choices: None,
        });
        self
    }

    /// Optional text argument restricted to `choices`.
    pub fn define_choice(mut self, name: &str, choices: &[&str]) -> Self {
        self.arguments.push(ZiArgSpec {
            name: name.to_string(),
            token_type: ZiTokenType::Text,
            optional: true,
            choices: Some(choices.iter().map(|choice| choice.to_string()).collect()),
        });
        self
    }

    /// Rejects duplicate argument names and required arguments declared after
    /// optional ones.
    pub fn build(self) -> Result<ZiUsageDefinition> {
        let mut seen_optional = false;
        for (idx, spec) in self.arguments.iter().enumerate() {
            if self.arguments[..idx].iter().any(|other| other.name == spec.name) {
                return Err(ZiError::internal(format!(
                    "directive '{}' declares argument '{}' twice",
                    self.directive, spec.name
                )));
            }
            if spec.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(ZiError::internal(format!(
                    "directive '{}' declares required argument '{}' after optional ones",
                    self.directive, spec.name
                )));
            }
        }
        Ok(ZiUsageDefinition {
            directive: self.directive,
            arguments: self.arguments,
        })
    }
}

/// A binding failure together with the source span it refers to.
#[derive(Debug)]
pub(crate) struct ZiBindFailure {
    pub error: ZiError,
    pub span: ZiSpan,
    pub text: String,
}

/// Binds `statement` against `definition`.
pub fn bind(definition: &ZiUsageDefinition, statement: &ZiStatement) -> Result<ZiArguments> {
    bind_spanned(definition, statement).map_err(|failure| failure.error)
}

pub(crate) fn bind_spanned(
    definition: &ZiUsageDefinition,
    statement: &ZiStatement,
) -> std::result::Result<ZiArguments, ZiBindFailure> {
    let directive = definition.directive();
    let fragments = &statement.fragments;
    let fail_at = |fragment: &ZiFragment, error: ZiError| ZiBindFailure {
        error,
        span: fragment.span,
        text: fragment.text.clone(),
    };
    let fail_statement = |error: ZiError| ZiBindFailure {
        error,
        span: statement.span(),
        text: statement.text.clone(),
    };

    let mut args = ZiArguments::new(directive, statement.line);
    let required: Vec<&ZiArgSpec> = definition.required().collect();
    let mut cursor = 0;

    for (position, spec) in required.iter().enumerate() {
        let Some(fragment) = fragments.get(cursor).filter(|fragment| {
            !matches!(fragment.kind, ZiFragmentKind::Property { .. })
                || spec.token_type == ZiTokenType::Property
        }) else {
            return Err(fail_statement(ZiError::recipe_parse(
                directive,
                format!(
                    "missing required argument '{}' of type {}; usage: {}",
                    spec.name,
                    spec.token_type,
                    definition.render()
                ),
            )));
        };
        cursor += 1;

        let mut token = convert(fragment, spec.token_type).ok_or_else(|| {
            fail_at(
                fragment,
                ZiError::recipe_parse(
                    directive,
                    format!(
                        "argument '{}' expects {} but found {} '{}'",
                        spec.name,
                        spec.token_type,
                        fragment.kind.label(),
                        fragment.text
                    ),
                ),
            )
        })?;

        // A trailing column list absorbs the columns that follow it.
        if let ZiToken::ColumnNameList(columns) = &mut token {
            if position + 1 == required.len() {
                while let Some(next) = fragments.get(cursor) {
                    match convert(next, ZiTokenType::ColumnNameList) {
                        Some(ZiToken::ColumnNameList(more)) => {
                            columns.extend(more);
                            cursor += 1;
                        }
                        _ => break,
                    }
                }
            }
        }

        args.insert(spec.name.clone(), token)
            .map_err(|error| fail_at(fragment, error))?;
    }

    for fragment in &fragments[cursor..] {
        let ZiFragmentKind::Property { key, value } = &fragment.kind else {
            return Err(fail_at(
                fragment,
                ZiError::recipe_parse(
                    directive,
                    format!(
                        "unexpected argument '{}'; usage: {}",
                        fragment.text,
                        definition.render()
                    ),
                ),
            ));
        };
        let Some(spec) = definition.optional().find(|spec| &spec.name == key) else {
            return Err(fail_at(
                fragment,
                ZiError::recipe_parse(directive, format!("unknown option '{key}'")),
            ));
        };

        let token = convert(value, spec.token_type).ok_or_else(|| {
            fail_at(
                value,
                ZiError::recipe_parse(
                    directive,
                    format!(
                        "option '{key}' expects {} but found {} '{}'",
                        spec.token_type,
                        value.kind.label(),
                        value.text
                    ),
                ),
            )
        })?;

        if let Some(choices) = &spec.choices {
            let given = value.content();
            if !choices.iter().any(|choice| choice.eq_ignore_ascii_case(given)) {
                return Err(fail_at(
                    value,
                    ZiError::directive_parse(
                        directive,
                        format!(
                            "invalid value '{given}' for option '{key}'; supported values are {{{}}}",
                            choices.join(", ")
                        ),
                    ),
                ));
            }
        }

        args.insert(key.clone(), token)
            .map_err(|error| fail_at(fragment, error))?;
    }

    Ok(args)
}

/// Reads `fragment` as a token of `expected` type.
fn convert(fragment: &ZiFragment, expected: ZiTokenType) -> Option<ZiToken> {
    use ZiFragmentKind as K;

    match (expected, &fragment.kind) {
        (ZiTokenType::ColumnName, K::Column(name) | K::Identifier(name) | K::Quoted(name)) => {
            Some(ZiToken::ColumnName(name.clone()))
        }
        (ZiTokenType::ColumnNameList, K::ColumnList(columns)) => {
            Some(ZiToken::ColumnNameList(columns.clone()))
        }
        (ZiTokenType::ColumnNameList, K::Column(name) | K::Identifier(name) | K::Quoted(name)) => {
            Some(ZiToken::ColumnNameList(vec![name.clone()]))
        }
        (ZiTokenType::Text, K::Identifier(text) | K::Text(text) | K::Quoted(text)) => {
            Some(ZiToken::Text(text.clone()))
        }
        (ZiTokenType::Text, K::Numeric(_) | K::ByteSize(_) | K::TimeDuration(_)) => {
            Some(ZiToken::Text(fragment.text.clone()))
        }
        (ZiTokenType::QuotedString, K::Quoted(text)) => Some(ZiToken::QuotedString(text.clone())),
        (ZiTokenType::Numeric, K::Numeric(value)) => Some(ZiToken::Numeric(*value)),
        (ZiTokenType::ByteSize, K::ByteSize(size)) => Some(ZiToken::ByteSize(size.clone())),
        (ZiTokenType::ByteSize, K::Numeric(ZiNumeric::Int(_))) => {
            ZiByteSize::parse(&fragment.text).ok().map(ZiToken::ByteSize)
        }
        (ZiTokenType::ByteSize, K::Quoted(text)) => {
            ZiByteSize::parse(text).ok().map(ZiToken::ByteSize)
        }
        (ZiTokenType::TimeDuration, K::TimeDuration(duration)) => {
            Some(ZiToken::TimeDuration(duration.clone()))
        }
        (ZiTokenType::TimeDuration, K::Numeric(_) | K::ByteSize(_)) => {
            ZiTimeDuration::parse(&fragment.text).ok().map(ZiToken::TimeDuration)
        }
        // `'150 ms'` keeps the space between number and unit.
        (ZiTokenType::TimeDuration, K::Quoted(text)) => {
            ZiTimeDuration::parse(text).ok().map(ZiToken::TimeDuration)
        }
        (ZiTokenType::DirectiveName, K::Identifier(name)) => {
            Some(ZiToken::DirectiveName(name.clone()))
        }
        (ZiTokenType::Property, K::Property { key, value }) => Some(ZiToken::Property(ZiProperty {
            key: key.clone(),
            value: value.content().to_string(),
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parser::ZiRecipeParser;

    fn statement(source: &str) -> ZiStatement {
        ZiRecipeParser::new()
            .parse(source)
            .unwrap()
            .statements
            .remove(0)
    }

    fn stats_usage() -> ZiUsageDefinition {
        ZiUsageDefinition::builder("stats")
            .define("size", ZiTokenType::ColumnName)
            .define("limit", ZiTokenType::TimeDuration)
            .define_choice("unit", &["KB", "MB"])
            .define_optional("cap", ZiTokenType::ByteSize)
            .build()
            .unwrap()
    }

    #[test]
    fn renders_usage_line() {
        assert_eq!(
            stats_usage().render(),
            "stats :size <limit> [unit:KB|MB] [cap:<cap>]"
        );
    }

    #[test]
    fn binds_positional_then_named() {
        let args = bind(&stats_usage(), &statement("stats :s 1m unit:mb cap:2KB")).unwrap();

        assert_eq!(args.column("size").unwrap(), "s");
        assert_eq!(args.time_duration("limit").unwrap().nanos(), 60_000_000_000);
        assert_eq!(args.text("unit").unwrap(), "mb");
        assert_eq!(args.byte_size("cap").unwrap().bytes(), 2048);
    }

    #[test]
    fn quoted_literals_are_reparsed() {
        let args = bind(&stats_usage(), &statement("stats :s '150 ms' cap:'2KB'")).unwrap();
        assert_eq!(args.time_duration("limit").unwrap().nanos(), 150_000_000);
        assert_eq!(args.byte_size("cap").unwrap().bytes(), 2048);

        assert!(bind(&stats_usage(), &statement("stats :s 'soon'")).is_err());
    }

    #[test]
    fn reports_binding_problems() {
        let usage = stats_usage();

        let missing = bind_spanned(&usage, &statement("stats :s")).unwrap_err();
        assert!(matches!(missing.error, ZiError::RecipeParse { .. }));

        let mistyped = bind_spanned(&usage, &statement("stats :s fast")).unwrap_err();
        assert_eq!(mistyped.span.start, 9);

        let unknown = bind(&usage, &statement("stats :s 5 speed:1")).unwrap_err();
        assert!(unknown.to_string().contains("unknown option 'speed'"));

        let extra = bind(&usage, &statement("stats :s 5 extra")).unwrap_err();
        assert!(extra.to_string().contains("unexpected argument 'extra'"));

        let duplicate = bind(&usage, &statement("stats :s 5 unit:KB unit:MB")).unwrap_err();
        assert!(duplicate.to_string().contains("more than once"));

        let choice = bind(&usage, &statement("stats :s 5 unit:GB")).unwrap_err();
        assert!(matches!(choice, ZiError::DirectiveParse { .. }));
        assert!(choice.to_string().contains("supported values are {KB, MB}"));
    }

    #[test]
    fn trailing_column_list_absorbs_columns() {
        let usage = ZiUsageDefinition::builder("flatten")
            .define("column", ZiTokenType::ColumnNameList)
            .build()
            .unwrap();
        let args = bind(&usage, &statement("flatten :a b,c :d")).unwrap();
        assert_eq!(args.columns("column").unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn builder_rejects_duplicates() {
        assert!(ZiUsageDefinition::builder("x")
            .define("a", ZiTokenType::Text)
            .define_optional("a", ZiTokenType::Text)
            .build()
            .is_err());
    }
}
