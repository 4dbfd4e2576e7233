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


//! # Zi Wrangle Error Module
//!
//! This module defines the error types used throughout the recipe compiler
//! and the directive execution pipeline.
//!
//! ## Error Categories
//!
//! - **InvalidLiteral**: byte size or time duration text that cannot be parsed
//! - **Syntax / Compile**: malformed statements, collected per occurrence and
//!   surfaced together as one compile failure
//! - **RecipeParse**: argument binding failures (missing, extra, mistyped)
//! - **DirectiveParse**: configuration rejected by a directive's `initialize`
//! - **DirectiveExecution**: failures raised by `execute` or `finish`
//! - **Pipeline**: misuse of the directive lifecycle
//! - **Io / Serde / Validation / Internal**: ambient failures
//!
//! ## Usage
//!
//! ```rust
//! use zi_wrangle::errors::{Result, ZiError};
//!
//! fn check(column: &str) -> Result<()> {
//!     if column.is_empty() {
//!         return Err(ZiError::directive_execution("flatten", "column name is empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zi Wrangle.
pub type Result<T> = std::result::Result<T, ZiError>;

/// A problem found while scanning or compiling a recipe.
///
/// Lines are 1-based; columns are 0-based character offsets into the line and
/// `end_column` is inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiSyntaxError {
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub text: String,
    pub message: String,
}

impl ZiSyntaxError {
    pub fn new(
        line: usize,
        start_column: usize,
        end_column: usize,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ZiSyntaxError {
            line,
            start_column,
            end_column,
            text: text.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ZiSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}:{}-{} near '{}': {}",
            self.line, self.start_column, self.end_column, self.text, self.message
        )
    }
}

/// All syntax errors gathered by one compile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiCompileErrors(pub Vec<ZiSyntaxError>);

impl ZiCompileErrors {
    pub fn errors(&self) -> &[ZiSyntaxError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ZiCompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

/// Canonical error enumeration for Zi Wrangle.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// A byte size or time duration literal that does not parse.
    #[error("invalid {kind} literal '{text}': {message}")]
    InvalidLiteral {
        kind: String,
        text: String,
        message: String,
    },

    /// A single malformed statement.
    #[error("syntax error at {0}")]
    Syntax(ZiSyntaxError),

    /// The recipe was rejected as a whole.
    #[error("recipe has {} error(s): {errors}", .errors.len())]
    Compile { errors: ZiCompileErrors },

    /// Arguments of a statement do not match the directive's usage definition.
    #[error("error parsing directive '{directive}': {message}")]
    RecipeParse { directive: String, message: String },

    /// The directive rejected its configuration while initializing.
    #[error("invalid configuration for directive '{directive}': {message}")]
    DirectiveParse { directive: String, message: String },

    /// The recipe references a directive nobody registered.
    #[error("directive '{directive}' not found")]
    DirectiveNotFound { directive: String },

    /// The recipe references a directive the engine configuration excludes.
    #[error("directive '{directive}' has been excluded")]
    DirectiveExcluded { directive: String },

    /// Failure raised while a directive executes or finishes.
    #[error("error executing directive '{directive}': {message}")]
    DirectiveExecution { directive: String, message: String },

    /// Lifecycle violations while driving a pipeline.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline { stage: String, message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Validation errors triggered by invalid parameters or configuration.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<ZiSyntaxError> for ZiError {
    fn from(err: ZiSyntaxError) -> Self {
        ZiError::Syntax(err)
    }
}

/// Coarse classification used by hosting code when reporting failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiErrorCategory {
    Literal,
    CompilingRecipe,
    ParsingDirective,
    DirectiveNotFound,
    ExecutingDirective,
    Configuration,
    Internal,
}

impl ZiErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiErrorCategory::Literal => "Literal",
            ZiErrorCategory::CompilingRecipe => "Compiling-Recipe",
            ZiErrorCategory::ParsingDirective => "Parsing-Directive",
            ZiErrorCategory::DirectiveNotFound => "Directive-Not-Found",
            ZiErrorCategory::ExecutingDirective => "Executing-Directive",
            ZiErrorCategory::Configuration => "Configuration",
            ZiErrorCategory::Internal => "Internal",
        }
    }
}

impl ZiError {
    /// Helper to construct literal parse errors.
    pub fn invalid_literal(
        kind: impl Into<String>,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ZiError::InvalidLiteral {
            kind: kind.into(),
            text: text.into(),
            message: message.into(),
        }
    }

    /// Helper to construct argument binding errors.
    pub fn recipe_parse(directive: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::RecipeParse {
            directive: directive.into(),
            message: message.into(),
        }
    }

    /// Helper to construct directive configuration errors.
    pub fn directive_parse(directive: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::DirectiveParse {
            directive: directive.into(),
            message: message.into(),
        }
    }

    /// Helper to construct directive execution errors.
    pub fn directive_execution(directive: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::DirectiveExecution {
            directive: directive.into(),
            message: message.into(),
        }
    }

    /// Helper to construct pipeline errors.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }

    /// Wraps collected syntax errors into a single compile failure.
    pub fn compile(errors: Vec<ZiSyntaxError>) -> Self {
        ZiError::Compile {
            errors: ZiCompileErrors(errors),
        }
    }

    /// Returns the syntax errors carried by a compile failure, if any.
    pub fn syntax_errors(&self) -> &[ZiSyntaxError] {
        match self {
            ZiError::Compile { errors } => errors.errors(),
            ZiError::Syntax(err) => std::slice::from_ref(err),
            _ => &[],
        }
    }

    /// Message without the variant prefix, used when an error is folded into
    /// a syntax error.
    pub fn detail(&self) -> String {
        match self {
            ZiError::InvalidLiteral { message, .. }
            | ZiError::RecipeParse { message, .. }
            | ZiError::DirectiveParse { message, .. }
            | ZiError::DirectiveExecution { message, .. }
            | ZiError::Pipeline { message, .. }
            | ZiError::Validation { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn category(&self) -> ZiErrorCategory {
        match self {
            ZiError::InvalidLiteral { .. } => ZiErrorCategory::Literal,
            ZiError::Syntax(_) | ZiError::Compile { .. } => ZiErrorCategory::CompilingRecipe,
            ZiError::RecipeParse { .. } | ZiError::DirectiveParse { .. } => {
                ZiErrorCategory::ParsingDirective
            }
            ZiError::DirectiveNotFound { .. } | ZiError::DirectiveExcluded { .. } => {
                ZiErrorCategory::DirectiveNotFound
            }
            ZiError::DirectiveExecution { .. } => ZiErrorCategory::ExecutingDirective,
            ZiError::Validation { .. } | ZiError::Serde(_) | ZiError::Io(_) => {
                ZiErrorCategory::Configuration
            }
            ZiError::Pipeline { .. } | ZiError::Internal(_) => ZiErrorCategory::Internal,
        }
    }

    /// True when the failure was caused by the recipe or its data rather than
    /// by the engine itself.
    pub fn is_user_error(&self) -> bool {
        !matches!(self.category(), ZiErrorCategory::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_exposes_every_syntax_error() {
        let err = ZiError::compile(vec![
            ZiSyntaxError::new(1, 0, 3, "bad", "first"),
            ZiSyntaxError::new(2, 4, 6, "oops", "second"),
        ]);

        assert_eq!(err.syntax_errors().len(), 2);
        assert_eq!(err.category(), ZiErrorCategory::CompilingRecipe);
        assert!(err.to_string().contains("2 error(s)"));
    }

    #[test]
    fn categories_follow_error_kind() {
        assert_eq!(
            ZiError::directive_execution("flatten", "boom").category().as_str(),
            "Executing-Directive"
        );
        assert_eq!(
            ZiError::directive_parse("aggregate-stats", "bad unit").category(),
            ZiErrorCategory::ParsingDirective
        );
        assert!(!ZiError::internal("bug").is_user_error());
        assert!(ZiError::DirectiveNotFound {
            directive: "nope".into()
        }
        .is_user_error());
    }
}
