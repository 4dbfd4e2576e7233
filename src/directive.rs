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


//! # Zi Wrangle Directive Module
//!
//! This module defines the contract every directive fulfills and the context
//! handed to it while rows flow through a pipeline.
//!
//! ## Lifecycle
//!
//! A directive instance is bound to one statement of one recipe:
//!
//! 1. **Declared**: `define()` publishes the argument contract
//! 2. **Initialized**: `initialize()` reads the bound arguments; invalid
//!    configuration fails with [`ZiError::DirectiveParse`]
//! 3. **Executing**: `execute()` is called once per row batch, any number of
//!    times
//! 4. **Finished**: `finish()` runs once after the last batch and may emit rows
//!    derived from accumulated state
//! 5. **Destroyed**: `destroy()` runs exactly once at teardown, including after
//!    a failure
//!
//! ## Implementing a Directive
//!
//! ```rust
//! use zi_wrangle::directive::{ZiDirective, ZiExecutorContext};
//! use zi_wrangle::dsl::ZiUsageDefinition;
//! use zi_wrangle::errors::Result;
//! use zi_wrangle::record::ZiRowBatch;
//! use zi_wrangle::token::{ZiArguments, ZiTokenType};
//!
//! #[derive(Debug, Default)]
//! struct RemoveColumn {
//!     column: String,
//! }
//!
//! impl ZiDirective for RemoveColumn {
//!     fn name(&self) -> &'static str {
//!         "remove-column"
//!     }
//!
//!     fn define(&self) -> Result<ZiUsageDefinition> {
//!         ZiUsageDefinition::builder("remove-column")
//!             .define("column", ZiTokenType::ColumnName)
//!             .build()
//!     }
//!
//!     fn initialize(&mut self, args: &ZiArguments) -> Result<()> {
//!         self.column = args.column("column")?.to_string();
//!         Ok(())
//!     }
//!
//!     fn execute(&mut self, mut rows: ZiRowBatch, _: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
//!         for row in &mut rows {
//!             row.remove_column(&self.column);
//!         }
//!         Ok(rows)
//!     }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dsl::usage::ZiUsageDefinition;
use crate::errors::{Result, ZiError};
use crate::lineage::ZiMutation;
use crate::record::ZiRowBatch;
use crate::store::ZiScopedStore;
use crate::token::ZiArguments;

/// Contract every directive fulfills.
///
/// Instances hold configuration for one statement of one execution and are
/// never reused across executions. State that must survive between batches
/// goes through the context's store.
pub trait ZiDirective: fmt::Debug + Send {
    /// Name used in recipes.
    fn name(&self) -> &'static str;

    /// Argument contract of the directive.
    fn define(&self) -> Result<ZiUsageDefinition>;

    /// Reads configuration from bound arguments.
    fn initialize(&mut self, args: &ZiArguments) -> Result<()>;

    /// Transforms one batch. The output may hold fewer, equal or more rows
    /// than the input.
    fn execute(&mut self, rows: ZiRowBatch, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch>;

    /// Emits rows once all input has passed through the pipeline.
    fn finish(&mut self, _ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        Ok(Vec::new())
    }

    /// Releases resources.
    fn destroy(&mut self) {}

    /// Column-level description of what the directive does.
    fn lineage(&self) -> Option<ZiMutation> {
        None
    }
}

/// Lifecycle position of a directive instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiDirectiveState {
    Declared,
    Initialized,
    Executing,
    Finished,
    Destroyed,
}

impl fmt::Display for ZiDirectiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZiDirectiveState::Declared => "declared",
            ZiDirectiveState::Initialized => "initialized",
            ZiDirectiveState::Executing => "executing",
            ZiDirectiveState::Finished => "finished",
            ZiDirectiveState::Destroyed => "destroyed",
        };
        f.write_str(label)
    }
}

/// A recoverable problem a directive found in one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiRowIssue {
    pub directive: String,
    /// Position of the statement in the recipe.
    pub statement: usize,
    /// Index of the row within the batch the directive received.
    pub row: usize,
    pub column: Option<String>,
    pub message: String,
}

/// What a directive sees of the running pipeline.
#[derive(Debug)]
pub struct ZiExecutorContext<'a> {
    store: ZiScopedStore<'a>,
    issues: &'a mut Vec<ZiRowIssue>,
}

impl<'a> ZiExecutorContext<'a> {
    pub fn new(store: ZiScopedStore<'a>, issues: &'a mut Vec<ZiRowIssue>) -> Self {
        ZiExecutorContext { store, issues }
    }

    /// Store entries private to the current statement.
    pub fn store(&mut self) -> &mut ZiScopedStore<'a> {
        &mut self.store
    }

    /// Records a recoverable row problem and keeps going.
    pub fn report(&mut self, row: usize, column: Option<&str>, message: impl Into<String>) {
        let scope = self.store.scope();
        let issue = ZiRowIssue {
            directive: scope.directive.clone(),
            statement: scope.statement,
            row,
            column: column.map(str::to_string),
            message: message.into(),
        };
        log::debug!(
            "row {} issue in '{}' (statement {}): {}",
            issue.row,
            issue.directive,
            issue.statement,
            issue.message
        );
        self.issues.push(issue);
    }
}

/// Runs `execute` and attributes any failure to the directive.
pub fn execute_directive(
    directive: &mut dyn ZiDirective,
    rows: ZiRowBatch,
    ctx: &mut ZiExecutorContext<'_>,
) -> Result<ZiRowBatch> {
    let name = directive.name();
    directive.execute(rows, ctx).map_err(|err| attribute(name, err))
}

/// Runs `finish` and attributes any failure to the directive.
pub fn finish_directive(
    directive: &mut dyn ZiDirective,
    ctx: &mut ZiExecutorContext<'_>,
) -> Result<ZiRowBatch> {
    let name = directive.name();
    directive.finish(ctx).map_err(|err| attribute(name, err))
}

fn attribute(name: &str, err: ZiError) -> ZiError {
    match err {
        ZiError::DirectiveExecution { .. } => err,
        other => ZiError::directive_execution(name, other.to_string()),
    }
}
