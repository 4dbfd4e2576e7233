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


//! # Zi Wrangle Library
//!
//! Recipe compiler and row-transformation engine for the Zi framework.
//! A recipe is a straight-line list of directive statements such as
//! `flatten :items` or `aggregate-stats :size :time :mb :s size_unit:MB`.
//! It is compiled into fresh directive instances and then drives batches of
//! rows through them.
//!
//! ## Module Overview
//!
//! - **literal**: byte size and time duration literals
//! - **token**: typed argument values and the bound argument bag
//! - **dsl**: recipe tokenizer, parser, usage definitions, binder and compiler
//! - **directive**: the directive contract and execution context
//! - **directives**: built-in directives
//! - **registry**: name to factory mapping with aliases and exclusions
//! - **pipeline**: compiled recipes, per-execution pipelines and the runner
//! - **store**: per-execution transient state scoped by statement
//! - **lineage**: column-level mutation records composed per recipe
//! - **record**: the row data model
//! - **config**: engine configuration from JSON or YAML
//! - **log**: `log` facade backend with console and file handlers
//!
//! ## Feature Flags
//!
//! - `parallel`: runs independent executions concurrently with Rayon
//! - `full`: enables all features (default)
//!
//! ## Quick Start
//!
//! ```rust
//! use zi_wrangle::{ZiRecipeRunner, ZiRow, ZiValue};
//!
//! let runner = ZiRecipeRunner::new("flatten :items");
//! let rows = vec![ZiRow::new()
//!     .with("id", 7)
//!     .with("items", ZiValue::Array(vec![1.into(), 2.into()]))];
//! let out = runner.run(rows).unwrap();
//! assert_eq!(out.len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Compile failures carry every
//! syntax error found in the recipe; execution failures name the directive.

pub mod config;
pub mod directive;
pub mod directives;
pub mod dsl;
pub mod errors;
pub mod lineage;
pub mod literal;
pub mod log;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod store;
pub mod token;

pub use config::ZiEngineConfig;
pub use directive::{ZiDirective, ZiDirectiveState, ZiExecutorContext, ZiRowIssue};
pub use dsl::{ZiRecipeCompiler, ZiRecipeParser, ZiUsageDefinition};
pub use errors::{Result, ZiCompileErrors, ZiError, ZiSyntaxError};
pub use lineage::{ZiLineageGraph, ZiMutation};
pub use literal::{ZiByteSize, ZiByteUnit, ZiTimeDuration, ZiTimeUnit};
pub use pipeline::{ZiPipelinePhase, ZiRecipe, ZiRecipePipeline, ZiRecipeRunner};
pub use record::{ZiRow, ZiRowBatch, ZiValue};
pub use registry::{ZiDirectiveEntry, ZiDirectiveRegistry};
pub use store::{ZiScopedStore, ZiStoreScope, ZiTransientStore};
pub use token::{ZiArguments, ZiToken, ZiTokenType};
