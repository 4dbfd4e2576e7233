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


//! # Recipe DSL Module
//!
//! A recipe is a straight-line sequence of directive statements, one per line:
//!
//! ```text
//! # explode the items, then total their sizes
//! flatten :items
//! aggregate-stats :size :time total_mb total_s size_unit:MB time_unit:s
//! ```
//!
//! Blank lines and lines starting with `#` or `//` are ignored. A statement is
//! a directive name followed by positional arguments and `key:value` options.
//!
//! ## Architecture
//!
//! - **Lexer** (`lexer.rs`): splits a line into words and classifies them
//!   into fragments (columns, literals, properties, text)
//! - **IR** ([`ir`]): statements and fragments with source spans
//! - **Parser** ([`parser`]): scans all lines and collects lexical errors
//! - **Usage** ([`usage`]): argument contracts and the binder producing
//!   [`crate::token::ZiArguments`]
//! - **Compiler** ([`compiler`]): resolves directives in the registry, binds
//!   and initializes them, and composes lineage into a
//!   [`crate::pipeline::ZiRecipe`]

pub mod compiler;
pub mod ir;
mod lexer;
pub mod parser;
pub mod usage;

pub use compiler::ZiRecipeCompiler;
pub use ir::{ZiFragment, ZiFragmentKind, ZiSpan, ZiStatement};
pub use parser::{ZiParseResult, ZiRecipeParser};
pub use usage::{bind, ZiArgSpec, ZiUsageBuilder, ZiUsageDefinition};
