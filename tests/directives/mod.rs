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


mod aggregate_stats;
mod flatten;
mod parse_log;
mod text_metric;

use zi_wrangle::{ZiRecipeRunner, ZiRow, ZiRowBatch};

/// Compiles `recipe` and runs it over `rows` through a whole pipeline.
pub fn run(recipe: &str, rows: ZiRowBatch) -> zi_wrangle::Result<ZiRowBatch> {
    ZiRecipeRunner::new(recipe).run(rows)
}

pub fn row(pairs: &[(&str, &str)]) -> ZiRow {
    pairs.iter().fold(ZiRow::new(), |row, (column, value)| row.with(*column, *value))
}
