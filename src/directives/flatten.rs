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


//! Separates array elements of one or more columns into individual rows,
//! copying the other columns.

use crate::directive::{ZiDirective, ZiExecutorContext};
use crate::dsl::usage::ZiUsageDefinition;
use crate::errors::Result;
use crate::lineage::ZiMutation;
use crate::record::{ZiRow, ZiRowBatch, ZiValue};
use crate::token::{ZiArguments, ZiTokenType};

pub const NAME: &str = "flatten";

/// `flatten :column[,:column]*`
///
/// For each row the output count is the longest array among the columns
/// (scalars and nulls count as one). Shorter arrays are padded with null. When
/// every present column holds an empty array, one row is emitted with those
/// columns set to null. Columns missing from a row that has at least one of
/// them are added as null; rows with none of them pass through unchanged.
#[derive(Debug, Default)]
pub struct ZiFlatten {
    columns: Vec<String>,
}

pub fn create() -> Box<dyn ZiDirective + Send> {
    Box::new(ZiFlatten::default())
}

impl ZiFlatten {
    /// Expands one row into as many rows as its widest target array.
    ///
    /// A row holding none of the target columns passes through unchanged
    /// instead of being dropped.
    fn expand(&self, row: ZiRow, out: &mut ZiRowBatch) {
        let locations: Vec<Option<usize>> = self.columns.iter().map(|c| row.find(c)).collect();
        if locations.iter().all(Option::is_none) {
            out.push(row);
            return;
        }

        let width = |value: &ZiValue| match value {
            ZiValue::Array(items) => items.len(),
            _ => 1,
        };
        let max = locations
            .iter()
            .flatten()
            .filter_map(|&idx| row.value_at(idx))
            .map(width)
            .max()
            .unwrap_or(0);

        if max == 0 {
            let mut emptied = row;
            for (column, location) in self.columns.iter().zip(&locations) {
                match location {
                    Some(idx) => {
                        emptied.set_value(*idx, ZiValue::Null);
                    }
                    None => emptied.add_or_set(column, ZiValue::Null),
                }
            }
            out.push(emptied);
            return;
        }

        for k in 0..max {
            let mut expanded = row.clone();
            for (column, location) in self.columns.iter().zip(&locations) {
                let Some(idx) = *location else {
                    expanded.add_or_set(column, ZiValue::Null);
                    continue;
                };
                let value = match row.value_at(idx) {
                    Some(ZiValue::Array(items)) => items.get(k).cloned().unwrap_or(ZiValue::Null),
                    Some(other) => other.clone(),
                    None => ZiValue::Null,
                };
                expanded.set_value(idx, value);
            }
            out.push(expanded);
        }
    }
}

impl ZiDirective for ZiFlatten {
    fn name(&self) -> &'static str {
        NAME
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder(NAME)
            .define("column", ZiTokenType::ColumnNameList)
            .build()
    }

    fn initialize(&mut self, args: &ZiArguments) -> Result<()> {
        self.columns = args.columns("column")?;
        Ok(())
    }

    fn execute(&mut self, rows: ZiRowBatch, _ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            self.expand(row, &mut out);
        }
        Ok(out)
    }

    fn lineage(&self) -> Option<ZiMutation> {
        Some(
            ZiMutation::builder()
                .readable(format!(
                    "Expanded to individual records based on values in columns '{}'",
                    self.columns.join(", ")
                ))
                .all(self.columns.iter().cloned(), self.columns.iter().cloned())
                .build(),
        )
    }
}
