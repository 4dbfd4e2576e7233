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


//! Accumulates byte sizes and durations over every row of an execution and
//! emits a single summary row from `finish`.

use crate::directive::{ZiDirective, ZiExecutorContext};
use crate::dsl::usage::ZiUsageDefinition;
use crate::errors::{Result, ZiError};
use crate::lineage::ZiMutation;
use crate::literal::{ZiByteSize, ZiByteUnit, ZiTimeDuration, ZiTimeUnit};
use crate::record::{ZiRow, ZiRowBatch, ZiValue};
use crate::token::{ZiArguments, ZiTokenType};

pub const NAME: &str = "aggregate-stats";

const TOTAL_BYTES: &str = "total_bytes";
const TOTAL_NANOS: &str = "total_nanos";
const ROWS: &str = "rows";

const SIZE_UNITS: &[&str] = &["BYTES", "KB", "MB", "GB", "TB", "PB"];
const TIME_UNITS: &[&str] = &["NANOS", "MICROS", "MS", "S", "SECONDS", "MINUTES", "HOURS", "DAYS"];
const TIME_MODES: &[&str] = &["TOTAL", "AVERAGE"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZiTimeMode {
    #[default]
    Total,
    Average,
}

/// `aggregate-stats :size :time :target_size :target_time [size_unit:..] [time_unit:..] [time_mode:..]`
///
/// `execute` consumes its input and returns nothing. Totals live in the
/// statement's store scope so they survive across batches.
#[derive(Debug)]
pub struct ZiAggregateStats {
    size_column: String,
    time_column: String,
    target_size_column: String,
    target_time_column: String,
    size_unit: ZiByteUnit,
    time_unit: ZiTimeUnit,
    time_mode: ZiTimeMode,
}

impl Default for ZiAggregateStats {
    fn default() -> Self {
        ZiAggregateStats {
            size_column: String::new(),
            time_column: String::new(),
            target_size_column: String::new(),
            target_time_column: String::new(),
            size_unit: ZiByteUnit::Bytes,
            time_unit: ZiTimeUnit::Nanoseconds,
            time_mode: ZiTimeMode::Total,
        }
    }
}

pub fn create() -> Box<dyn ZiDirective + Send> {
    Box::new(ZiAggregateStats::default())
}

enum ZiSample {
    Value(i64),
    Skip,
    Unparsable(String),
}

impl ZiAggregateStats {
    fn size_of(&self, value: &ZiValue) -> Result<ZiSample> {
        Ok(match value {
            ZiValue::Null => ZiSample::Skip,
            ZiValue::ByteSize(size) => ZiSample::Value(size.bytes()),
            ZiValue::Int(bytes) => ZiSample::Value(*bytes),
            ZiValue::Float(bytes) => ZiSample::Value(self.float_to_i64(&self.size_column, *bytes)?),
            ZiValue::String(text) => match ZiByteSize::parse(text) {
                Ok(size) => ZiSample::Value(size.bytes()),
                Err(err) => ZiSample::Unparsable(err.to_string()),
            },
            other => return Err(self.unsupported(&self.size_column, other)),
        })
    }

    fn nanos_of(&self, value: &ZiValue) -> Result<ZiSample> {
        Ok(match value {
            ZiValue::Null => ZiSample::Skip,
            ZiValue::TimeDuration(duration) => ZiSample::Value(duration.nanos()),
            ZiValue::Int(millis) => match millis.checked_mul(1_000_000) {
                Some(nanos) => ZiSample::Value(nanos),
                None => return Err(self.out_of_range(&self.time_column, *millis as f64)),
            },
            ZiValue::Float(millis) => {
                ZiSample::Value(self.float_to_i64(&self.time_column, millis * 1_000_000.0)?)
            }
            ZiValue::String(text) => match ZiTimeDuration::parse(text) {
                Ok(duration) => ZiSample::Value(duration.nanos()),
                Err(err) => ZiSample::Unparsable(err.to_string()),
            },
            other => return Err(self.unsupported(&self.time_column, other)),
        })
    }

    fn float_to_i64(&self, column: &str, value: f64) -> Result<i64> {
        if !value.is_finite() || value >= i64::MAX as f64 || value < i64::MIN as f64 {
            return Err(self.out_of_range(column, value));
        }
        Ok(value.trunc() as i64)
    }

    fn out_of_range(&self, column: &str, value: f64) -> ZiError {
        ZiError::directive_execution(
            NAME,
            format!("value {value} in column '{column}' does not fit a 64-bit integer"),
        )
    }

    fn unsupported(&self, column: &str, value: &ZiValue) -> ZiError {
        ZiError::directive_execution(
            NAME,
            format!("column '{column}' holds an unsupported {} value", value.type_name()),
        )
    }

    fn accumulate(
        &self,
        index: usize,
        column: &str,
        sample: ZiSample,
        slot: &'static str,
        ctx: &mut ZiExecutorContext<'_>,
    ) -> Result<()> {
        match sample {
            ZiSample::Value(amount) => {
                ctx.store().increment(slot, amount)?;
            }
            ZiSample::Skip => {}
            ZiSample::Unparsable(message) => ctx.report(index, Some(column), message),
        }
        Ok(())
    }

    fn size_output(&self, total_bytes: i64) -> ZiValue {
        match self.size_unit {
            ZiByteUnit::Bytes => ZiValue::Int(total_bytes),
            unit => ZiValue::Float(round_half_up(
                total_bytes as f64 / unit.multiplier() as f64,
            )),
        }
    }

    fn time_output(&self, total_nanos: i64, rows: i64) -> ZiValue {
        let nanos = match self.time_mode {
            ZiTimeMode::Total => total_nanos as f64,
            ZiTimeMode::Average => total_nanos as f64 / rows as f64,
        };
        match self.time_unit {
            ZiTimeUnit::Nanoseconds => ZiValue::Int(nanos as i64),
            unit => ZiValue::Float(round_half_up(nanos / unit.nanos() as f64)),
        }
    }
}

/// Rounds to three decimals, halves away from zero, using the shortest
/// decimal rendering of `value` so `1.0005` rounds up.
pub fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let fallback = (value * 1000.0).round() / 1000.0;
    let text = value.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if fraction.len() <= 3 {
        return value;
    }
    let kept = &fraction[..3];
    let Ok(thousandths) = format!("{whole}{kept}").parse::<f64>() else {
        return fallback;
    };
    let bump = if fraction.as_bytes()[3] >= b'5' { 1.0 } else { 0.0 };
    ((thousandths + bump) / 1000.0).copysign(value)
}

impl ZiDirective for ZiAggregateStats {
    fn name(&self) -> &'static str {
        NAME
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder(NAME)
            .define("size_column", ZiTokenType::ColumnName)
            .define("time_column", ZiTokenType::ColumnName)
            .define("target_size_column", ZiTokenType::ColumnName)
            .define("target_time_column", ZiTokenType::ColumnName)
            .define_choice("size_unit", SIZE_UNITS)
            .define_choice("time_unit", TIME_UNITS)
            .define_choice("time_mode", TIME_MODES)
            .build()
    }

    fn initialize(&mut self, args: &ZiArguments) -> Result<()> {
        self.size_column = args.column("size_column")?.to_string();
        self.time_column = args.column("time_column")?.to_string();
        self.target_size_column = args.column("target_size_column")?.to_string();
        self.target_time_column = args.column("target_time_column")?.to_string();

        if let Some(unit) = args.optional_text("size_unit")? {
            self.size_unit = ZiByteUnit::from_label(unit).ok_or_else(|| {
                ZiError::directive_parse(
                    NAME,
                    format!("invalid size_unit '{unit}', supported values are {{{}}}", SIZE_UNITS.join(", ")),
                )
            })?;
        }
        if let Some(unit) = args.optional_text("time_unit")? {
            self.time_unit = ZiTimeUnit::from_label(unit).ok_or_else(|| {
                ZiError::directive_parse(
                    NAME,
                    format!("invalid time_unit '{unit}', supported values are {{{}}}", TIME_UNITS.join(", ")),
                )
            })?;
        }
        if let Some(mode) = args.optional_text("time_mode")? {
            self.time_mode = match mode.trim().to_ascii_uppercase().as_str() {
                "TOTAL" => ZiTimeMode::Total,
                "AVERAGE" => ZiTimeMode::Average,
                _ => {
                    return Err(ZiError::directive_parse(
                        NAME,
                        format!("invalid time_mode '{mode}', supported values are {{{}}}", TIME_MODES.join(", ")),
                    ))
                }
            };
        }
        Ok(())
    }

    fn execute(&mut self, rows: ZiRowBatch, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        for (index, row) in rows.iter().enumerate() {
            if let Some(value) = row.get(&self.size_column) {
                let sample = self.size_of(value)?;
                self.accumulate(index, &self.size_column, sample, TOTAL_BYTES, ctx)?;
            }
            if let Some(value) = row.get(&self.time_column) {
                let sample = self.nanos_of(value)?;
                self.accumulate(index, &self.time_column, sample, TOTAL_NANOS, ctx)?;
            }
            ctx.store().increment(ROWS, 1)?;
        }
        Ok(Vec::new())
    }

    fn finish(&mut self, ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        let store = ctx.store();
        let rows = store.int(ROWS)?;
        if rows == 0 {
            return Ok(Vec::new());
        }
        let total_bytes = store.int(TOTAL_BYTES)?;
        let total_nanos = store.int(TOTAL_NANOS)?;
        log::debug!("{NAME} summarizing {rows} row(s): {total_bytes} bytes, {total_nanos} ns");

        let row = ZiRow::new()
            .with(self.target_size_column.clone(), self.size_output(total_bytes))
            .with(self.target_time_column.clone(), self.time_output(total_nanos, rows));
        Ok(vec![row])
    }

    fn lineage(&self) -> Option<ZiMutation> {
        Some(
            ZiMutation::builder()
                .readable(format!(
                    "Aggregated '{}' and '{}' into '{}' ({}) and '{}' ({}, {})",
                    self.size_column,
                    self.time_column,
                    self.target_size_column,
                    self.size_unit.label(),
                    self.target_time_column,
                    self.time_unit.label(),
                    match self.time_mode {
                        ZiTimeMode::Total => "total",
                        ZiTimeMode::Average => "average",
                    }
                ))
                .relation(self.size_column.clone(), self.target_size_column.clone())
                .relation(self.time_column.clone(), self.target_time_column.clone())
                .drop_columns([self.size_column.clone(), self.time_column.clone()])
                .build(),
        )
    }
}
