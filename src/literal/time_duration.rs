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


use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::literal::{cached_pattern, scale_to_i64, ZiPatternCell};

const KIND: &str = "time duration";

static UNIT_PATTERN: ZiPatternCell = OnceLock::new();
static BARE_PATTERN: ZiPatternCell = OnceLock::new();

/// Time units a duration can be normalized from or converted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiTimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ZiTimeUnit {
    pub const ALL: [ZiTimeUnit; 7] = [
        ZiTimeUnit::Nanoseconds,
        ZiTimeUnit::Microseconds,
        ZiTimeUnit::Milliseconds,
        ZiTimeUnit::Seconds,
        ZiTimeUnit::Minutes,
        ZiTimeUnit::Hours,
        ZiTimeUnit::Days,
    ];

    /// Number of nanoseconds in one unit.
    pub fn nanos(&self) -> i64 {
        match self {
            ZiTimeUnit::Nanoseconds => 1,
            ZiTimeUnit::Microseconds => 1_000,
            ZiTimeUnit::Milliseconds => 1_000_000,
            ZiTimeUnit::Seconds => 1_000_000_000,
            ZiTimeUnit::Minutes => 60 * 1_000_000_000,
            ZiTimeUnit::Hours => 3_600 * 1_000_000_000,
            ZiTimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZiTimeUnit::Nanoseconds => "NANOS",
            ZiTimeUnit::Microseconds => "MICROS",
            ZiTimeUnit::Milliseconds => "MS",
            ZiTimeUnit::Seconds => "S",
            ZiTimeUnit::Minutes => "MINUTES",
            ZiTimeUnit::Hours => "HOURS",
            ZiTimeUnit::Days => "DAYS",
        }
    }

    /// Case-insensitive inverse of [`ZiTimeUnit::label`]; `SECONDS` is
    /// accepted as a synonym of `S`.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        if upper == "SECONDS" {
            return Some(ZiTimeUnit::Seconds);
        }
        Self::ALL.into_iter().find(|unit| unit.label() == upper)
    }

    /// Maps a literal suffix (`ms`, `sec`, `hours`, ...) to its unit.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "ns" | "nano" | "nanos" | "nanosecond" | "nanoseconds" => ZiTimeUnit::Nanoseconds,
            "us" | "micro" | "micros" | "microsecond" | "microseconds" => ZiTimeUnit::Microseconds,
            "ms" | "milli" | "millis" | "millisecond" | "milliseconds" => ZiTimeUnit::Milliseconds,
            "s" | "sec" | "secs" | "second" | "seconds" => ZiTimeUnit::Seconds,
            "m" | "min" | "mins" | "minute" | "minutes" => ZiTimeUnit::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => ZiTimeUnit::Hours,
            "d" | "day" | "days" => ZiTimeUnit::Days,
            _ => return None,
        };
        Some(unit)
    }
}

/// A duration parsed from text such as `150ms`, `2.5 s` or `100`.
///
/// Whitespace between the number and the unit is accepted. A bare number is a
/// count of milliseconds. The value is kept as integer nanoseconds; equality
/// compares both the nanoseconds and the original text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZiTimeDuration {
    nanos: i64,
    original: String,
}

impl ZiTimeDuration {
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ZiError::invalid_literal(KIND, text, "time duration string cannot be empty"));
        }

        let unit_pattern = cached_pattern(
            &UNIT_PATTERN,
            r"(?i)^(\d+)(?:\.(\d+))?\s*(nanoseconds?|nanos?|ns|microseconds?|micros?|us|milliseconds?|millis?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|hr|h|days?|d)$",
        )?;
        let (caps, unit) = if let Some(caps) = unit_pattern.captures(trimmed) {
            let unit = caps
                .get(3)
                .and_then(|m| ZiTimeUnit::from_suffix(m.as_str()))
                .ok_or_else(|| ZiError::invalid_literal(KIND, text, "unknown time unit"))?;
            (caps, unit)
        } else if let Some(caps) = cached_pattern(&BARE_PATTERN, r"^(\d+)(?:\.(\d+))?$")?.captures(trimmed) {
            (caps, ZiTimeUnit::Milliseconds)
        } else {
            return Err(ZiError::invalid_literal(
                KIND,
                text,
                "expected a format like '150ms', '2.5s', or a plain number of milliseconds",
            ));
        };

        let nanos = scale_to_i64(
            KIND,
            text,
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map(|m| m.as_str()),
            unit.nanos(),
        )?;

        Ok(ZiTimeDuration {
            nanos,
            original: text.to_string(),
        })
    }

    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Duration expressed in `unit`, as a floating-point quotient.
    pub fn as_unit(&self, unit: ZiTimeUnit) -> f64 {
        self.nanos as f64 / unit.nanos() as f64
    }

    pub fn to_std(&self) -> Duration {
        Duration::from_nanos(self.nanos.max(0) as u64)
    }
}

impl FromStr for ZiTimeDuration {
    type Err = ZiError;

    fn from_str(s: &str) -> Result<Self> {
        ZiTimeDuration::parse(s)
    }
}

impl fmt::Display for ZiTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
