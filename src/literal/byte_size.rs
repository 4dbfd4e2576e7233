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

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::literal::{cached_pattern, scale_to_i64, ZiPatternCell};

const KIND: &str = "byte size";

static UNIT_PATTERN: ZiPatternCell = OnceLock::new();
static COUNT_PATTERN: ZiPatternCell = OnceLock::new();

/// Binary size units understood by byte size literals and by directives that
/// report sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiByteUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Petabytes,
}

impl ZiByteUnit {
    pub const ALL: [ZiByteUnit; 6] = [
        ZiByteUnit::Bytes,
        ZiByteUnit::Kilobytes,
        ZiByteUnit::Megabytes,
        ZiByteUnit::Gigabytes,
        ZiByteUnit::Terabytes,
        ZiByteUnit::Petabytes,
    ];

    /// Number of bytes in one unit.
    pub fn multiplier(&self) -> i64 {
        match self {
            ZiByteUnit::Bytes => 1,
            ZiByteUnit::Kilobytes => 1 << 10,
            ZiByteUnit::Megabytes => 1 << 20,
            ZiByteUnit::Gigabytes => 1 << 30,
            ZiByteUnit::Terabytes => 1 << 40,
            ZiByteUnit::Petabytes => 1 << 50,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZiByteUnit::Bytes => "BYTES",
            ZiByteUnit::Kilobytes => "KB",
            ZiByteUnit::Megabytes => "MB",
            ZiByteUnit::Gigabytes => "GB",
            ZiByteUnit::Terabytes => "TB",
            ZiByteUnit::Petabytes => "PB",
        }
    }

    /// Looks a unit up by its label (`BYTES`, `KB`, ... `PB`), ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|unit| unit.label() == upper)
    }

    fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'K' => Some(ZiByteUnit::Kilobytes),
            'M' => Some(ZiByteUnit::Megabytes),
            'G' => Some(ZiByteUnit::Gigabytes),
            'T' => Some(ZiByteUnit::Terabytes),
            'P' => Some(ZiByteUnit::Petabytes),
            _ => None,
        }
    }
}

/// A byte count parsed from text such as `10KB`, `1.5m` or `4096`.
///
/// Units use binary prefixes (`K` = 1024) and may carry an optional trailing
/// `b`. No whitespace is allowed between the number and the unit. Equality
/// compares both the byte count and the original text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZiByteSize {
    bytes: i64,
    original: String,
}

impl ZiByteSize {
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ZiError::invalid_literal(KIND, text, "byte size string cannot be empty"));
        }

        let unit_pattern = cached_pattern(
            &UNIT_PATTERN,
            r"^(\d+)(?:\.(\d+))?([kKmMgGtTpP])[bB]?$",
        )?;
        let bytes = if let Some(caps) = unit_pattern.captures(trimmed) {
            let unit = caps
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .and_then(ZiByteUnit::from_prefix)
                .ok_or_else(|| ZiError::invalid_literal(KIND, text, "unknown size unit"))?;
            scale_to_i64(
                KIND,
                text,
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map(|m| m.as_str()),
                unit.multiplier(),
            )?
        } else if cached_pattern(&COUNT_PATTERN, r"^\d+$")?.is_match(trimmed) {
            scale_to_i64(KIND, text, trimmed, None, 1)?
        } else {
            return Err(ZiError::invalid_literal(
                KIND,
                text,
                "expected a format like '10KB', '1.5MB', or a plain number of bytes",
            ));
        };

        Ok(ZiByteSize {
            bytes,
            original: text.to_string(),
        })
    }

    pub fn bytes(&self) -> i64 {
        self.bytes
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Size expressed in `unit`, as a floating-point quotient.
    pub fn as_unit(&self, unit: ZiByteUnit) -> f64 {
        self.bytes as f64 / unit.multiplier() as f64
    }
}

impl FromStr for ZiByteSize {
    type Err = ZiError;

    fn from_str(s: &str) -> Result<Self> {
        ZiByteSize::parse(s)
    }
}

impl fmt::Display for ZiByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
