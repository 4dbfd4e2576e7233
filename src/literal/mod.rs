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


//! # Literal Module
//!
//! Parsers for the literal sublanguages a recipe may contain. Each literal is
//! constructed once from its text, normalized to an integer value and kept
//! together with the original text:
//!
//! - [`ZiByteSize`]: `10KB`, `1.5m`, `2048` (binary prefixes, bytes as `i64`)
//! - [`ZiTimeDuration`]: `150ms`, `2.5 s`, `100` (nanoseconds as `i64`, a bare
//!   number is read as milliseconds)
//!
//! Both types are immutable and cheap to clone, so rows and tokens can carry
//! them around freely.

pub mod byte_size;
pub mod time_duration;

pub use byte_size::{ZiByteSize, ZiByteUnit};
pub use time_duration::{ZiTimeDuration, ZiTimeUnit};

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Result, ZiError};

pub(crate) type ZiPatternCell = OnceLock<std::result::Result<Regex, String>>;

/// Compiles `pattern` once and hands out the cached regex afterwards.
pub(crate) fn cached_pattern(cell: &'static ZiPatternCell, pattern: &str) -> Result<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|err| ZiError::internal(format!("invalid pattern '{pattern}': {err}")))
}

/// Scales `whole[.fraction]` by `multiplier`.
///
/// Integral values use checked integer arithmetic so large inputs stay exact;
/// fractional values go through `f64` and are truncated toward zero, so
/// `1.9999k` is 2047 bytes.
pub(crate) fn scale_to_i64(
    kind: &str,
    text: &str,
    whole: &str,
    fraction: Option<&str>,
    multiplier: i64,
) -> Result<i64> {
    let out_of_range = || {
        ZiError::invalid_literal(kind, text, "value does not fit in a 64-bit signed integer")
    };

    match fraction {
        None => {
            let value: i64 = whole.parse().map_err(|_| out_of_range())?;
            value.checked_mul(multiplier).ok_or_else(out_of_range)
        }
        Some(fraction) => {
            let number: f64 = format!("{whole}.{fraction}")
                .parse()
                .map_err(|_| ZiError::invalid_literal(kind, text, "malformed number"))?;
            let scaled = number * multiplier as f64;
            // i64::MAX is not representable in f64; the nearest value above it is.
            if !scaled.is_finite() || scaled >= i64::MAX as f64 {
                return Err(out_of_range());
            }
            Ok(scaled.trunc() as i64)
        }
    }
}
