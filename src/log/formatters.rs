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


use crate::log::core::ZiLogRecord;

pub trait ZiLogFormatter {
    fn format(&self, record: &ZiLogRecord) -> String;
}

/// One JSON object per line.
pub struct ZiJsonFormatter;

impl ZiLogFormatter for ZiJsonFormatter {
    fn format(&self, record: &ZiLogRecord) -> String {
        record.to_json().to_string()
    }
}

/// `<timestamp_ms> <LEVEL> <target>: <message>`
pub struct ZiTextFormatter;

impl ZiLogFormatter for ZiTextFormatter {
    fn format(&self, record: &ZiLogRecord) -> String {
        format!(
            "{} {:<5} {}: {}",
            record.timestamp_ms(),
            record.level.as_str(),
            record.target,
            record.message
        )
    }
}
