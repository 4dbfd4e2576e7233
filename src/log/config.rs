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


use std::collections::HashMap;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// Configuration for [`crate::log::ZiLogger`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiLogConfig {
    /// Threshold applied to every target without an override.
    pub default_level: String,
    /// Per-target thresholds; the longest matching target prefix wins.
    pub target_levels: HashMap<String, String>,
    pub console_enabled: bool,
    pub json_format_console: bool,
    /// Whether file logging is enabled.
    pub file_enabled: bool,
    /// Log file path when file logging is enabled.
    pub file_path: Option<String>,
    pub json_format_file: bool,
    /// Size in bytes after which the log file is rotated.
    pub max_bytes: Option<u64>,
    /// Number of rotated files to keep.
    pub backup_count: Option<u32>,
}

impl Default for ZiLogConfig {
    fn default() -> Self {
        ZiLogConfig {
            default_level: "INFO".to_string(),
            target_levels: HashMap::new(),
            console_enabled: true,
            json_format_console: false,
            file_enabled: false,
            file_path: None,
            json_format_file: true,
            max_bytes: Some(10 * 1024 * 1024),
            backup_count: Some(7),
        }
    }
}

/// Parses a level name such as `INFO` or `warning`.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.trim().to_ascii_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "INFO" => LevelFilter::Info,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        other => {
            return Err(ZiError::validation(format!(
                "unknown log level '{other}'; expected OFF, ERROR, WARN, INFO, DEBUG or TRACE"
            )))
        }
    };
    Ok(filter)
}

impl ZiLogConfig {
    pub fn validate(&self) -> Result<()> {
        parse_level(&self.default_level)?;
        for level in self.target_levels.values() {
            parse_level(level)?;
        }
        if self.file_enabled && self.file_path.as_deref().map_or(true, str::is_empty) {
            return Err(ZiError::validation("file logging is enabled but no file_path is set"));
        }
        Ok(())
    }

    /// Threshold for `target`.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        let level = self
            .target_levels
            .iter()
            .filter(|(prefix, _)| target.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(self.default_level.as_str(), |(_, level)| level.as_str());
        parse_level(level).unwrap_or(LevelFilter::Info)
    }

    /// Most verbose threshold across the default and every override.
    pub fn max_level(&self) -> LevelFilter {
        self.target_levels
            .values()
            .filter_map(|level| parse_level(level).ok())
            .chain(parse_level(&self.default_level).ok())
            .max()
            .unwrap_or(LevelFilter::Info)
    }
}
