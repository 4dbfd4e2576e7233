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


use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, Log, Metadata, Record};
use serde_json::{json, Map, Value};

use crate::errors::{Result, ZiError};
use crate::log::config::ZiLogConfig;
use crate::log::formatters::{ZiJsonFormatter, ZiLogFormatter, ZiTextFormatter};
use crate::log::handlers::{ZiConsoleHandler, ZiFileHandler, ZiLogHandler};

/// Owned copy of a `log` record handed to formatters.
#[derive(Clone, Debug)]
pub struct ZiLogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub module_path: Option<String>,
    pub line: Option<u32>,
    pub timestamp: SystemTime,
}

impl ZiLogRecord {
    pub fn from_record(record: &Record<'_>) -> Self {
        ZiLogRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            module_path: record.module_path().map(str::to_string),
            line: record.line(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn timestamp_ms(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    pub fn to_json(&self) -> Value {
        let mut data = Map::new();
        data.insert("level".into(), json!(self.level.as_str()));
        data.insert("target".into(), json!(self.target));
        data.insert("message".into(), json!(self.message));
        data.insert("timestamp_ms".into(), json!(self.timestamp_ms()));
        if let Some(module_path) = &self.module_path {
            data.insert("module".into(), json!(module_path));
        }
        if let Some(line) = self.line {
            data.insert("line".into(), json!(line));
        }
        Value::Object(data)
    }
}

static LOGGER: OnceLock<ZiLogger> = OnceLock::new();

/// `log` backend writing to the handlers enabled in a [`ZiLogConfig`].
pub struct ZiLogger {
    config: ZiLogConfig,
    handlers: Vec<Box<dyn ZiLogHandler + Send + Sync>>,
}

impl std::fmt::Debug for ZiLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZiLogger")
            .field("config", &self.config)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

fn formatter(json: bool) -> Box<dyn ZiLogFormatter + Send + Sync> {
    if json {
        Box::new(ZiJsonFormatter)
    } else {
        Box::new(ZiTextFormatter)
    }
}

impl ZiLogger {
    /// Builds a logger without installing it.
    pub fn new(config: ZiLogConfig) -> Result<Self> {
        config.validate()?;
        let mut handlers: Vec<Box<dyn ZiLogHandler + Send + Sync>> = Vec::new();
        if config.console_enabled {
            handlers.push(Box::new(ZiConsoleHandler::new(formatter(config.json_format_console))));
        }
        if config.file_enabled {
            if let Some(path) = &config.file_path {
                handlers.push(Box::new(ZiFileHandler::new(
                    path.clone(),
                    formatter(config.json_format_file),
                    config.max_bytes,
                    config.backup_count,
                )));
            }
        }
        Ok(ZiLogger { config, handlers })
    }

    /// Installs a global logger built from `config`. Safe to call multiple
    /// times; the first call wins and later calls return `Ok(false)`.
    pub fn init(config: ZiLogConfig) -> Result<bool> {
        if LOGGER.get().is_some() {
            return Ok(false);
        }
        let logger = ZiLogger::new(config)?;
        let max_level = logger.config.max_level();
        if LOGGER.set(logger).is_err() {
            return Ok(false);
        }
        let Some(installed) = LOGGER.get() else {
            return Ok(false);
        };
        log::set_logger(installed)
            .map_err(|err| ZiError::internal(format!("failed to install logger: {err}")))?;
        log::set_max_level(max_level);
        Ok(true)
    }

    pub fn config(&self) -> &ZiLogConfig {
        &self.config
    }

    /// Sends `record` to every handler, bypassing level filtering.
    pub fn emit(&self, record: &ZiLogRecord) {
        for handler in &self.handlers {
            handler.handle(record);
        }
    }
}

impl Log for ZiLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.config.level_for(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.emit(&ZiLogRecord::from_record(record));
        }
    }

    fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn enabled_follows_target_levels() {
        let mut config = ZiLogConfig {
            console_enabled: false,
            ..ZiLogConfig::default()
        };
        config.target_levels.insert("noisy".into(), "ERROR".into());
        let logger = ZiLogger::new(config).unwrap();

        let warn_noisy = Metadata::builder().level(Level::Warn).target("noisy::x").build();
        let warn_other = Metadata::builder().level(Level::Warn).target("quiet").build();
        assert!(!logger.enabled(&warn_noisy));
        assert!(logger.enabled(&warn_other));
        assert_eq!(logger.config().max_level(), LevelFilter::Info);
    }

    #[test]
    fn record_json_carries_location() {
        let record = ZiLogRecord {
            level: Level::Info,
            target: "zi_wrangle::pipeline".into(),
            message: "done".into(),
            module_path: None,
            line: Some(12),
            timestamp: UNIX_EPOCH,
        };
        let value = record.to_json();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["line"], 12);
        assert_eq!(value["timestamp_ms"], 0);
    }
}
