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


use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::log::core::ZiLogRecord;
use crate::log::formatters::ZiLogFormatter;

pub trait ZiLogHandler {
    fn handle(&self, record: &ZiLogRecord);

    fn flush(&self) {}
}

/// Writes errors and warnings to stderr, everything else to stdout.
pub struct ZiConsoleHandler {
    formatter: Box<dyn ZiLogFormatter + Send + Sync>,
}

impl ZiConsoleHandler {
    pub fn new(formatter: Box<dyn ZiLogFormatter + Send + Sync>) -> Self {
        ZiConsoleHandler { formatter }
    }
}

impl ZiLogHandler for ZiConsoleHandler {
    fn handle(&self, record: &ZiLogRecord) {
        let line = self.formatter.format(record);
        if record.level <= log::Level::Warn {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Appends to a file, rotating it once it grows past `max_bytes`.
pub struct ZiFileHandler {
    path: PathBuf,
    formatter: Box<dyn ZiLogFormatter + Send + Sync>,
    max_bytes: Option<u64>,
    backup_count: u32,
    guard: Mutex<()>,
}

impl ZiFileHandler {
    pub fn new(
        path: impl Into<PathBuf>,
        formatter: Box<dyn ZiLogFormatter + Send + Sync>,
        max_bytes: Option<u64>,
        backup_count: Option<u32>,
    ) -> Self {
        ZiFileHandler {
            path: path.into(),
            formatter,
            max_bytes,
            backup_count: backup_count.unwrap_or(7),
            guard: Mutex::new(()),
        }
    }

    fn backup_path(&self, idx: u32) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{idx}"));
        PathBuf::from(name)
    }

    fn rotate_if_needed(&self) {
        let Some(max_bytes) = self.max_bytes else {
            return;
        };
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > max_bytes => {}
            _ => return,
        }
        if self.backup_count == 0 {
            let _ = fs::remove_file(&self.path);
            return;
        }

        // path.N-1 -> path.N, ..., path -> path.1
        for idx in (1..=self.backup_count).rev() {
            let from = if idx == 1 {
                self.path.clone()
            } else {
                self.backup_path(idx - 1)
            };
            if from.exists() {
                let _ = fs::rename(&from, self.backup_path(idx));
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ZiLogHandler for ZiFileHandler {
    fn handle(&self, record: &ZiLogRecord) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        self.rotate_if_needed();

        let line = self.formatter.format(record);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(file, "{line}");
        }
    }
}
