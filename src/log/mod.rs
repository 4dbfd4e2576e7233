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


//! # Zi Wrangle Logging Module
//!
//! Engine code logs through the `log` facade macros and never installs a
//! logger on its own. Hosting applications that want output can install
//! [`ZiLogger`], a small backend with JSON or text formatting and console or
//! file handlers:
//!
//! ```rust
//! use zi_wrangle::log::{ZiLogConfig, ZiLogger};
//!
//! let config = ZiLogConfig {
//!     default_level: "DEBUG".to_string(),
//!     ..ZiLogConfig::default()
//! };
//! ZiLogger::init(config).ok();
//! ```
//!
//! The first successful `init` wins; later calls leave the installed logger
//! untouched.

pub mod config;
pub mod core;
pub mod formatters;
pub mod handlers;

pub use self::config::ZiLogConfig;
pub use self::core::{ZiLogRecord, ZiLogger};
pub use self::formatters::{ZiJsonFormatter, ZiLogFormatter, ZiTextFormatter};
pub use self::handlers::{ZiConsoleHandler, ZiFileHandler, ZiLogHandler};
