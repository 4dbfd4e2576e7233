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


//! # Directives Module
//!
//! Built-in directives shipped with Zi Wrangle.
//!
//! ## Directive Categories
//!
//! - **flatten**: fans array columns out into one row per element
//! - **aggregate_stats**: totals byte sizes and durations, emitted at finish
//! - **text_metric**: similarity score between two text columns
//! - **parse_log**: splits webserver access log lines into columns
//!
//! ## Usage
//!
//! Directives are resolved by name through
//! [`ZiDirectiveRegistry`](crate::registry::ZiDirectiveRegistry), which
//! builds its defaults from [`BUILTIN_DIRECTIVES`].

pub mod aggregate_stats;
pub mod flatten;
pub mod parse_log;
pub mod text_metric;

use crate::registry::ZiDirectiveEntry;

pub static BUILTIN_DIRECTIVES: &[ZiDirectiveEntry] = &[
    ZiDirectiveEntry {
        name: flatten::NAME,
        description: "Separates array elements of one or more columns into individual records, copying the other columns.",
        categories: &["row"],
        factory: flatten::create,
    },
    ZiDirectiveEntry {
        name: aggregate_stats::NAME,
        description: "Aggregates byte size and time duration columns into a single summary record.",
        categories: &["aggregation"],
        factory: aggregate_stats::create,
    },
    ZiDirectiveEntry {
        name: text_metric::NAME,
        description: "Calculates the metric for comparing two string values.",
        categories: &["transform"],
        factory: text_metric::create,
    },
    ZiDirectiveEntry {
        name: parse_log::NAME,
        description: "Parses Apache HTTPD and NGINX logs.",
        categories: &["parser", "logs"],
        factory: parse_log::create,
    },
];
