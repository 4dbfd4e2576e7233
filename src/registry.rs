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


//! # Zi Wrangle Directive Registry Module
//!
//! Maps directive names to factories. The built-in directives come from a
//! static table; hosting code may register more entries before compiling.
//! Name resolution applies the engine configuration's aliases and exclusions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ZiEngineConfig;
use crate::directive::ZiDirective;
use crate::dsl::usage::ZiArgSpec;
use crate::errors::{Result, ZiError};

/// Creates a fresh, uninitialized directive instance.
pub type ZiDirectiveFactory = fn() -> Box<dyn ZiDirective + Send>;

/// One registrable directive.
#[derive(Clone, Debug)]
pub struct ZiDirectiveEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub categories: &'static [&'static str],
    pub factory: ZiDirectiveFactory,
}

/// Listing of a directive for help output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiDirectiveUsage {
    pub directive: String,
    pub usage: String,
    pub description: String,
    pub categories: Vec<String>,
    pub arguments: Vec<ZiArgSpec>,
}

#[derive(Debug, Default)]
pub struct ZiDirectiveRegistry {
    entries: BTreeMap<&'static str, ZiDirectiveEntry>,
}

impl ZiDirectiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ZiDirectiveRegistry::default()
    }

    /// A registry holding every built-in directive.
    pub fn with_defaults() -> Self {
        let mut entries = BTreeMap::new();
        for entry in crate::directives::BUILTIN_DIRECTIVES {
            entries.insert(entry.name, entry.clone());
        }
        ZiDirectiveRegistry { entries }
    }

    pub fn register(&mut self, entry: ZiDirectiveEntry) -> Result<()> {
        if self.entries.contains_key(entry.name) {
            return Err(ZiError::validation(format!(
                "directive '{}' is already registered",
                entry.name
            )));
        }
        log::debug!("registered directive '{}'", entry.name);
        self.entries.insert(entry.name, entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `name` after applying aliases; excluded names are refused
    /// whether they are referenced directly or through an alias.
    pub fn resolve(&self, name: &str, config: &ZiEngineConfig) -> Result<&ZiDirectiveEntry> {
        let resolved = config.resolve_alias(name);
        if config.is_excluded(name) || config.is_excluded(resolved) {
            return Err(ZiError::DirectiveExcluded {
                directive: name.to_string(),
            });
        }
        self.entries
            .get(resolved)
            .ok_or_else(|| ZiError::DirectiveNotFound {
                directive: name.to_string(),
            })
    }

    /// A fresh instance of `name`.
    pub fn create(&self, name: &str, config: &ZiEngineConfig) -> Result<Box<dyn ZiDirective + Send>> {
        Ok((self.resolve(name, config)?.factory)())
    }

    pub fn usage(&self, name: &str) -> Result<ZiDirectiveUsage> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ZiError::DirectiveNotFound {
                directive: name.to_string(),
            })?;
        describe(entry)
    }

    /// Usage of every registered directive, sorted by name.
    pub fn usages(&self) -> Result<Vec<ZiDirectiveUsage>> {
        self.entries.values().map(describe).collect()
    }
}

fn describe(entry: &ZiDirectiveEntry) -> Result<ZiDirectiveUsage> {
    let definition = (entry.factory)().define()?;
    Ok(ZiDirectiveUsage {
        directive: entry.name.to_string(),
        usage: definition.render(),
        description: entry.description.to_string(),
        categories: entry.categories.iter().map(|c| c.to_string()).collect(),
        arguments: definition.arguments().to_vec(),
    })
}
