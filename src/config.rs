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


//! # Zi Wrangle Configuration Module
//!
//! [`ZiEngineConfig`] controls how recipes are compiled and executed:
//!
//! - `aliases`: alternative directive names resolved before registry lookup
//! - `excluded`: directives a recipe may not use
//! - `batch_size`: when set, runners feed input through the pipeline in chunks
//! - `log`: settings for the optional [`crate::log::ZiLogger`] backend
//!
//! Every field has a default, so partial JSON or YAML documents are accepted:
//!
//! ```yaml
//! aliases:
//!   stats: aggregate-stats
//! excluded: [parse-as-log]
//! batch_size: 500
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};
use crate::log::ZiLogConfig;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiEngineConfig {
    pub aliases: BTreeMap<String, String>,
    pub excluded: BTreeSet<String>,
    pub batch_size: Option<usize>,
    pub log: ZiLogConfig,
}

impl ZiEngineConfig {
    pub fn new() -> Self {
        ZiEngineConfig::default()
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: ZiEngineConfig = serde_json::from_str(source)
            .map_err(|e| ZiError::validation(format!("invalid engine config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: ZiEngineConfig = serde_yaml::from_str(source)
            .map_err(|e| ZiError::validation(format!("invalid engine config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, choosing the format by extension. Files with any
    /// other extension are tried as JSON first, then as YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content).or_else(|_| Self::from_yaml_str(&content)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == Some(0) {
            return Err(ZiError::validation("batch_size must be greater than zero"));
        }
        for (alias, target) in &self.aliases {
            if alias.trim().is_empty() || target.trim().is_empty() {
                return Err(ZiError::validation("directive aliases must not be empty"));
            }
            if self.aliases.contains_key(target) {
                return Err(ZiError::validation(format!(
                    "alias '{alias}' points to another alias '{target}'"
                )));
            }
        }
        self.log.validate()
    }

    pub fn with_alias(mut self, alias: impl Into<String>, directive: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), directive.into());
        self
    }

    pub fn with_excluded(mut self, directive: impl Into<String>) -> Self {
        self.excluded.insert(directive.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_log(mut self, log: ZiLogConfig) -> Self {
        self.log = log;
        self
    }

    /// Directive name after alias resolution.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_use_defaults() {
        let config = ZiEngineConfig::from_json_str(r#"{"aliases": {"stats": "aggregate-stats"}}"#)
            .unwrap();
        assert_eq!(config.resolve_alias("stats"), "aggregate-stats");
        assert_eq!(config.resolve_alias("flatten"), "flatten");
        assert_eq!(config.batch_size, None);
        assert_eq!(config.log.default_level, "INFO");

        let yaml = ZiEngineConfig::from_yaml_str("excluded: [flatten]\nbatch_size: 2\n").unwrap();
        assert!(yaml.is_excluded("flatten"));
        assert_eq!(yaml.batch_size, Some(2));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ZiEngineConfig::from_json_str(r#"{"batch_size": 0}"#).is_err());
        assert!(ZiEngineConfig::from_json_str(r#"{"aliases": {"a": "b", "b": "c"}}"#).is_err());
        assert!(ZiEngineConfig::from_json_str(r#"{"log": {"default_level": "LOUD"}}"#).is_err());
        assert!(matches!(
            ZiEngineConfig::from_yaml_str("batch_size: [1"),
            Err(ZiError::Validation { .. })
        ));
    }
}
