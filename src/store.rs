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


//! # Zi Wrangle Transient Store Module
//!
//! Per-execution state shared by the directives of one pipeline run. Entries
//! are keyed by a structured [`ZiStoreKey`]: the scope of the owning statement
//! plus a slot name chosen by the directive. Two directives, or two
//! occurrences of the same directive in one recipe, therefore never see each
//! other's entries.
//!
//! A store lives exactly as long as one [`crate::pipeline::ZiRecipePipeline`]
//! and is never shared across executions.

use std::collections::HashMap;

use crate::errors::{Result, ZiError};
use crate::record::ZiValue;

/// Owner of a group of store entries: one statement of the recipe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZiStoreScope {
    pub directive: String,
    pub statement: usize,
}

impl ZiStoreScope {
    pub fn new(directive: impl Into<String>, statement: usize) -> Self {
        ZiStoreScope {
            directive: directive.into(),
            statement,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZiStoreKey {
    pub scope: ZiStoreScope,
    pub slot: &'static str,
}

#[derive(Debug, Default)]
pub struct ZiTransientStore {
    entries: HashMap<ZiStoreKey, ZiValue>,
}

impl ZiTransientStore {
    pub fn new() -> Self {
        ZiTransientStore::default()
    }

    pub fn get(&self, key: &ZiStoreKey) -> Option<&ZiValue> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: ZiStoreKey, value: ZiValue) -> Option<ZiValue> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &ZiStoreKey) -> Option<ZiValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// View restricted to the entries of `scope`.
    pub fn scoped(&mut self, scope: ZiStoreScope) -> ZiScopedStore<'_> {
        ZiScopedStore { store: self, scope }
    }
}

/// The slice of a [`ZiTransientStore`] a single directive may touch.
#[derive(Debug)]
pub struct ZiScopedStore<'a> {
    store: &'a mut ZiTransientStore,
    scope: ZiStoreScope,
}

impl ZiScopedStore<'_> {
    fn key(&self, slot: &'static str) -> ZiStoreKey {
        ZiStoreKey {
            scope: self.scope.clone(),
            slot,
        }
    }

    pub fn scope(&self) -> &ZiStoreScope {
        &self.scope
    }

    pub fn get(&self, slot: &'static str) -> Option<&ZiValue> {
        self.store.get(&self.key(slot))
    }

    pub fn set(&mut self, slot: &'static str, value: impl Into<ZiValue>) {
        let key = self.key(slot);
        self.store.set(key, value.into());
    }

    pub fn remove(&mut self, slot: &'static str) -> Option<ZiValue> {
        let key = self.key(slot);
        self.store.remove(&key)
    }

    /// Integer in `slot`, zero when unset.
    pub fn int(&self, slot: &'static str) -> Result<i64> {
        match self.get(slot) {
            None => Ok(0),
            Some(ZiValue::Int(value)) => Ok(*value),
            Some(other) => Err(ZiError::internal(format!(
                "store slot '{slot}' of '{}' holds a {}, expected int",
                self.scope.directive,
                other.type_name()
            ))),
        }
    }

    /// Adds `delta` to the integer in `slot` with overflow checking and
    /// returns the new total.
    pub fn increment(&mut self, slot: &'static str, delta: i64) -> Result<i64> {
        let total = self.int(slot)?.checked_add(delta).ok_or_else(|| {
            ZiError::directive_execution(
                self.scope.directive.clone(),
                format!("accumulated value '{slot}' overflows a 64-bit integer"),
            )
        })?;
        self.set(slot, total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_do_not_collide() {
        let mut store = ZiTransientStore::new();
        store.scoped(ZiStoreScope::new("aggregate-stats", 0)).increment("rows", 2).unwrap();
        store.scoped(ZiStoreScope::new("aggregate-stats", 3)).increment("rows", 5).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.scoped(ZiStoreScope::new("aggregate-stats", 0)).int("rows").unwrap(), 2);
        assert_eq!(store.scoped(ZiStoreScope::new("other", 0)).int("rows").unwrap(), 0);
    }

    #[test]
    fn increment_detects_overflow_and_type_mismatch() {
        let mut store = ZiTransientStore::new();
        let mut scoped = store.scoped(ZiStoreScope::new("d", 1));
        scoped.set("total", i64::MAX - 1);
        assert_eq!(scoped.increment("total", 1).unwrap(), i64::MAX);
        assert!(scoped.increment("total", 1).is_err());

        scoped.set("label", "x");
        assert!(scoped.int("label").is_err());
    }
}
