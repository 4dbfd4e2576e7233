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


//! # Zi Wrangle Lineage Module
//!
//! Column-level lineage of a compiled recipe. Each directive describes what it
//! reads and writes with a [`ZiMutation`]; the compiler concatenates those in
//! statement order into a [`ZiLineageGraph`]. Lineage is a static property of
//! the recipe and never looks at row data.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiRelationKind {
    /// Each source column feeds the target column of the same position.
    Standard,
    /// Every source column contributes to every target column.
    All,
    /// Several source columns produce one target column.
    Many,
    /// Source columns are removed.
    Drop,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiRelation {
    pub kind: ZiRelationKind,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

/// What one directive does to the columns of a row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiMutation {
    pub readable: String,
    pub relations: Vec<ZiRelation>,
}

impl ZiMutation {
    pub fn builder() -> ZiMutationBuilder {
        ZiMutationBuilder::default()
    }

    /// Columns read by any relation, in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        collect_unique(self.relations.iter().flat_map(|r| r.sources.iter()))
    }

    /// Columns written by any relation, in first-seen order.
    pub fn targets(&self) -> Vec<&str> {
        collect_unique(self.relations.iter().flat_map(|r| r.targets.iter()))
    }
}

fn collect_unique<'a>(columns: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for column in columns {
        if !seen.contains(&column.as_str()) {
            seen.push(column);
        }
    }
    seen
}

#[derive(Debug, Default)]
pub struct ZiMutationBuilder {
    readable: String,
    relations: Vec<ZiRelation>,
}

impl ZiMutationBuilder {
    pub fn readable(mut self, readable: impl Into<String>) -> Self {
        self.readable = readable.into();
        self
    }

    /// `source` feeds `target`.
    pub fn relation(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(ZiRelation {
            kind: ZiRelationKind::Standard,
            sources: vec![source.into()],
            targets: vec![target.into()],
        });
        self
    }

    /// Several `sources` produce `target`.
    pub fn relation_many<S: Into<String>>(
        mut self,
        sources: impl IntoIterator<Item = S>,
        target: impl Into<String>,
    ) -> Self {
        self.relations.push(ZiRelation {
            kind: ZiRelationKind::Many,
            sources: sources.into_iter().map(Into::into).collect(),
            targets: vec![target.into()],
        });
        self
    }

    pub fn all<S: Into<String>, T: Into<String>>(
        mut self,
        sources: impl IntoIterator<Item = S>,
        targets: impl IntoIterator<Item = T>,
    ) -> Self {
        self.relations.push(ZiRelation {
            kind: ZiRelationKind::All,
            sources: sources.into_iter().map(Into::into).collect(),
            targets: targets.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn drop_columns<S: Into<String>>(mut self, sources: impl IntoIterator<Item = S>) -> Self {
        self.relations.push(ZiRelation {
            kind: ZiRelationKind::Drop,
            sources: sources.into_iter().map(Into::into).collect(),
            targets: Vec::new(),
        });
        self
    }

    pub fn build(self) -> ZiMutation {
        ZiMutation {
            readable: self.readable,
            relations: self.relations,
        }
    }
}

/// Lineage of one statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiLineageEntry {
    /// Position of the statement in the recipe, starting at 0.
    pub statement: usize,
    pub directive: String,
    pub mutation: ZiMutation,
}

/// Statement-ordered lineage of a whole recipe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiLineageGraph {
    entries: Vec<ZiLineageEntry>,
}

impl ZiLineageGraph {
    pub fn new() -> Self {
        ZiLineageGraph::default()
    }

    pub fn push(&mut self, statement: usize, directive: impl Into<String>, mutation: ZiMutation) {
        self.entries.push(ZiLineageEntry {
            statement,
            directive: directive.into(),
            mutation,
        });
    }

    pub fn entries(&self) -> &[ZiLineageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn readable(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.mutation.readable.as_str())
            .collect()
    }

    /// Entries whose relations write `column`, in statement order.
    pub fn writers_of(&self, column: &str) -> Vec<&ZiLineageEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .mutation
                    .relations
                    .iter()
                    .any(|relation| relation.targets.iter().any(|target| target == column))
            })
            .collect()
    }

    /// Columns that, through any chain of relations, feed `column`.
    pub fn upstream_of(&self, column: &str) -> Vec<String> {
        let mut wanted = vec![column.to_string()];
        let mut found: Vec<String> = Vec::new();
        for entry in self.entries.iter().rev() {
            let mut next = Vec::new();
            for relation in &entry.mutation.relations {
                if relation.targets.iter().any(|target| wanted.contains(target)) {
                    for source in &relation.sources {
                        if !found.contains(source) {
                            found.push(source.clone());
                        }
                        next.push(source.clone());
                    }
                }
            }
            for source in next {
                if !wanted.contains(&source) {
                    wanted.push(source);
                }
            }
        }
        found
    }
}
