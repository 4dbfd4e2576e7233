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


use std::path::Path;

use crate::config::ZiEngineConfig;
use crate::dsl::ir::{ZiSpan, ZiStatement};
use crate::dsl::parser::ZiRecipeParser;
use crate::dsl::usage::bind_spanned;
use crate::errors::{Result, ZiError, ZiSyntaxError};
use crate::lineage::ZiLineageGraph;
use crate::pipeline::{ZiRecipe, ZiRecipeStep};
use crate::registry::ZiDirectiveRegistry;

/// Compiles recipe source into initialized directives.
///
/// Every problem found (lexical errors, unknown or excluded directives,
/// argument binding and configuration failures) is collected as a
/// [`ZiSyntaxError`]; if any exist the compile fails as a whole with
/// [`ZiError::Compile`] and no directive survives.
#[derive(Debug)]
pub struct ZiRecipeCompiler<'a> {
    registry: &'a ZiDirectiveRegistry,
    config: &'a ZiEngineConfig,
    parser: ZiRecipeParser,
}

impl<'a> ZiRecipeCompiler<'a> {
    pub fn new(registry: &'a ZiDirectiveRegistry, config: &'a ZiEngineConfig) -> Self {
        ZiRecipeCompiler {
            registry,
            config,
            parser: ZiRecipeParser::new(),
        }
    }

    pub fn compile(&self, source: &str) -> Result<ZiRecipe> {
        log::debug!("compiling recipe of {} line(s)", source.lines().count());
        let parsed = self.parser.parse(source)?;
        let mut errors = parsed.errors;
        let mut steps = Vec::with_capacity(parsed.statements.len());

        for (index, statement) in parsed.statements.iter().enumerate() {
            match self.compile_statement(index, statement) {
                Ok(step) => steps.push(step),
                Err(error) => {
                    log::warn!("recipe syntax error: {error}");
                    errors.push(error);
                }
            }
        }

        if !errors.is_empty() {
            // Dropping the partial recipe destroys the directives built so far.
            drop(ZiRecipe::new(steps, ZiLineageGraph::new()));
            errors.sort_by_key(|error| (error.line, error.start_column));
            log::warn!("recipe rejected with {} error(s)", errors.len());
            return Err(ZiError::compile(errors));
        }

        let mut lineage = ZiLineageGraph::new();
        for step in &steps {
            if let Some(mutation) = step.directive().lineage() {
                lineage.push(step.index(), step.name(), mutation);
            }
        }

        log::info!("compiled recipe with {} directive(s)", steps.len());
        Ok(ZiRecipe::new(steps, lineage))
    }

    pub fn compile_file(&self, path: &Path) -> Result<ZiRecipe> {
        let content = std::fs::read_to_string(path)?;
        self.compile(&content)
    }

    fn compile_statement(
        &self,
        index: usize,
        statement: &ZiStatement,
    ) -> std::result::Result<ZiRecipeStep, ZiSyntaxError> {
        let at = |span: ZiSpan, text: &str, error: ZiError| {
            ZiSyntaxError::new(span.line, span.start, span.end, text, error.detail())
        };

        let mut directive = self
            .registry
            .create(&statement.directive, self.config)
            .map_err(|error| at(statement.name_span, &statement.directive, error))?;

        let definition = match directive.define() {
            Ok(definition) => definition,
            Err(error) => {
                directive.destroy();
                return Err(at(statement.span(), &statement.text, error));
            }
        };
        let args = match bind_spanned(&definition, statement) {
            Ok(args) => args,
            Err(failure) => {
                directive.destroy();
                return Err(at(failure.span, &failure.text, failure.error));
            }
        };

        if let Err(error) = directive.initialize(&args) {
            directive.destroy();
            return Err(at(statement.span(), &statement.text, error));
        }
        log::debug!(
            "directive '{}' initialized for line {}",
            directive.name(),
            statement.line
        );
        Ok(ZiRecipeStep::new(index, statement, directive))
    }
}
