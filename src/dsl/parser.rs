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

use serde::{Deserialize, Serialize};

use crate::dsl::ir::ZiStatement;
use crate::dsl::lexer::scan_line;
use crate::errors::{Result, ZiError, ZiSyntaxError};

/// Statements and lexical errors gathered from one recipe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiParseResult {
    pub statements: Vec<ZiStatement>,
    pub errors: Vec<ZiSyntaxError>,
}

impl ZiParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Turns recipe text into statements, one per non-comment line.
///
/// Lexical problems are collected and scanning resumes on the next line, so a
/// single parse reports every malformed statement. A literal that matches a
/// byte size or duration shape but cannot be constructed stops the scan and
/// the parse fails with [`ZiError::Compile`] carrying everything gathered so
/// far.
#[derive(Clone, Debug, Default)]
pub struct ZiRecipeParser;

impl ZiRecipeParser {
    pub fn new() -> Self {
        ZiRecipeParser
    }

    pub fn parse(&self, source: &str) -> Result<ZiParseResult> {
        let mut result = ZiParseResult::default();

        for (idx, line) in source.lines().enumerate() {
            let scan = scan_line(idx + 1, line)?;
            for error in &scan.errors {
                log::warn!("recipe syntax error: {error}");
            }
            result.errors.extend(scan.errors);
            if scan.fatal {
                return Err(ZiError::compile(result.errors));
            }
            if let Some(statement) = scan.statement {
                result.statements.push(statement);
            }
        }

        log::debug!(
            "parsed {} statement(s) with {} error(s)",
            result.statements.len(),
            result.errors.len()
        );
        Ok(result)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ZiParseResult> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_errors_across_lines() {
        let result = ZiRecipeParser::new()
            .parse("flatten :a\n'bad' x\n# skipped\n\nflatten :\nflatten b")
            .unwrap();

        assert_eq!(result.statements.len(), 2);
        assert_eq!(result.statements[1].line, 6);
        let lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 5]);
    }

    #[test]
    fn literal_failure_aborts_with_all_errors() {
        let err = ZiRecipeParser::new()
            .parse("flatten :\ndemo 99999999999999999999d\nflatten :also bad")
            .unwrap_err();

        let errors = err.syntax_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].line, 2);
    }
}
