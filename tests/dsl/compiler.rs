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


use zi_wrangle::config::ZiEngineConfig;
use zi_wrangle::dsl::{ZiFragmentKind, ZiRecipeCompiler, ZiRecipeParser};
use zi_wrangle::errors::ZiError;
use zi_wrangle::lineage::ZiRelationKind;
use zi_wrangle::registry::ZiDirectiveRegistry;

fn compile(source: &str) -> zi_wrangle::Result<zi_wrangle::ZiRecipe> {
    let registry = ZiDirectiveRegistry::with_defaults();
    let config = ZiEngineConfig::default();
    ZiRecipeCompiler::new(&registry, &config).compile(source)
}

#[test]
fn test_statements_compile_in_source_order() {
    let source = "\
flatten :items
aggregate-stats :size :time :total_mb :total_s size_unit:MB time_unit:s time_mode:total
text-metric levenshtein :a :b :score
parse-as-log :line combined";
    let recipe = compile(source).unwrap();

    assert_eq!(
        recipe.directive_names(),
        vec!["flatten", "aggregate-stats", "text-metric", "parse-as-log"]
    );
    let lineage: Vec<&str> = recipe
        .lineage()
        .entries()
        .iter()
        .map(|entry| entry.directive.as_str())
        .collect();
    assert_eq!(lineage, recipe.directive_names());
    assert!(recipe.lineage().readable()[0].contains("'items'"));
}

#[test]
fn test_malformed_recipe_yields_no_directives() {
    let err = compile("flatten :a\naggregate-stats :size\ntext-metric cosine :a :b :c\nwhat :x").unwrap_err();

    let errors = err.syntax_errors();
    assert!(matches!(err, ZiError::Compile { .. }));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].line, 2);
    assert_eq!(errors[1].line, 4);
    assert_eq!(errors[1].start_column, 0);
    assert_eq!(errors[1].text, "what");
}

#[test]
fn test_enumerated_option_lists_supported_values() {
    let err = compile("aggregate-stats :s :t :a :b size_unit:XB").unwrap_err();
    let message = &err.syntax_errors()[0].message;
    assert!(message.contains("supported values are {BYTES, KB, MB, GB, TB, PB}"), "{message}");
}

#[test]
fn test_options_are_case_insensitive() {
    assert!(compile("aggregate-stats :s :t :a :b size_unit:mb time_unit:Seconds time_mode:Average").is_ok());
}

#[test]
fn test_unknown_option_key_is_rejected() {
    let err = compile("aggregate-stats :s :t :a :b colour:red").unwrap_err();
    assert_eq!(err.syntax_errors().len(), 1);
}

#[test]
fn test_unparsable_literal_aborts_parse() {
    let err = ZiRecipeParser::new().parse("flatten :a\nflatten 99999999999999999999P").unwrap_err();
    assert!(matches!(err, ZiError::Compile { .. }));
    assert_eq!(err.syntax_errors()[0].line, 2);
}

#[test]
fn test_fragments_carry_spans() {
    let parsed = ZiRecipeParser::new().parse("parse-as-log :line '%h %b'").unwrap();
    assert!(parsed.is_ok());
    let statement = &parsed.statements[0];

    assert_eq!(statement.directive, "parse-as-log");
    assert!(matches!(statement.fragments[0].kind, ZiFragmentKind::Column(_)));
    assert_eq!(statement.fragments[0].span.start, 13);
    assert!(matches!(statement.fragments[1].kind, ZiFragmentKind::Quoted(_)));
    assert_eq!(statement.fragments[1].content(), "%h %b");
}

#[test]
fn test_column_lists_feed_flatten() {
    for source in ["flatten :a,:b", "flatten :a :b"] {
        let recipe = compile(source).unwrap();
        let mutation = &recipe.lineage().entries()[0].mutation;
        assert_eq!(mutation.relations[0].kind, ZiRelationKind::All);
        assert_eq!(mutation.sources(), vec!["a", "b"]);
    }
}

#[test]
fn test_aliases_and_exclusions_from_config() {
    let registry = ZiDirectiveRegistry::with_defaults();
    let config = ZiEngineConfig::default()
        .with_alias("explode", "flatten")
        .with_excluded("text-metric");
    let compiler = ZiRecipeCompiler::new(&registry, &config);

    assert_eq!(compiler.compile("explode :a").unwrap().directive_names(), vec!["flatten"]);
    let err = compiler.compile("text-metric cosine :a :b :c").unwrap_err();
    assert!(err.syntax_errors()[0].message.contains("excluded"));
}

#[test]
fn test_bad_log_format_is_a_compile_error() {
    let err = compile("parse-as-log :line '%h %Z'").unwrap_err();
    assert!(err.syntax_errors()[0].message.contains("%Z"));
}

#[test]
fn test_compile_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipe.txt");
    std::fs::write(&path, "flatten :a\nflatten :b\n").unwrap();

    let registry = ZiDirectiveRegistry::with_defaults();
    let config = ZiEngineConfig::default();
    let recipe = ZiRecipeCompiler::new(&registry, &config).compile_file(&path).unwrap();
    assert_eq!(recipe.len(), 2);
}
