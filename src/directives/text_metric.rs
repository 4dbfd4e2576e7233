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


//! Similarity of two text columns, written to a destination column as a score
//! in `[0, 1]`.

use std::collections::{BTreeMap, BTreeSet};

use crate::directive::{ZiDirective, ZiExecutorContext};
use crate::dsl::usage::ZiUsageDefinition;
use crate::errors::Result;
use crate::lineage::ZiMutation;
use crate::record::{ZiRow, ZiRowBatch, ZiValue};
use crate::token::{ZiArguments, ZiTokenType};

pub const NAME: &str = "text-metric";

/// String metrics selectable by name.
///
/// Token based metrics split on whitespace; edit-distance metrics work on
/// characters and are normalized by the longer input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZiTextMetric {
    #[default]
    Cosine,
    Euclidean,
    Block,
    Identity,
    Dice,
    Jaccard,
    GeneralizedJaccard,
    OverlapCoefficient,
    LongestCommonSubsequence,
    LongestCommonSubstring,
    Levenshtein,
    DamerauLevenshtein,
    Jaro,
    SimonWhite,
}

impl ZiTextMetric {
    pub fn from_name(name: &str) -> Option<Self> {
        let metric = match name.trim().to_ascii_lowercase().as_str() {
            "cosine" => ZiTextMetric::Cosine,
            "euclidean" => ZiTextMetric::Euclidean,
            "block" | "block-metric" => ZiTextMetric::Block,
            "identity" => ZiTextMetric::Identity,
            "dice" => ZiTextMetric::Dice,
            "jaccard" => ZiTextMetric::Jaccard,
            "generalized-jaccard" => ZiTextMetric::GeneralizedJaccard,
            "overlap-cofficient" => ZiTextMetric::OverlapCoefficient,
            "longest-common-subsequence" => ZiTextMetric::LongestCommonSubsequence,
            "longest-common-substring" => ZiTextMetric::LongestCommonSubstring,
            "levenshtein" => ZiTextMetric::Levenshtein,
            "damerau-levenshtein" => ZiTextMetric::DamerauLevenshtein,
            "jaro" => ZiTextMetric::Jaro,
            "simon-white" => ZiTextMetric::SimonWhite,
            _ => return None,
        };
        Some(metric)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZiTextMetric::Cosine => "cosine",
            ZiTextMetric::Euclidean => "euclidean",
            ZiTextMetric::Block => "block",
            ZiTextMetric::Identity => "identity",
            ZiTextMetric::Dice => "dice",
            ZiTextMetric::Jaccard => "jaccard",
            ZiTextMetric::GeneralizedJaccard => "generalized-jaccard",
            ZiTextMetric::OverlapCoefficient => "overlap-cofficient",
            ZiTextMetric::LongestCommonSubsequence => "longest-common-subsequence",
            ZiTextMetric::LongestCommonSubstring => "longest-common-substring",
            ZiTextMetric::Levenshtein => "levenshtein",
            ZiTextMetric::DamerauLevenshtein => "damerau-levenshtein",
            ZiTextMetric::Jaro => "jaro",
            ZiTextMetric::SimonWhite => "simon-white",
        }
    }

    /// Similarity of `a` and `b`; identical inputs score 1.
    pub fn compare(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        match self {
            ZiTextMetric::Identity => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            ZiTextMetric::Cosine => cosine(&bag(words(a)), &bag(words(b))),
            ZiTextMetric::Euclidean => euclidean(&bag(words(a)), &bag(words(b))),
            ZiTextMetric::Block => block(&bag(words(a)), &bag(words(b))),
            ZiTextMetric::GeneralizedJaccard => generalized_jaccard(&bag(words(a)), &bag(words(b))),
            ZiTextMetric::Dice => {
                let (x, y) = (set(a), set(b));
                2.0 * x.intersection(&y).count() as f64 / (x.len() + y.len()) as f64
            }
            ZiTextMetric::Jaccard => {
                let (x, y) = (set(a), set(b));
                x.intersection(&y).count() as f64 / x.union(&y).count() as f64
            }
            ZiTextMetric::OverlapCoefficient => {
                let (x, y) = (set(a), set(b));
                x.intersection(&y).count() as f64 / x.len().min(y.len()) as f64
            }
            ZiTextMetric::SimonWhite => simon_white(a, b),
            ZiTextMetric::LongestCommonSubsequence => {
                let (x, y) = (chars(a), chars(b));
                lcs_length(&x, &y) as f64 / x.len().max(y.len()) as f64
            }
            ZiTextMetric::LongestCommonSubstring => {
                let (x, y) = (chars(a), chars(b));
                longest_substring(&x, &y) as f64 / x.len().max(y.len()) as f64
            }
            ZiTextMetric::Levenshtein => {
                let (x, y) = (chars(a), chars(b));
                1.0 - levenshtein(&x, &y) as f64 / x.len().max(y.len()) as f64
            }
            ZiTextMetric::DamerauLevenshtein => {
                let (x, y) = (chars(a), chars(b));
                1.0 - damerau_levenshtein(&x, &y) as f64 / x.len().max(y.len()) as f64
            }
            ZiTextMetric::Jaro => jaro(&chars(a), &chars(b)),
        }
    }
}

type ZiBag<'a> = BTreeMap<&'a str, usize>;

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

fn bag<'a>(tokens: impl Iterator<Item = &'a str>) -> ZiBag<'a> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

fn set(text: &str) -> BTreeSet<&str> {
    words(text).collect()
}

fn count_pairs<'a>(x: &ZiBag<'a>, y: &ZiBag<'a>) -> Vec<(usize, usize)> {
    let keys: BTreeSet<&str> = x.keys().chain(y.keys()).copied().collect();
    keys.into_iter()
        .map(|key| (x.get(key).copied().unwrap_or(0), y.get(key).copied().unwrap_or(0)))
        .collect()
}

fn norm(bag: &ZiBag<'_>) -> f64 {
    bag.values().map(|&n| (n * n) as f64).sum::<f64>().sqrt()
}

fn cosine(x: &ZiBag<'_>, y: &ZiBag<'_>) -> f64 {
    let dot: usize = count_pairs(x, y).iter().map(|(a, b)| a * b).sum();
    let denominator = norm(x) * norm(y);
    if denominator == 0.0 {
        return 0.0;
    }
    dot as f64 / denominator
}

fn euclidean(x: &ZiBag<'_>, y: &ZiBag<'_>) -> f64 {
    let distance = count_pairs(x, y)
        .iter()
        .map(|&(a, b)| (a as f64 - b as f64).powi(2))
        .sum::<f64>()
        .sqrt();
    let max = (norm(x).powi(2) + norm(y).powi(2)).sqrt();
    if max == 0.0 {
        return 0.0;
    }
    1.0 - distance / max
}

fn block(x: &ZiBag<'_>, y: &ZiBag<'_>) -> f64 {
    let pairs = count_pairs(x, y);
    let distance: usize = pairs.iter().map(|&(a, b)| a.abs_diff(b)).sum();
    let total: usize = pairs.iter().map(|&(a, b)| a + b).sum();
    if total == 0 {
        return 0.0;
    }
    1.0 - distance as f64 / total as f64
}

fn generalized_jaccard(x: &ZiBag<'_>, y: &ZiBag<'_>) -> f64 {
    let pairs = count_pairs(x, y);
    let min: usize = pairs.iter().map(|&(a, b)| a.min(b)).sum();
    let max: usize = pairs.iter().map(|&(a, b)| a.max(b)).sum();
    if max == 0 {
        return 0.0;
    }
    min as f64 / max as f64
}

fn simon_white(a: &str, b: &str) -> f64 {
    let bigrams = |text: &str| -> BTreeMap<(char, char), usize> {
        let mut counts = BTreeMap::new();
        for word in words(text) {
            let letters = chars(&word.to_lowercase());
            for pair in letters.windows(2) {
                *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
            }
        }
        counts
    };
    let (x, y) = (bigrams(a), bigrams(b));
    let total: usize = x.values().sum::<usize>() + y.values().sum::<usize>();
    if total == 0 {
        return if a == b { 1.0 } else { 0.0 };
    }
    let shared: usize = x
        .iter()
        .map(|(pair, &n)| n.min(y.get(pair).copied().unwrap_or(0)))
        .sum();
    2.0 * shared as f64 / total as f64
}

fn lcs_length(x: &[char], y: &[char]) -> usize {
    let mut previous = vec![0; y.len() + 1];
    for &a in x {
        let mut current = vec![0; y.len() + 1];
        for (j, &b) in y.iter().enumerate() {
            current[j + 1] = if a == b {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        previous = current;
    }
    previous[y.len()]
}

fn longest_substring(x: &[char], y: &[char]) -> usize {
    let mut best = 0;
    let mut previous = vec![0; y.len() + 1];
    for &a in x {
        let mut current = vec![0; y.len() + 1];
        for (j, &b) in y.iter().enumerate() {
            if a == b {
                current[j + 1] = previous[j] + 1;
                best = best.max(current[j + 1]);
            }
        }
        previous = current;
    }
    best
}

fn levenshtein(x: &[char], y: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=y.len()).collect();
    for (i, &a) in x.iter().enumerate() {
        let mut current = vec![i + 1; y.len() + 1];
        for (j, &b) in y.iter().enumerate() {
            let cost = usize::from(a != b);
            current[j + 1] = (previous[j] + cost).min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[y.len()]
}

/// Optimal string alignment distance (adjacent transpositions count once).
fn damerau_levenshtein(x: &[char], y: &[char]) -> usize {
    let (n, m) = (x.len(), y.len());
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(x[i - 1] != y[j - 1]);
            let mut best = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && x[i - 1] == y[j - 2] && x[i - 2] == y[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }
    d[n][m]
}

fn jaro(x: &[char], y: &[char]) -> f64 {
    let window = (x.len().max(y.len()) / 2).saturating_sub(1);
    let mut x_matched = vec![false; x.len()];
    let mut y_matched = vec![false; y.len()];
    let mut matches = 0usize;

    for (i, &a) in x.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(y.len());
        for j in start..end {
            if !y_matched[j] && y[j] == a {
                x_matched[i] = true;
                y_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let x_seq = x.iter().zip(&x_matched).filter(|(_, matched)| **matched).map(|(c, _)| c);
    let y_seq = y.iter().zip(&y_matched).filter(|(_, matched)| **matched).map(|(c, _)| c);
    let transpositions = x_seq.zip(y_seq).filter(|(a, b)| a != b).count() / 2;

    let m = matches as f64;
    (m / x.len() as f64 + m / y.len() as f64 + (m - transpositions as f64) / m) / 3.0
}

/// `text-metric <method> :column1 :column2 :destination`
#[derive(Debug, Default)]
pub struct ZiTextMetricMeasure {
    metric: ZiTextMetric,
    column1: String,
    column2: String,
    destination: String,
}

pub fn create() -> Box<dyn ZiDirective + Send> {
    Box::new(ZiTextMetricMeasure::default())
}

impl ZiTextMetricMeasure {
    fn score(&self, row: &ZiRow) -> f64 {
        let text = |column: &str| match row.get(column) {
            Some(ZiValue::String(value)) if !value.is_empty() => Some(value.as_str()),
            _ => None,
        };
        match (text(&self.column1), text(&self.column2)) {
            (Some(a), Some(b)) => self.metric.compare(a, b),
            _ => 0.0,
        }
    }
}

impl ZiDirective for ZiTextMetricMeasure {
    fn name(&self) -> &'static str {
        NAME
    }

    fn define(&self) -> Result<ZiUsageDefinition> {
        ZiUsageDefinition::builder(NAME)
            .define("method", ZiTokenType::Text)
            .define("column1", ZiTokenType::ColumnName)
            .define("column2", ZiTokenType::ColumnName)
            .define("destination", ZiTokenType::ColumnName)
            .build()
    }

    fn initialize(&mut self, args: &ZiArguments) -> Result<()> {
        let method = args.text("method")?;
        self.metric = ZiTextMetric::from_name(method).unwrap_or_else(|| {
            log::warn!("{NAME}: unknown method '{method}', using cosine");
            ZiTextMetric::Cosine
        });
        self.column1 = args.column("column1")?.to_string();
        self.column2 = args.column("column2")?.to_string();
        self.destination = args.column("destination")?.to_string();
        Ok(())
    }

    fn execute(&mut self, mut rows: ZiRowBatch, _ctx: &mut ZiExecutorContext<'_>) -> Result<ZiRowBatch> {
        for row in &mut rows {
            let score = self.score(row);
            row.add_or_set(&self.destination, score);
        }
        Ok(rows)
    }

    fn lineage(&self) -> Option<ZiMutation> {
        Some(
            ZiMutation::builder()
                .readable(format!(
                    "Compared text in columns '{}' and '{}' and saved it in column '{}'",
                    self.column1, self.column2, self.destination
                ))
                .relation_many([self.column1.clone(), self.column2.clone()], self.destination.clone())
                .relation(self.column1.clone(), self.column1.clone())
                .relation(self.column2.clone(), self.column2.clone())
                .build(),
        )
    }
}
