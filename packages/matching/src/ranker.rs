//! Ranked matching of a query against a pool of locality names.
//!
//! Matching runs as a cascade, each level adding candidates that the
//! earlier ones missed:
//!
//! 1. **Exact**: case-insensitive equality short-circuits everything else.
//! 2. **Compound variant**: a joined or split spelling of the query equals a
//!    candidate (confidence 0.95). Later levels never replace this match.
//! 3. **Fuzzy**: similarity of the abbreviation-expanded variant meets the
//!    fuzzy threshold (confidence = similarity).
//! 4. **Phonetic**: Double Metaphone codes match and similarity meets 70% of
//!    the phonetic threshold (confidence = similarity + 0.1, at most 0.95).
//!
//! One result is kept per name (the highest confidence, earliest produced on
//! ties), ordered by confidence then by the name's position in the pool.
//! Non-exact confidences are capped at 0.99 so 1.0 always means exact.

use std::collections::HashMap;

use postcodes_gazetteer_models::{MatchCandidate, MatchKind};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::abbreviations::expand_abbreviations;
use crate::phonetic::{PhoneticCodes, PhoneticEncoder};
use crate::similarity::similarity;
use crate::tables::MatchTables;
use crate::variants::compound_variants;

/// Confidence assigned to a compound-variant equality.
pub const COMPOUND_VARIANT_CONFIDENCE: f64 = 0.95;

/// Upper bound on phonetic-match confidence.
pub const PHONETIC_MAX_CONFIDENCE: f64 = 0.95;

/// Added to the similarity of a phonetic match.
const PHONETIC_BOOST: f64 = 0.1;

/// Fraction of the phonetic threshold the similarity must reach.
const PHONETIC_SIMILARITY_FACTOR: f64 = 0.7;

/// Upper bound on any non-exact confidence; 1.0 means exact.
const NON_EXACT_MAX_CONFIDENCE: f64 = 0.99;

/// Which matching levels run after the exact and compound-variant checks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MatchStrategy {
    /// Exact and compound-variant equality only.
    ExactOnly,
    /// Adds string similarity.
    FuzzyOnly,
    /// Adds phonetic codes.
    PhoneticOnly,
    /// Adds both string similarity and phonetic codes.
    #[default]
    Combined,
}

impl MatchStrategy {
    /// Builds a strategy from independent fuzzy and phonetic switches.
    #[must_use]
    pub const fn from_flags(fuzzy: bool, phonetic: bool) -> Self {
        match (fuzzy, phonetic) {
            (false, false) => Self::ExactOnly,
            (true, false) => Self::FuzzyOnly,
            (false, true) => Self::PhoneticOnly,
            (true, true) => Self::Combined,
        }
    }

    /// Whether the fuzzy level runs.
    #[must_use]
    pub const fn uses_fuzzy(self) -> bool {
        matches!(self, Self::FuzzyOnly | Self::Combined)
    }

    /// Whether the phonetic level runs.
    #[must_use]
    pub const fn uses_phonetic(self) -> bool {
        matches!(self, Self::PhoneticOnly | Self::Combined)
    }
}

/// Thresholds and limits for [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    pub strategy: MatchStrategy,
    /// Minimum similarity for a fuzzy match.
    pub fuzzy_threshold: f64,
    /// Phonetic matches need similarity of at least 70% of this.
    pub phonetic_threshold: f64,
    /// Maximum number of results returned.
    pub max_results: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Combined,
            fuzzy_threshold: 0.8,
            phonetic_threshold: 0.85,
            max_results: 5,
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub const fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_phonetic_threshold(mut self, threshold: f64) -> Self {
        self.phonetic_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Keeps the best candidate per name in production order.
struct Collector<'a> {
    results: Vec<MatchCandidate>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> Collector<'a> {
    fn new() -> Self {
        Self {
            results: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn offer(&mut self, name: &'a str, confidence: f64, match_kind: MatchKind) {
        if let Some(&index) = self.positions.get(name) {
            let existing = &mut self.results[index];
            if existing.match_kind == MatchKind::CompoundVariant {
                return;
            }
            if confidence > existing.confidence {
                existing.confidence = confidence;
                existing.match_kind = match_kind;
            }
            return;
        }

        self.positions.insert(name, self.results.len());
        self.results.push(MatchCandidate {
            matched_name: name.to_string(),
            confidence,
            match_kind,
        });
    }
}

/// Ranks `candidates` against `query`.
///
/// Never fails: an empty pool, or nothing meeting the thresholds, gives an
/// empty list. The same inputs always produce the same ordered output.
#[must_use]
pub fn rank<S: AsRef<str>>(
    query: &str,
    candidates: &[S],
    options: &MatchOptions,
    tables: &MatchTables,
) -> Vec<MatchCandidate> {
    let normalized_query = normalize(query);
    let normalized: Vec<String> = candidates.iter().map(|c| normalize(c.as_ref())).collect();

    if let Some(index) = normalized.iter().position(|c| *c == normalized_query) {
        let mut exact = vec![MatchCandidate {
            matched_name: candidates[index].as_ref().to_string(),
            confidence: 1.0,
            match_kind: MatchKind::Exact,
        }];
        exact.truncate(options.max_results);
        return exact;
    }

    let variants = compound_variants(query, tables);
    log::debug!(
        "rank: query={query:?} variants={} candidates={} strategy={}",
        variants.len(),
        candidates.len(),
        options.strategy
    );

    let mut collector = Collector::new();

    for variant in variants.iter().skip(1) {
        let normalized_variant = normalize(variant);
        for (candidate, norm) in candidates.iter().zip(&normalized) {
            if *norm == normalized_variant {
                collector.offer(
                    candidate.as_ref(),
                    COMPOUND_VARIANT_CONFIDENCE,
                    MatchKind::CompoundVariant,
                );
            }
        }
    }

    if options.strategy.uses_fuzzy() {
        for variant in &variants {
            let expanded = expand_abbreviations(variant, tables);
            for candidate in candidates {
                let name = candidate.as_ref();
                let score = similarity(&expanded, name);
                if score >= options.fuzzy_threshold {
                    collector.offer(
                        name,
                        score.min(NON_EXACT_MAX_CONFIDENCE),
                        MatchKind::Fuzzy,
                    );
                }
            }
        }
    }

    if options.strategy.uses_phonetic() {
        let encoder = PhoneticEncoder::new(tables);
        let codes: Vec<PhoneticCodes> = candidates
            .iter()
            .map(|c| encoder.encode(c.as_ref()))
            .collect();
        let min_similarity = options.phonetic_threshold * PHONETIC_SIMILARITY_FACTOR;

        for variant in &variants {
            let query_codes = encoder.encode(variant);
            if query_codes.primary.is_empty() {
                continue;
            }

            for (candidate, candidate_codes) in candidates.iter().zip(&codes) {
                if !query_codes.matches(candidate_codes) {
                    continue;
                }
                let name = candidate.as_ref();
                let score = similarity(variant, name);
                if score >= min_similarity {
                    collector.offer(
                        name,
                        (score + PHONETIC_BOOST).min(PHONETIC_MAX_CONFIDENCE),
                        MatchKind::Phonetic,
                    );
                }
            }
        }
    }

    let mut first_index: HashMap<&str, usize> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        first_index.entry(candidate.as_ref()).or_insert(index);
    }

    let mut results = collector.results;
    results.sort_by(|a, b| {
        b.confidence.total_cmp(&a.confidence).then_with(|| {
            let ia = first_index.get(a.matched_name.as_str()).copied();
            let ib = first_index.get(b.matched_name.as_str()).copied();
            ia.cmp(&ib)
        })
    });
    results.truncate(options.max_results);

    log::debug!("rank: {} result(s) for {query:?}", results.len());

    results
}
