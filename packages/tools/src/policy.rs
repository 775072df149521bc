//! Threshold fallback for suggestion lookups.
//!
//! A lookup first ranks with the configured strategy and thresholds. If that
//! yields nothing it retries fuzzy-only at 70% of the fuzzy threshold, then
//! gives up.

use postcodes_gazetteer_models::MatchCandidate;
use postcodes_matching::{MatchOptions, MatchStrategy, rank};
use postcodes_tools_models::ServiceConfig;

/// Fraction of the fuzzy threshold used by [`SuggestionPolicy::Loose`].
pub const LOOSE_THRESHOLD_FACTOR: f64 = 0.7;

/// Stage of the suggestion fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionPolicy {
    /// Configured strategy and thresholds.
    Strict,
    /// Fuzzy only, at a reduced threshold.
    Loose,
    /// No further attempts.
    GiveUp,
}

impl SuggestionPolicy {
    /// The stage tried after this one fails.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Strict => Self::Loose,
            Self::Loose | Self::GiveUp => Self::GiveUp,
        }
    }

    /// Ranker options for this stage, or `None` once given up.
    #[must_use]
    pub fn options(self, config: &ServiceConfig, fuzzy_threshold: f64) -> Option<MatchOptions> {
        let strict = config.match_options().with_fuzzy_threshold(fuzzy_threshold);
        match self {
            Self::Strict => Some(strict),
            Self::Loose => Some(
                strict
                    .with_strategy(MatchStrategy::FuzzyOnly)
                    .with_fuzzy_threshold(fuzzy_threshold * LOOSE_THRESHOLD_FACTOR),
            ),
            Self::GiveUp => None,
        }
    }
}

/// Ranks `names` against `query`, walking the fallback stages until one
/// produces candidates.
#[must_use]
pub fn suggest<S: AsRef<str>>(
    query: &str,
    names: &[S],
    config: &ServiceConfig,
    fuzzy_threshold: f64,
) -> Vec<MatchCandidate> {
    let mut policy = SuggestionPolicy::Strict;

    while let Some(options) = policy.options(config, fuzzy_threshold) {
        let candidates = rank(query, names, &options, &config.tables);
        if !candidates.is_empty() {
            return candidates;
        }
        let next = policy.next();
        log::debug!("No suggestions for {query:?} at {policy:?}, moving to {next:?}");
        policy = next;
    }

    Vec::new()
}
