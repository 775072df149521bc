//! Service-wide tuning knobs.

use postcodes_matching::{MatchOptions, MatchStrategy, MatchTables};
use serde::{Deserialize, Serialize};

/// Thresholds, limits, and feature switches shared by every tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Minimum similarity for fuzzy suggestions.
    pub fuzzy_threshold: f64,
    /// Phonetic threshold; matches need similarity of 70% of this.
    pub phonetic_threshold: f64,
    /// Maximum suggestions returned by the matching tools.
    pub max_suggestions: usize,
    /// Radius used when a radius search omits one.
    pub default_radius_km: f64,
    /// Largest radius a radius search accepts.
    pub max_radius_km: f64,
    /// Radius searched for neighbouring localities.
    pub neighbor_radius_km: f64,
    /// Whether string-similarity matching is enabled.
    pub enable_fuzzy: bool,
    /// Whether phonetic matching is enabled.
    pub enable_phonetic: bool,
    /// Cap on listing sizes.
    pub max_results: usize,
    /// Fuzzy threshold for spelling corrections.
    pub spelling_threshold: f64,
    /// Abbreviation and split-prefix tables.
    pub tables: MatchTables,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.8,
            phonetic_threshold: 0.85,
            max_suggestions: 5,
            default_radius_km: 10.0,
            max_radius_km: 500.0,
            neighbor_radius_km: 8.0,
            enable_fuzzy: true,
            enable_phonetic: true,
            max_results: 100,
            spelling_threshold: 0.7,
            tables: MatchTables::default(),
        }
    }
}

impl ServiceConfig {
    /// Strategy implied by the fuzzy/phonetic switches.
    #[must_use]
    pub const fn strategy(&self) -> MatchStrategy {
        MatchStrategy::from_flags(self.enable_fuzzy, self.enable_phonetic)
    }

    /// Ranker options for suggestion lookups.
    #[must_use]
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            strategy: self.strategy(),
            fuzzy_threshold: self.fuzzy_threshold,
            phonetic_threshold: self.phonetic_threshold,
            max_results: self.max_suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert!((config.fuzzy_threshold - 0.8).abs() < f64::EPSILON);
        assert!((config.neighbor_radius_km - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.strategy(), MatchStrategy::Combined);
    }

    #[test]
    fn switches_select_strategy() {
        let config = ServiceConfig {
            enable_phonetic: false,
            ..ServiceConfig::default()
        };
        assert_eq!(config.match_options().strategy, MatchStrategy::FuzzyOnly);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"fuzzyThreshold": 0.9, "maxSuggestions": 3}"#).unwrap();
        assert!((config.fuzzy_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.max_suggestions, 3);
        assert!((config.max_radius_km - 500.0).abs() < f64::EPSILON);
    }
}
