#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Locality, postcode, and match result types.
//!
//! These types describe gazetteer records (one row per locality/postcode
//! pair) and the transient results produced by name matching and proximity
//! search. They carry no I/O and no matching logic.

pub mod state;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

pub use state::State;

/// A single locality/postcode row from the gazetteer.
///
/// A locality spanning several postcodes appears once per postcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
    /// Locality (suburb or town) name, e.g. "Newcastle".
    pub name: String,
    /// State or territory.
    pub state: State,
    /// Four-digit postcode.
    pub postcode: String,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Local Government Area name.
    pub lga_name: Option<String>,
    /// Local Government Area code.
    pub lga_code: Option<String>,
    /// Tourism/planning region name.
    pub region: Option<String>,
    /// ABS SA3 statistical area name.
    pub sa3_name: Option<String>,
    /// ABS SA4 statistical area name.
    pub sa4_name: Option<String>,
    /// Federal electoral division.
    pub electoral_division: Option<String>,
}

impl NameRecord {
    /// Creates a record with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, state: State, postcode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state,
            postcode: postcode.into(),
            latitude: None,
            longitude: None,
            lga_name: None,
            lga_code: None,
            region: None,
            sa3_name: None,
            sa4_name: None,
            electoral_division: None,
        }
    }

    /// Sets the coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Sets the Local Government Area name.
    #[must_use]
    pub fn with_lga(mut self, lga_name: impl Into<String>) -> Self {
        self.lga_name = Some(lga_name.into());
        self
    }

    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// How a [`MatchCandidate`] was found.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive equality with the query.
    Exact,
    /// Equality with a joined or split spelling of the query.
    CompoundVariant,
    /// String similarity above the fuzzy threshold.
    Fuzzy,
    /// Matching Double Metaphone codes.
    Phonetic,
}

/// A ranked name-match result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    /// The candidate name exactly as it appears in the directory.
    pub matched_name: String,
    /// Match certainty in `[0, 1]`; `1.0` only for exact matches.
    pub confidence: f64,
    /// Strategy that produced this candidate.
    pub match_kind: MatchKind,
}

/// A locality within a proximity search radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityResult {
    /// Locality name.
    pub name: String,
    /// State or territory.
    pub state: State,
    /// Every postcode of this locality inside the radius.
    pub postcodes: BTreeSet<String>,
    /// Minimum great-circle distance from the center, unrounded.
    pub distance_km: f64,
    /// Local Government Area of the first row, in directory order, that has one.
    pub lga_name: Option<String>,
}

/// A Local Government Area as listed by the directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LgaInfo {
    /// LGA name.
    pub lga_name: String,
    /// LGA code, when the source provides one.
    pub lga_code: Option<String>,
    /// State the LGA belongs to.
    pub state: State,
    /// Distinct localities in the LGA.
    pub suburb_count: u64,
}

/// Per-state counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCounts {
    /// State or territory.
    pub state: State,
    /// Distinct postcodes.
    pub postcodes: u64,
    /// Distinct locality names.
    pub suburbs: u64,
}

/// Whole-directory counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazetteerStatistics {
    /// Total rows.
    pub total_records: u64,
    /// Distinct postcodes.
    pub unique_postcodes: u64,
    /// Distinct locality names.
    pub unique_suburbs: u64,
    /// Distinct LGA names.
    pub unique_lgas: u64,
    /// Counts per state, ordered by state.
    pub by_state: Vec<StateCounts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_require_both_values() {
        let record = NameRecord::new("Sydney", State::Nsw, "2000");
        assert_eq!(record.coordinates(), None);

        let record = record.with_coordinates(-33.8688, 151.2093);
        assert_eq!(record.coordinates(), Some((-33.8688, 151.2093)));

        let partial = NameRecord {
            longitude: None,
            ..record
        };
        assert_eq!(partial.coordinates(), None);
    }

    #[test]
    fn match_kind_serializes_snake_case() {
        assert_eq!(MatchKind::CompoundVariant.to_string(), "compound_variant");
        assert_eq!(
            serde_json::to_string(&MatchKind::Phonetic).unwrap(),
            "\"phonetic\""
        );
    }

    #[test]
    fn record_serializes_state_code() {
        let record = NameRecord::new("Hobart", State::Tas, "7000");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "TAS");
        assert_eq!(json["postcode"], "7000");
        assert!(json["lgaName"].is_null());
    }
}
