#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for the postcode lookup tools.
//!
//! Each tool takes a camelCase JSON parameter object and returns a typed
//! result. [`tool_definitions`] describes the parameters as JSON Schema.

pub mod config;
pub mod definitions;

use std::collections::BTreeMap;

use postcodes_gazetteer_models::{MatchKind, NameRecord, State};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use config::ServiceConfig;
pub use definitions::tool_definitions;

/// Every tool the service exposes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    SearchPostcode,
    SearchSuburb,
    ValidateCombination,
    SmartSearch,
    FuzzyMatchSuburb,
    Autocomplete,
    CheckSpelling,
    VoiceSearch,
    SuburbsInLga,
    GetSuburbLga,
    SuburbsWithinRadius,
    FindNeighbors,
    StateStats,
    ListLgas,
    SearchRegion,
    CheckHealth,
}

impl ToolName {
    /// All tools, in definition order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SearchPostcode,
            Self::SearchSuburb,
            Self::ValidateCombination,
            Self::SmartSearch,
            Self::FuzzyMatchSuburb,
            Self::Autocomplete,
            Self::CheckSpelling,
            Self::VoiceSearch,
            Self::SuburbsInLga,
            Self::GetSuburbLga,
            Self::SuburbsWithinRadius,
            Self::FindNeighbors,
            Self::StateStats,
            Self::ListLgas,
            Self::SearchRegion,
            Self::CheckHealth,
        ]
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Parameters for `search_postcode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPostcodeParams {
    /// Four-digit postcode.
    pub postcode: String,
}

/// Localities sharing a postcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeSearchResult {
    pub postcode: String,
    pub suburbs: Vec<NameRecord>,
    /// The same localities keyed by state.
    pub suburbs_by_state: BTreeMap<State, Vec<NameRecord>>,
    pub count: usize,
}

/// Parameters for `search_suburb`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSuburbParams {
    /// Locality name, matched exactly ignoring case.
    pub suburb: String,
    /// Optional state code or name.
    pub state: Option<String>,
}

/// Exact locality lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbSearchResult {
    pub suburb: String,
    pub results: Vec<NameRecord>,
    pub count: usize,
    /// Sorted, unique postcodes.
    pub postcodes: Vec<String>,
    /// Set when exactly one postcode was found.
    pub postcode: Option<String>,
    /// True when the name exists in several states and none was requested.
    pub multiple_states: bool,
    pub states_found: Vec<State>,
    pub suggestion: Option<String>,
}

/// Parameters for `validate_combination`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCombinationParams {
    pub suburb: String,
    pub postcode: String,
    pub state: Option<String>,
}

/// Whether a locality/postcode pair exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    /// 1.0 when valid, 0.0 otherwise.
    pub confidence: f64,
    pub details: Option<NameRecord>,
    /// Hints about what the postcode and locality belong to instead.
    pub suggestions: Vec<String>,
}

/// Parameters for `smart_search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSearchParams {
    /// A postcode, a locality name, or `"locality, state"`.
    pub query: String,
}

/// Result of `smart_search`, tagged by how the query was interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "queryType", rename_all = "snake_case")]
pub enum SmartSearchResult {
    Postcode(PostcodeSearchResult),
    Suburb(SuburbSearchResult),
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// A suggested locality with the postcodes and states it occurs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbSuggestion {
    pub suburb: String,
    pub confidence: f64,
    pub match_kind: MatchKind,
    pub postcodes: Vec<String>,
    pub states: Vec<State>,
}

/// Parameters for `fuzzy_match_suburb`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyMatchParams {
    pub misspelled: String,
    pub state: Option<String>,
    /// Overrides the configured fuzzy threshold.
    pub threshold: Option<f64>,
}

/// Suggestions for a possibly misspelled locality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyMatchResult {
    pub query: String,
    pub exact_match: bool,
    /// Confidence of the best suggestion.
    pub confidence: f64,
    /// Records for an exact match; empty otherwise.
    pub exact_results: Vec<NameRecord>,
    pub suggestions: Vec<SuburbSuggestion>,
    pub suggestion: Option<String>,
}

/// Parameters for `autocomplete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteParams {
    /// At least two characters.
    pub partial: String,
    pub state: Option<String>,
    /// Defaults to 10.
    pub limit: Option<usize>,
}

/// How an autocomplete entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Prefix,
    Substring,
}

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub suburb: String,
    pub match_kind: CompletionKind,
    pub states: Vec<State>,
    pub postcodes: Vec<String>,
}

/// Autocomplete entries, prefix matches first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteResult {
    pub query: String,
    pub suggestions: Vec<Completion>,
    pub count: usize,
}

/// Parameters for `check_spelling`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpellingParams {
    pub suburb: String,
}

/// Spelling check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellingResult {
    pub query: String,
    pub spelling_correct: bool,
    pub confidence: f64,
    pub suggested_spelling: Option<String>,
    pub corrections: Vec<SuburbSuggestion>,
}

/// Parameters for `voice_search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSearchParams {
    /// The locality name as heard.
    pub spoken_name: String,
}

/// Localities that sound like the spoken input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSearchResult {
    pub spoken_input: String,
    pub exact_match: bool,
    pub confidence: f64,
    pub match_kind: MatchKind,
    /// The compound variant that matched, if any.
    pub matched_variant: Option<String>,
    /// Records for exact and compound-variant matches.
    pub results: Vec<NameRecord>,
    pub phonetic_matches: Vec<SuburbSuggestion>,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A locality with all of its postcodes, as listed by area searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbSummary {
    pub suburb: String,
    pub state: State,
    pub postcodes: Vec<String>,
    pub lga_name: Option<String>,
    pub region: Option<String>,
}

/// Parameters for `suburbs_in_lga`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbsInLgaParams {
    /// LGA name or fragment.
    pub lga_name: String,
    pub state: Option<String>,
}

/// Localities in the LGAs matching a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LgaSuburbsResult {
    pub query: String,
    pub lga_names_found: Vec<String>,
    pub suburbs: Vec<SuburbSummary>,
    pub suburb_count: usize,
    pub total_postcodes: usize,
}

/// Parameters for `get_suburb_lga`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbLgaParams {
    pub suburb: String,
    pub state: Option<String>,
}

/// One LGA a locality belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbLga {
    pub lga_name: String,
    pub lga_code: Option<String>,
    pub state: State,
    pub postcodes: Vec<String>,
}

/// The LGAs a locality belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuburbLgaResult {
    pub suburb: String,
    pub primary_lga: Option<SuburbLga>,
    pub all_lgas: Vec<SuburbLga>,
    pub multiple_lgas: bool,
}

/// How a search center was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterKind {
    Postcode,
    Suburb,
}

/// The record a proximity search was centered on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterInfo {
    pub kind: CenterKind,
    pub suburb: String,
    pub postcode: String,
    pub state: State,
    pub latitude: f64,
    pub longitude: f64,
    pub lga_name: Option<String>,
}

/// A locality near a search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySuburb {
    pub suburb: String,
    pub state: State,
    pub postcodes: Vec<String>,
    /// Rounded to one decimal place.
    pub distance_km: f64,
    pub lga_name: Option<String>,
    /// Whether it shares the center's LGA.
    pub same_lga: bool,
}

/// Parameters for `suburbs_within_radius`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusParams {
    /// A postcode or locality name.
    pub postcode_or_suburb: String,
    /// Defaults to the configured radius.
    pub radius_km: Option<f64>,
    pub state: Option<String>,
}

/// Localities within a radius of a center.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusResult {
    pub center: CenterInfo,
    pub radius_km: f64,
    pub suburbs: Vec<NearbySuburb>,
    pub suburb_count: usize,
}

/// Parameters for `find_neighbors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsParams {
    pub suburb: String,
    pub state: Option<String>,
    /// 1 to 50; anything else becomes 10.
    pub max_neighbors: Option<i64>,
}

/// Nearest other localities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsResult {
    pub query_suburb: CenterInfo,
    pub neighbors: Vec<NearbySuburb>,
    pub neighbor_count: usize,
    pub search_radius_km: f64,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Parameters for `state_stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStatsParams {
    pub state: Option<String>,
}

/// Counts for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub state: State,
    pub state_name: String,
    pub postcodes: u64,
    pub suburbs: u64,
}

/// Directory-wide counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalStatistics {
    pub total_records: u64,
    pub unique_postcodes: u64,
    pub unique_suburbs: u64,
    pub unique_lgas: u64,
}

/// Result of `state_stats`, tagged by scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum StateStatsResult {
    /// One state, with its LGA names.
    State {
        summary: StateSummary,
        total_lgas: usize,
        lga_list: Vec<String>,
    },
    /// Every state.
    National {
        national: NationalStatistics,
        by_state: Vec<StateSummary>,
    },
}

/// Parameters for `list_lgas`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLgasParams {
    pub state: Option<String>,
    #[serde(default)]
    pub include_suburbs_count: bool,
}

/// One LGA in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LgaSummary {
    pub lga_name: String,
    pub lga_code: Option<String>,
    pub state: State,
    pub state_name: String,
    /// Present when counts were requested.
    pub suburb_count: Option<u64>,
}

/// LGAs sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLgasResult {
    pub total_lgas: usize,
    pub lgas: Vec<LgaSummary>,
    /// Present when no state filter was given.
    pub lgas_by_state: Option<BTreeMap<State, Vec<LgaSummary>>>,
}

/// Parameters for `search_region`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRegionParams {
    pub region: String,
    pub state: Option<String>,
}

/// Localities in a named region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResult {
    pub query: String,
    /// Region, SA3, and SA4 names seen in the matches.
    pub regions_found: Vec<String>,
    pub suburbs: Vec<SuburbSummary>,
    pub suburb_count: usize,
    pub total_postcodes: usize,
}

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Health {
    Healthy,
    NeedsData,
    Unhealthy,
}

/// State coverage of the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub states: Vec<State>,
    pub state_count: usize,
    pub all_states_covered: bool,
}

/// Result of `check_health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub health: Health,
    pub message: String,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    /// RFC 3339 time of the last load, if known.
    pub loaded_at: Option<String>,
    pub statistics: Option<NationalStatistics>,
    pub coverage: Option<Coverage>,
    /// Store error, when the store could not be queried.
    pub error: Option<String>,
}
