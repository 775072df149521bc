#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postcode lookup tools.
//!
//! Each public function in [`lookup`], [`suggest`], [`location`], and
//! [`analytics`] implements one tool: it takes the directory, the service
//! configuration, and the tool's parameters, and returns a typed result.
//! [`execute_tool`] dispatches by tool name over JSON.

pub mod analytics;
pub mod config;
pub mod dispatch;
pub mod location;
pub mod lookup;
pub mod policy;
pub mod suggest;

use postcodes_database::DbError;
use postcodes_gazetteer_models::State;
use postcodes_spatial::ProximityError;
use thiserror::Error;

pub use config::config_from_env;
pub use dispatch::execute_tool;
pub use policy::SuggestionPolicy;

/// Errors returned by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// State is neither a known code nor a full name.
    #[error("Invalid state: {input}. Valid states are: {}", State::valid_codes())]
    InvalidState {
        /// The rejected input.
        input: String,
    },

    /// Postcode is not four digits.
    #[error("Invalid postcode format: {0}. Must be 4 digits.")]
    InvalidPostcode(String),

    /// Radius is not positive or exceeds the configured maximum.
    #[error("Invalid radius: {radius_km}km. Radius must be greater than 0 and at most {max_km}km.")]
    InvalidRadius {
        /// The rejected radius.
        radius_km: f64,
        /// The configured maximum.
        max_km: f64,
    },

    /// The location exists but has no coordinates.
    #[error("No coordinates available for '{0}'")]
    MissingCoordinates(String),

    /// Nothing matched.
    #[error("{message}")]
    NotFound {
        /// What was not found.
        message: String,
        /// What to try next.
        suggestion: String,
    },

    /// Parameters are well-formed JSON but unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Directory query failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Parameters or results could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No tool has this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    pub(crate) fn not_found(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

impl From<ProximityError> for ToolError {
    fn from(e: ProximityError) -> Self {
        match e {
            ProximityError::InvalidRadius(radius_km) => Self::InvalidRadius {
                radius_km,
                max_km: f64::INFINITY,
            },
            ProximityError::MissingCoordinates => {
                Self::MissingCoordinates("search center".to_string())
            }
        }
    }
}

/// Parses an optional state filter. Blank input means no filter.
pub(crate) fn parse_state(input: Option<&str>) -> Result<Option<State>, ToolError> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => State::parse(s)
            .map(Some)
            .ok_or_else(|| ToolError::InvalidState {
                input: s.to_string(),
            }),
    }
}

/// Exactly four ASCII digits.
pub(crate) fn is_postcode(text: &str) -> bool {
    text.len() == 4 && text.chars().all(|c| c.is_ascii_digit())
}

/// Rejects blank text, returning it trimmed.
pub(crate) fn required<'a>(text: &'a str, field: &str) -> Result<&'a str, ToolError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

#[cfg(test)]
pub(crate) mod fixture {
    use postcodes_database::MemoryGazetteer;
    use postcodes_gazetteer_models::{NameRecord, State};

    fn place(
        name: &str,
        state: State,
        postcode: &str,
        coordinates: Option<(f64, f64)>,
        lga: &str,
    ) -> NameRecord {
        let record = NameRecord::new(name, state, postcode).with_lga(lga);
        match coordinates {
            Some((lat, lon)) => record.with_coordinates(lat, lon),
            None => record,
        }
    }

    /// A small directory around Sydney plus a few interstate entries.
    pub fn gazetteer() -> MemoryGazetteer {
        let mut sydney = place(
            "Sydney",
            State::Nsw,
            "2000",
            Some((-33.8688, 151.2093)),
            "Sydney",
        );
        sydney.sa3_name = Some("Sydney Inner City".to_string());
        sydney.sa4_name = Some("Sydney - City and Inner South".to_string());

        let mut newcastle = place(
            "Newcastle",
            State::Nsw,
            "2300",
            Some((-32.9283, 151.7817)),
            "Newcastle",
        );
        newcastle.region = Some("Hunter".to_string());

        MemoryGazetteer::new(vec![
            sydney,
            place("Haymarket", State::Nsw, "2000", Some((-33.8806, 151.2054)), "Sydney"),
            place("The Rocks", State::Nsw, "2000", Some((-33.8599, 151.2090)), "Sydney"),
            place("Surry Hills", State::Nsw, "2010", Some((-33.8861, 151.2111)), "Sydney"),
            place("Newtown", State::Nsw, "2042", Some((-33.8981, 151.1790)), "Inner West"),
            place("Newtown", State::Vic, "3220", Some((-38.1530, 144.3370)), "Greater Geelong"),
            newcastle,
            place("Melbourne", State::Vic, "3000", Some((-37.8136, 144.9631)), "Melbourne"),
            place("Melbourne", State::Vic, "3004", Some((-37.8400, 144.9800)), "Melbourne"),
            place("Parramatta", State::Nsw, "2150", Some((-33.8150, 151.0011)), "Parramatta"),
            place("Hobart", State::Tas, "7000", None, "Hobart"),
        ])
    }
}
