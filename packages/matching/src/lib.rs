#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Locality name matching.
//!
//! Resolves free-form, possibly misspelled or misheard place names against a
//! pool of known names. The building blocks are an abbreviation expander, a
//! compound-word variant generator, a token-order-insensitive similarity
//! scorer, and a Double Metaphone encoder; [`rank`] combines them into a
//! deduplicated, confidence-ordered candidate list.
//!
//! Every function here is pure and synchronous over caller-supplied data.

pub mod abbreviations;
pub mod phonetic;
pub mod ranker;
pub mod similarity;
pub mod tables;
pub mod variants;

pub use abbreviations::expand_abbreviations;
pub use phonetic::{PhoneticCodes, PhoneticEncoder};
pub use ranker::{MatchOptions, MatchStrategy, rank};
pub use similarity::similarity;
pub use tables::{MatchTables, SplitPolicy, SplitPrefix};
pub use variants::compound_variants;

/// Errors from loading match tables.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Table file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Table file is not valid TOML for [`MatchTables`].
    #[error("Invalid match tables: {0}")]
    Toml(#[from] toml::de::Error),
}
