#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gazetteer directory storage.
//!
//! The [`Gazetteer`] trait is the read-only directory that matching and
//! proximity search draw candidates from. [`DuckDbGazetteer`] keeps the
//! directory in a `DuckDB` file under `data/`; [`MemoryGazetteer`] keeps it
//! in a `Vec` for tests and small embedded datasets. Both also implement
//! [`GazetteerStore`], the write side used by ingestion.
//!
//! Name comparisons are case-insensitive everywhere. LGA, region, and
//! statistical-area searches are case-insensitive substring matches.

pub mod gazetteer_db;
pub mod memory;
pub mod paths;

use postcodes_gazetteer_models::{GazetteerStatistics, LgaInfo, NameRecord, State};

pub use gazetteer_db::DuckDbGazetteer;
pub use memory::MemoryGazetteer;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A lock guarding the store was poisoned by a panicking thread.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Read-only access to the locality directory.
///
/// All methods that take an optional `state` restrict results to that state
/// when it is `Some`.
pub trait Gazetteer: Send + Sync {
    /// Records whose name equals `name`, ignoring case. Ordered by postcode.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn lookup_exact(&self, name: &str, state: Option<State>) -> Result<Vec<NameRecord>, DbError>;

    /// Distinct locality names, sorted.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn all_names(&self, state: Option<State>) -> Result<Vec<String>, DbError>;

    /// Records that have both coordinates, ordered by name, state, postcode.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn all_records_with_coordinates(&self, state: Option<State>)
    -> Result<Vec<NameRecord>, DbError>;

    /// Records with this postcode, ordered by name then state.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn lookup_postcode(&self, postcode: &str) -> Result<Vec<NameRecord>, DbError>;

    /// Up to `limit` distinct names starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn search_prefix(
        &self,
        prefix: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError>;

    /// Up to `limit` distinct names containing `fragment`, sorted.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn search_substring(
        &self,
        fragment: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError>;

    /// Records whose LGA name contains `fragment`, ordered by name then
    /// postcode.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn search_lga(&self, fragment: &str, state: Option<State>)
    -> Result<Vec<NameRecord>, DbError>;

    /// Records whose region name contains `fragment`, ordered by name then
    /// postcode.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn search_region(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError>;

    /// Records whose SA3 or SA4 name contains `fragment`, ordered by name
    /// then postcode.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn search_statistical_area(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError>;

    /// Distinct LGAs with their locality counts, ordered by state then name.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn all_lgas(&self, state: Option<State>) -> Result<Vec<LgaInfo>, DbError>;

    /// Whether a record with this name (ignoring case) and postcode exists.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn validate_combination(
        &self,
        name: &str,
        postcode: &str,
        state: Option<State>,
    ) -> Result<bool, DbError>;

    /// Whole-directory counts.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn statistics(&self) -> Result<GazetteerStatistics, DbError>;

    /// RFC 3339 timestamp of the last completed load, if any.
    ///
    /// # Errors
    ///
    /// * If the store cannot be queried
    fn loaded_at(&self) -> Result<Option<String>, DbError>;
}

/// Write access used when (re)loading the directory.
pub trait GazetteerStore: Gazetteer {
    /// Removes every record.
    ///
    /// # Errors
    ///
    /// * If the store cannot be modified
    fn clear(&self) -> Result<(), DbError>;

    /// Appends records, returning how many were inserted.
    ///
    /// # Errors
    ///
    /// * If the store cannot be modified
    fn insert(&self, records: &[NameRecord]) -> Result<usize, DbError>;

    /// Records that a load finished now.
    ///
    /// # Errors
    ///
    /// * If the store cannot be modified
    fn mark_loaded(&self) -> Result<(), DbError>;
}

/// Case-insensitive substring test shared by the in-memory store.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
