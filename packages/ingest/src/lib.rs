#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gazetteer ingestion.
//!
//! Downloads the published Australian postcodes CSV, parses it into
//! [`NameRecord`]s, and replaces the contents of a [`GazetteerStore`].

pub mod download;
pub mod postcodes_csv;
pub mod progress;

use std::collections::BTreeSet;
use std::path::Path;

use postcodes_database::{DbError, GazetteerStore};
use postcodes_gazetteer_models::NameRecord;

pub use download::{DEFAULT_DATA_URL, data_url, download_csv};
pub use postcodes_csv::{parse_csv, parse_csv_path};
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Number of records inserted per batch.
const CHUNK_SIZE: usize = 5_000;

/// Errors from ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// I/O error reading or writing a local file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV structure error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Store error.
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Outcome of [`load_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records written to the store.
    pub inserted: usize,
    /// Records dropped as repeats of an earlier (postcode, name, state).
    pub duplicates: usize,
}

/// Replaces the store's contents with `records`.
///
/// Repeated (postcode, name, state) rows keep the first occurrence.
///
/// # Errors
///
/// Returns [`IngestError::Database`] if the store cannot be cleared or
/// written.
pub fn load_into(
    store: &dyn GazetteerStore,
    records: &[NameRecord],
    progress: &dyn ProgressCallback,
) -> Result<LoadSummary, IngestError> {
    let mut seen = BTreeSet::new();
    let unique: Vec<NameRecord> = records
        .iter()
        .filter(|r| seen.insert((r.postcode.as_str(), r.name.as_str(), r.state)))
        .cloned()
        .collect();
    let duplicates = records.len() - unique.len();

    store.clear()?;

    progress.set_total(unique.len() as u64);
    progress.set_message("Loading localities".to_string());

    let mut inserted = 0;
    for chunk in unique.chunks(CHUNK_SIZE) {
        inserted += store.insert(chunk)?;
        progress.inc(chunk.len() as u64);
    }

    store.mark_loaded()?;
    progress.finish(format!("Loaded {inserted} localities"));

    log::info!("Loaded {inserted} records ({duplicates} duplicates dropped)");

    Ok(LoadSummary {
        inserted,
        duplicates,
    })
}

/// Downloads the CSV when missing (or when `update` is set), then parses it
/// and loads it into `store`.
///
/// # Errors
///
/// Returns an error if the download, parse, or load fails.
pub async fn refresh(
    store: &dyn GazetteerStore,
    url: &str,
    csv_path: &Path,
    update: bool,
    progress: &dyn ProgressCallback,
) -> Result<LoadSummary, IngestError> {
    if update || !csv_path.exists() {
        download_csv(url, csv_path).await?;
    } else {
        log::info!("Using existing {}", csv_path.display());
    }

    let records = parse_csv_path(csv_path)?;
    load_into(store, &records, progress)
}

#[cfg(test)]
mod tests {
    use postcodes_database::{Gazetteer, MemoryGazetteer};
    use postcodes_gazetteer_models::State;

    use super::*;

    #[test]
    fn load_replaces_contents_and_drops_duplicates() {
        let store = MemoryGazetteer::new(vec![NameRecord::new("Stale", State::Tas, "7000")]);
        let records = vec![
            NameRecord::new("Hobart", State::Tas, "7000"),
            NameRecord::new("Hobart", State::Tas, "7000"),
            NameRecord::new("Sandy Bay", State::Tas, "7005"),
        ];

        let summary = load_into(&store, &records, &NullProgress).unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                inserted: 2,
                duplicates: 1
            }
        );
        assert_eq!(store.all_names(None).unwrap(), vec!["Hobart", "Sandy Bay"]);
        assert!(store.loaded_at().unwrap().is_some());
    }

    #[test]
    fn parse_then_load_into_duckdb() {
        let csv = "postcode,locality,state,long,lat,lgaregion\n\
                   7000,HOBART,TAS,147.3257,-42.8826,Hobart\n\
                   7000,GLEBE,TAS,147.3276,-42.8744,Hobart\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        let store = postcodes_database::DuckDbGazetteer::open_in_memory().unwrap();

        load_into(&store, &records, &NullProgress).unwrap();

        assert_eq!(store.lookup_postcode("7000").unwrap().len(), 2);
        assert_eq!(store.search_lga("hobart", Some(State::Tas)).unwrap().len(), 2);
    }
}
