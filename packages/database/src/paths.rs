#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the gazetteer data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! overridden through the environment.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`database_path`].
pub const DB_PATH_ENV: &str = "POSTCODES_DB_PATH";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the gazetteer `DuckDB` path, honoring `POSTCODES_DB_PATH`.
#[must_use]
pub fn database_path() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| data_dir().join("postcodes.duckdb"), PathBuf::from)
}

/// Returns the path the source CSV is downloaded to.
#[must_use]
pub fn csv_path() -> PathBuf {
    data_dir().join("postcodes.csv")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_files_live_under_data_dir() {
        assert!(csv_path().starts_with(data_dir()));
        assert_eq!(csv_path().file_name().unwrap(), "postcodes.csv");
    }

    #[test]
    fn project_root_contains_workspace_manifest() {
        assert!(project_root().join("Cargo.toml").exists());
    }
}
