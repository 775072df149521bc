//! Environment overrides for [`ServiceConfig`].

use std::path::Path;
use std::str::FromStr;

use postcodes_matching::MatchTables;
use postcodes_tools_models::ServiceConfig;

/// Reads [`ServiceConfig`] from the process environment.
///
/// Recognized variables: `FUZZY_THRESHOLD`, `PHONETIC_THRESHOLD`,
/// `MAX_SUGGESTIONS`, `DEFAULT_RADIUS_KM`, `MAX_RESULTS`,
/// `ENABLE_FUZZY_MATCHING`, `ENABLE_PHONETIC_SEARCH`, and
/// `MATCH_TABLES_PATH` (a TOML file of abbreviation and prefix tables).
/// Unset variables keep their defaults; unparsable ones are logged and
/// ignored.
#[must_use]
pub fn config_from_env() -> ServiceConfig {
    config_from_vars(|key| std::env::var(key).ok())
}

/// Like [`config_from_env`], reading variables through `lookup`.
#[must_use]
pub fn config_from_vars(lookup: impl Fn(&str) -> Option<String>) -> ServiceConfig {
    let mut config = ServiceConfig::default();

    override_with(&lookup, "FUZZY_THRESHOLD", &mut config.fuzzy_threshold);
    override_with(&lookup, "PHONETIC_THRESHOLD", &mut config.phonetic_threshold);
    override_with(&lookup, "MAX_SUGGESTIONS", &mut config.max_suggestions);
    override_with(&lookup, "DEFAULT_RADIUS_KM", &mut config.default_radius_km);
    override_with(&lookup, "MAX_RESULTS", &mut config.max_results);

    if let Some(value) = lookup("ENABLE_FUZZY_MATCHING") {
        config.enable_fuzzy = flag(&value);
    }
    if let Some(value) = lookup("ENABLE_PHONETIC_SEARCH") {
        config.enable_phonetic = flag(&value);
    }

    if let Some(path) = lookup("MATCH_TABLES_PATH").filter(|p| !p.trim().is_empty()) {
        match MatchTables::from_path(Path::new(&path)) {
            Ok(tables) => config.tables = tables,
            Err(e) => log::warn!("Ignoring MATCH_TABLES_PATH={path}: {e}"),
        }
    }

    config
}

fn override_with<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => log::warn!("Ignoring unparsable {key}={raw:?}"),
    }
}

/// Only `true` (any case) enables a feature.
fn flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
