//! Abbreviation and compound-prefix tables.
//!
//! The defaults cover common Australian locality abbreviations ("Mt" for
//! "Mount", "Ck" for "Creek") and the directional/descriptive prefixes that
//! are frequently written joined or split ("Newcastle" / "New Castle").
//! Alternate tables can be loaded from TOML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::MatchError;

/// Default abbreviation expansions, keyed by the abbreviation.
const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Mt", "Mount"),
    ("St", "Saint"),
    ("Pt", "Port"),
    ("Nth", "North"),
    ("Sth", "South"),
    ("E", "East"),
    ("W", "West"),
    ("Ck", "Creek"),
    ("Hts", "Heights"),
    ("Pk", "Park"),
    ("Jct", "Junction"),
    ("Ctr", "Centre"),
    ("Sq", "Square"),
];

/// Default split prefixes in priority order, each with the number of
/// characters kept before the inserted space.
///
/// `New` splits after four characters ("Newcastle" -> "Newc astle"); the
/// other lengths equal their prefix.
const DEFAULT_SPLIT_PREFIXES: &[(&str, usize)] = &[
    ("New", 4),
    ("North", 5),
    ("South", 5),
    ("East", 4),
    ("West", 4),
    ("Upper", 5),
    ("Lower", 5),
    ("Port", 4),
    ("Mount", 5),
];

/// A prefix that triggers a split variant of a single-word query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPrefix {
    /// Matched case-insensitively against the start of the query.
    pub prefix: String,
    /// Characters before the inserted space.
    pub split_len: usize,
}

impl SplitPrefix {
    #[must_use]
    pub fn new(prefix: &str, split_len: usize) -> Self {
        Self {
            prefix: prefix.to_string(),
            split_len,
        }
    }
}

/// Which matching prefixes produce a split variant of a single-word query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Only the first prefix in table order that matches.
    #[default]
    FirstMatch,
    /// Every matching prefix.
    All,
}

/// Lookup tables used by the abbreviation expander and variant generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTables {
    /// Abbreviation to expansion. Keys are stored lowercased.
    #[serde(deserialize_with = "lowercase_keys")]
    pub abbreviations: BTreeMap<String, String>,
    /// Prefixes considered when splitting a single-word query.
    pub split_prefixes: Vec<SplitPrefix>,
    /// How many matching prefixes produce a split.
    pub split_policy: SplitPolicy,
}

impl Default for MatchTables {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS
                .iter()
                .map(|(abbr, full)| (abbr.to_lowercase(), (*full).to_string()))
                .collect(),
            split_prefixes: DEFAULT_SPLIT_PREFIXES
                .iter()
                .map(|(prefix, split_len)| SplitPrefix::new(prefix, *split_len))
                .collect(),
            split_policy: SplitPolicy::default(),
        }
    }
}

impl MatchTables {
    /// Parses tables from a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// * If the document is not valid TOML for this structure
    pub fn from_toml_str(source: &str) -> Result<Self, MatchError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads tables from a TOML file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the file is not valid TOML for this structure
    pub fn from_path(path: &Path) -> Result<Self, MatchError> {
        let source = std::fs::read_to_string(path)?;
        log::debug!("Loading match tables from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Returns the expansion for a single token, compared case-insensitively.
    #[must_use]
    pub fn expansion(&self, token: &str) -> Option<&str> {
        self.abbreviations
            .get(&token.to_lowercase())
            .map(String::as_str)
    }
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(abbr, full)| (abbr.to_lowercase(), full))
        .collect())
}
