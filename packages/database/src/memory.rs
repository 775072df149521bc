//! In-memory gazetteer.
//!
//! Holds records in a `Vec` behind an `RwLock`. Result ordering matches
//! [`crate::DuckDbGazetteer`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard};

use postcodes_gazetteer_models::{GazetteerStatistics, LgaInfo, NameRecord, State, StateCounts};

use crate::{DbError, Gazetteer, GazetteerStore, contains_ignore_case};

#[derive(Default)]
struct Inner {
    records: Vec<NameRecord>,
    loaded_at: Option<String>,
}

/// Gazetteer held entirely in memory.
#[derive(Default)]
pub struct MemoryGazetteer {
    inner: RwLock<Inner>,
}

impl MemoryGazetteer {
    /// Creates a gazetteer holding `records`.
    #[must_use]
    pub fn new(records: Vec<NameRecord>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                records,
                loaded_at: None,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, DbError> {
        self.inner.read().map_err(|_| DbError::Poisoned)
    }

    fn filtered<F>(&self, state: Option<State>, predicate: F) -> Result<Vec<NameRecord>, DbError>
    where
        F: Fn(&NameRecord) -> bool,
    {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|r| state.is_none_or(|s| r.state == s) && predicate(r))
            .cloned()
            .collect())
    }

    fn names<F>(&self, state: Option<State>, limit: usize, predicate: F) -> Result<Vec<String>, DbError>
    where
        F: Fn(&NameRecord) -> bool,
    {
        let names: BTreeSet<String> = self
            .filtered(state, predicate)?
            .into_iter()
            .map(|r| r.name)
            .collect();
        Ok(names.into_iter().take(limit).collect())
    }
}

fn by_name_then_postcode(records: &mut [NameRecord]) {
    records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.postcode.cmp(&b.postcode)));
}

fn field_contains(field: Option<&String>, needle_lower: &str) -> bool {
    field.is_some_and(|value| contains_ignore_case(value, needle_lower))
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

impl Gazetteer for MemoryGazetteer {
    fn lookup_exact(&self, name: &str, state: Option<State>) -> Result<Vec<NameRecord>, DbError> {
        let needle = name.trim().to_lowercase();
        let mut records = self.filtered(state, |r| r.name.to_lowercase() == needle)?;
        records.sort_by(|a, b| {
            a.postcode
                .cmp(&b.postcode)
                .then_with(|| a.state.as_ref().cmp(b.state.as_ref()))
        });
        Ok(records)
    }

    fn all_names(&self, state: Option<State>) -> Result<Vec<String>, DbError> {
        self.names(state, usize::MAX, |_| true)
    }

    fn all_records_with_coordinates(
        &self,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let mut records = self.filtered(state, |r| r.coordinates().is_some())?;
        records.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.state.as_ref().cmp(b.state.as_ref()))
                .then_with(|| a.postcode.cmp(&b.postcode))
        });
        Ok(records)
    }

    fn lookup_postcode(&self, postcode: &str) -> Result<Vec<NameRecord>, DbError> {
        let postcode = postcode.trim();
        let mut records = self.filtered(None, |r| r.postcode == postcode)?;
        records.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.state.as_ref().cmp(b.state.as_ref()))
        });
        Ok(records)
    }

    fn search_prefix(
        &self,
        prefix: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError> {
        let needle = prefix.trim().to_lowercase();
        self.names(state, limit, |r| r.name.to_lowercase().starts_with(&needle))
    }

    fn search_substring(
        &self,
        fragment: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError> {
        let needle = fragment.trim().to_lowercase();
        self.names(state, limit, |r| contains_ignore_case(&r.name, &needle))
    }

    fn search_lga(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let needle = fragment.trim().to_lowercase();
        let mut records = self.filtered(state, |r| field_contains(r.lga_name.as_ref(), &needle))?;
        by_name_then_postcode(&mut records);
        Ok(records)
    }

    fn search_region(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let needle = fragment.trim().to_lowercase();
        let mut records = self.filtered(state, |r| field_contains(r.region.as_ref(), &needle))?;
        by_name_then_postcode(&mut records);
        Ok(records)
    }

    fn search_statistical_area(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let needle = fragment.trim().to_lowercase();
        let mut records = self.filtered(state, |r| {
            field_contains(r.sa3_name.as_ref(), &needle) || field_contains(r.sa4_name.as_ref(), &needle)
        })?;
        by_name_then_postcode(&mut records);
        Ok(records)
    }

    fn all_lgas(&self, state: Option<State>) -> Result<Vec<LgaInfo>, DbError> {
        let mut groups: BTreeMap<(&str, String, Option<String>), (State, BTreeSet<String>)> =
            BTreeMap::new();

        let inner = self.read()?;
        for record in &inner.records {
            if state.is_some_and(|s| record.state != s) {
                continue;
            }
            let Some(lga_name) = record.lga_name.as_ref().filter(|n| !n.is_empty()) else {
                continue;
            };
            groups
                .entry((record.state.as_ref(), lga_name.clone(), record.lga_code.clone()))
                .or_insert_with(|| (record.state, BTreeSet::new()))
                .1
                .insert(record.name.clone());
        }

        Ok(groups
            .into_iter()
            .map(|((_, lga_name, lga_code), (state, suburbs))| LgaInfo {
                lga_name,
                lga_code,
                state,
                suburb_count: count(suburbs.len()),
            })
            .collect())
    }

    fn validate_combination(
        &self,
        name: &str,
        postcode: &str,
        state: Option<State>,
    ) -> Result<bool, DbError> {
        let needle = name.trim().to_lowercase();
        let postcode = postcode.trim();
        Ok(self.read()?.records.iter().any(|r| {
            r.postcode == postcode
                && r.name.to_lowercase() == needle
                && state.is_none_or(|s| r.state == s)
        }))
    }

    fn statistics(&self) -> Result<GazetteerStatistics, DbError> {
        let inner = self.read()?;

        let mut postcodes = BTreeSet::new();
        let mut suburbs = BTreeSet::new();
        let mut lgas = BTreeSet::new();
        let mut per_state: BTreeMap<State, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();

        for record in &inner.records {
            postcodes.insert(record.postcode.as_str());
            suburbs.insert(record.name.as_str());
            if let Some(lga) = record.lga_name.as_deref().filter(|n| !n.is_empty()) {
                lgas.insert(lga);
            }
            let entry = per_state.entry(record.state).or_default();
            entry.0.insert(record.postcode.as_str());
            entry.1.insert(record.name.as_str());
        }

        Ok(GazetteerStatistics {
            total_records: count(inner.records.len()),
            unique_postcodes: count(postcodes.len()),
            unique_suburbs: count(suburbs.len()),
            unique_lgas: count(lgas.len()),
            by_state: per_state
                .into_iter()
                .map(|(state, (postcodes, suburbs))| StateCounts {
                    state,
                    postcodes: count(postcodes.len()),
                    suburbs: count(suburbs.len()),
                })
                .collect(),
        })
    }

    fn loaded_at(&self) -> Result<Option<String>, DbError> {
        Ok(self.read()?.loaded_at.clone())
    }
}

impl GazetteerStore for MemoryGazetteer {
    fn clear(&self) -> Result<(), DbError> {
        self.inner.write().map_err(|_| DbError::Poisoned)?.records.clear();
        Ok(())
    }

    fn insert(&self, records: &[NameRecord]) -> Result<usize, DbError> {
        self.inner
            .write()
            .map_err(|_| DbError::Poisoned)?
            .records
            .extend_from_slice(records);
        Ok(records.len())
    }

    fn mark_loaded(&self) -> Result<(), DbError> {
        self.inner.write().map_err(|_| DbError::Poisoned)?.loaded_at =
            Some(chrono::Utc::now().to_rfc3339());
        Ok(())
    }
}
