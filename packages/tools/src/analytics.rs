//! Statistics, LGA listings, region search, and health.

use std::collections::{BTreeMap, BTreeSet};

use postcodes_database::Gazetteer;
use postcodes_gazetteer_models::{GazetteerStatistics, State, StateCounts};
use postcodes_tools_models::{
    Coverage, Health, HealthReport, LgaSummary, ListLgasParams, ListLgasResult,
    NationalStatistics, RegionResult, SearchRegionParams, ServiceConfig, StateStatsParams,
    StateStatsResult, StateSummary,
};

use crate::location::{summarize, unique_postcodes};
use crate::{ToolError, parse_state, required};

fn state_summary(counts: &StateCounts) -> StateSummary {
    StateSummary {
        state: counts.state,
        state_name: counts.state.name().to_string(),
        postcodes: counts.postcodes,
        suburbs: counts.suburbs,
    }
}

const fn national(stats: &GazetteerStatistics) -> NationalStatistics {
    NationalStatistics {
        total_records: stats.total_records,
        unique_postcodes: stats.unique_postcodes,
        unique_suburbs: stats.unique_suburbs,
        unique_lgas: stats.unique_lgas,
    }
}

/// Counts for one state, with its LGA names, or for every state.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state is not recognized
/// * [`ToolError::NotFound`] if the state has no data
pub fn state_stats(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &StateStatsParams,
) -> Result<StateStatsResult, ToolError> {
    let state = parse_state(params.state.as_deref())?;
    let stats = db.statistics()?;

    let Some(state) = state else {
        let mut by_state: Vec<StateSummary> = stats.by_state.iter().map(state_summary).collect();
        by_state.sort_by(|a, b| a.state.as_ref().cmp(b.state.as_ref()));
        return Ok(StateStatsResult::National {
            national: national(&stats),
            by_state,
        });
    };

    let counts = stats
        .by_state
        .iter()
        .find(|c| c.state == state)
        .ok_or_else(|| {
            ToolError::not_found(
                format!("No data found for state: {state}"),
                "Load the postcode data or try another state",
            )
        })?;

    let lga_list: Vec<String> = db
        .all_lgas(Some(state))?
        .into_iter()
        .map(|l| l.lga_name)
        .collect();

    Ok(StateStatsResult::State {
        summary: state_summary(counts),
        total_lgas: lga_list.len(),
        lga_list,
    })
}

/// Lists LGAs sorted by name, optionally with locality counts.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if no LGA data is loaded
pub fn list_lgas(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &ListLgasParams,
) -> Result<ListLgasResult, ToolError> {
    let state = parse_state(params.state.as_deref())?;
    let lgas = db.all_lgas(state)?;

    if lgas.is_empty() {
        return Err(ToolError::not_found(
            "No LGAs found",
            "The loaded data may not contain LGA information",
        ));
    }

    let mut summaries: Vec<LgaSummary> = lgas
        .into_iter()
        .map(|lga| LgaSummary {
            state_name: lga.state.name().to_string(),
            suburb_count: params.include_suburbs_count.then_some(lga.suburb_count),
            lga_name: lga.lga_name,
            lga_code: lga.lga_code,
            state: lga.state,
        })
        .collect();
    summaries.sort_by(|a, b| {
        a.lga_name
            .cmp(&b.lga_name)
            .then_with(|| a.state.as_ref().cmp(b.state.as_ref()))
    });

    let lgas_by_state = state.is_none().then(|| {
        let mut grouped: BTreeMap<State, Vec<LgaSummary>> = BTreeMap::new();
        for summary in &summaries {
            grouped.entry(summary.state).or_default().push(summary.clone());
        }
        grouped
    });

    Ok(ListLgasResult {
        total_lgas: summaries.len(),
        lgas: summaries,
        lgas_by_state,
    })
}

/// Lists localities whose region name contains the query, falling back to
/// SA3/SA4 names when no region matches.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if neither region nor statistical area matches
pub fn search_region(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &SearchRegionParams,
) -> Result<RegionResult, ToolError> {
    let query = required(&params.region, "region")?;
    let state = parse_state(params.state.as_deref())?;

    let mut records = db.search_region(query, state)?;
    let statistical = records.is_empty();
    if statistical {
        log::debug!("search_region: no region matches {query:?}, trying SA3/SA4 names");
        records = db.search_statistical_area(query, state)?;
    }

    if records.is_empty() {
        return Err(ToolError::not_found(
            format!("No region found matching '{query}'"),
            "Try a different region name or check spelling",
        ));
    }

    let mut regions_found = BTreeSet::new();
    for record in &records {
        regions_found.extend(record.region.iter().cloned());
        if statistical {
            regions_found.extend(record.sa3_name.iter().cloned());
            regions_found.extend(record.sa4_name.iter().cloned());
        }
    }

    let suburbs = summarize(&records);

    Ok(RegionResult {
        query: query.to_string(),
        regions_found: regions_found.into_iter().collect(),
        suburb_count: suburbs.len(),
        total_postcodes: unique_postcodes(&records),
        suburbs,
    })
}

/// Reports whether the directory is queryable and loaded.
///
/// Never fails: a store error is reported as [`Health::Unhealthy`].
#[must_use]
pub fn check_health(db: &dyn Gazetteer, _config: &ServiceConfig) -> HealthReport {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let stats = match db.statistics() {
        Ok(stats) => stats,
        Err(e) => {
            log::warn!("Health check failed: {e}");
            return HealthReport {
                health: Health::Unhealthy,
                message: "Directory could not be queried".to_string(),
                timestamp,
                loaded_at: None,
                statistics: None,
                coverage: None,
                error: Some(e.to_string()),
            };
        }
    };

    let states: Vec<State> = stats
        .by_state
        .iter()
        .map(|c| c.state)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let coverage = Coverage {
        state_count: states.len(),
        all_states_covered: states.len() == State::all().len(),
        states,
    };

    let (health, message) = if stats.total_records > 0 {
        (Health::Healthy, "All systems operational")
    } else {
        (Health::NeedsData, "Directory is empty, run the loader")
    };

    HealthReport {
        health,
        message: message.to_string(),
        timestamp,
        loaded_at: db.loaded_at().ok().flatten(),
        statistics: Some(national(&stats)),
        coverage: Some(coverage),
        error: None,
    }
}
