//! LGA membership and proximity tools.

use std::collections::{BTreeMap, BTreeSet};

use postcodes_database::Gazetteer;
use postcodes_gazetteer_models::{NameRecord, ProximityResult, State};
use postcodes_spatial::round_km;
use postcodes_tools_models::{
    CenterInfo, CenterKind, LgaSuburbsResult, NearbySuburb, NeighborsParams, NeighborsResult,
    RadiusParams, RadiusResult, ServiceConfig, SuburbLga, SuburbLgaParams, SuburbLgaResult,
    SuburbSummary, SuburbsInLgaParams,
};

use crate::{ToolError, is_postcode, parse_state, required};

const DEFAULT_NEIGHBORS: usize = 10;
const MAX_NEIGHBORS: i64 = 50;

/// Collapses records into one summary per (name, state), sorted by name.
pub(crate) fn summarize(records: &[NameRecord]) -> Vec<SuburbSummary> {
    let mut groups: BTreeMap<(&str, State), SuburbSummary> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.name.as_str(), record.state))
            .or_insert_with(|| SuburbSummary {
                suburb: record.name.clone(),
                state: record.state,
                postcodes: Vec::new(),
                lga_name: None,
                region: None,
            });
        if !entry.postcodes.contains(&record.postcode) {
            entry.postcodes.push(record.postcode.clone());
        }
        if entry.lga_name.is_none() {
            entry.lga_name.clone_from(&record.lga_name);
        }
        if entry.region.is_none() {
            entry.region.clone_from(&record.region);
        }
    }
    groups
        .into_values()
        .map(|mut summary| {
            summary.postcodes.sort();
            summary
        })
        .collect()
}

pub(crate) fn unique_postcodes(records: &[NameRecord]) -> usize {
    records
        .iter()
        .map(|r| r.postcode.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Lists the localities of every LGA whose name contains the query.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if no LGA matches
pub fn suburbs_in_lga(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &SuburbsInLgaParams,
) -> Result<LgaSuburbsResult, ToolError> {
    let query = required(&params.lga_name, "lgaName")?;
    let state = parse_state(params.state.as_deref())?;

    let records = db.search_lga(query, state)?;
    if records.is_empty() {
        return Err(ToolError::not_found(
            format!("No LGA found matching '{query}'"),
            "Please check the LGA name or try a partial match",
        ));
    }

    let lga_names_found: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.lga_name.as_deref())
        .collect();
    let suburbs = summarize(&records);

    Ok(LgaSuburbsResult {
        query: query.to_string(),
        lga_names_found: lga_names_found.into_iter().map(ToString::to_string).collect(),
        suburb_count: suburbs.len(),
        total_postcodes: unique_postcodes(&records),
        suburbs,
    })
}

/// Finds the LGAs a locality belongs to, in postcode order.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if the locality does not exist
pub fn get_suburb_lga(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &SuburbLgaParams,
) -> Result<SuburbLgaResult, ToolError> {
    let suburb = required(&params.suburb, "suburb")?;
    let state = parse_state(params.state.as_deref())?;

    let records = db.lookup_exact(suburb, state)?;
    if records.is_empty() {
        return Err(ToolError::not_found(
            format!("Suburb '{suburb}' not found"),
            "Please check the spelling or use fuzzy_match_suburb",
        ));
    }

    let mut all_lgas: Vec<SuburbLga> = Vec::new();
    for record in &records {
        let Some(lga_name) = record.lga_name.as_ref().filter(|n| !n.is_empty()) else {
            continue;
        };
        let existing = all_lgas.iter_mut().find(|l| {
            l.lga_name == *lga_name && l.lga_code == record.lga_code && l.state == record.state
        });
        match existing {
            Some(lga) => {
                if !lga.postcodes.contains(&record.postcode) {
                    lga.postcodes.push(record.postcode.clone());
                    lga.postcodes.sort();
                }
            }
            None => all_lgas.push(SuburbLga {
                lga_name: lga_name.clone(),
                lga_code: record.lga_code.clone(),
                state: record.state,
                postcodes: vec![record.postcode.clone()],
            }),
        }
    }

    Ok(SuburbLgaResult {
        suburb: suburb.to_string(),
        primary_lga: all_lgas.first().cloned(),
        multiple_lgas: all_lgas.len() > 1,
        all_lgas,
    })
}

fn center_from(kind: CenterKind, record: &NameRecord) -> Option<CenterInfo> {
    let (latitude, longitude) = record.coordinates()?;
    Some(CenterInfo {
        kind,
        suburb: record.name.clone(),
        postcode: record.postcode.clone(),
        state: record.state,
        latitude,
        longitude,
        lga_name: record.lga_name.clone(),
    })
}

/// Resolves a postcode or locality name to the first matching record that
/// has coordinates.
fn resolve_center(
    db: &dyn Gazetteer,
    location: &str,
    state: Option<State>,
) -> Result<CenterInfo, ToolError> {
    let (kind, records) = if is_postcode(location) {
        (CenterKind::Postcode, db.lookup_postcode(location)?)
    } else {
        (CenterKind::Suburb, db.lookup_exact(location, state)?)
    };

    if records.is_empty() {
        return Err(ToolError::not_found(
            format!("Location '{location}' not found"),
            "Please check the location name or postcode",
        ));
    }

    records
        .iter()
        .find_map(|r| center_from(kind, r))
        .ok_or_else(|| ToolError::MissingCoordinates(location.to_string()))
}

fn nearby(result: ProximityResult, center_lga: Option<&str>) -> NearbySuburb {
    let same_lga = center_lga.is_some_and(|lga| result.lga_name.as_deref() == Some(lga));
    NearbySuburb {
        suburb: result.name,
        state: result.state,
        postcodes: result.postcodes.into_iter().collect(),
        distance_km: round_km(result.distance_km, 1),
        lga_name: result.lga_name,
        same_lga,
    }
}

/// Lists localities within a radius of a postcode or locality, nearest
/// first.
///
/// # Errors
///
/// * [`ToolError::InvalidRadius`] if the radius is not in `(0, max]`
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if the center does not exist
/// * [`ToolError::MissingCoordinates`] if the center has no coordinates
pub fn suburbs_within_radius(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &RadiusParams,
) -> Result<RadiusResult, ToolError> {
    let location = required(&params.postcode_or_suburb, "postcodeOrSuburb")?;
    let radius_km = params.radius_km.unwrap_or(config.default_radius_km);
    if !(radius_km > 0.0 && radius_km <= config.max_radius_km) {
        return Err(ToolError::InvalidRadius {
            radius_km,
            max_km: config.max_radius_km,
        });
    }
    let state = parse_state(params.state.as_deref())?;

    let center = resolve_center(db, location, state)?;
    let records = db.all_records_with_coordinates(state)?;
    let found = postcodes_spatial::search(&records, center.latitude, center.longitude, radius_km)?;

    let suburbs: Vec<NearbySuburb> = found
        .into_iter()
        .take(config.max_results)
        .map(|r| nearby(r, center.lga_name.as_deref()))
        .collect();

    Ok(RadiusResult {
        center,
        radius_km,
        suburb_count: suburbs.len(),
        suburbs,
    })
}

/// Lists the nearest other localities within the neighbour radius.
///
/// `max_neighbors` outside `1..=50` becomes 10.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if the locality does not exist
/// * [`ToolError::MissingCoordinates`] if it has no coordinates
pub fn find_neighbors(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &NeighborsParams,
) -> Result<NeighborsResult, ToolError> {
    let suburb = required(&params.suburb, "suburb")?;
    let state = parse_state(params.state.as_deref())?;
    let max_neighbors = params
        .max_neighbors
        .filter(|n| (1..=MAX_NEIGHBORS).contains(n))
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_NEIGHBORS);

    let records = db.lookup_exact(suburb, state)?;
    if records.is_empty() {
        return Err(ToolError::not_found(
            format!("Suburb '{suburb}' not found"),
            "Please check the spelling or use fuzzy_match_suburb",
        ));
    }
    let center = records
        .iter()
        .find_map(|r| center_from(CenterKind::Suburb, r))
        .ok_or_else(|| ToolError::MissingCoordinates(suburb.to_string()))?;

    let radius_km = config.neighbor_radius_km;
    let candidates = db.all_records_with_coordinates(None)?;
    let found = postcodes_spatial::search(&candidates, center.latitude, center.longitude, radius_km)?;

    let neighbors: Vec<NearbySuburb> = found
        .into_iter()
        .filter(|r| !r.name.eq_ignore_ascii_case(suburb))
        .take(max_neighbors)
        .map(|r| nearby(r, center.lga_name.as_deref()))
        .collect();

    Ok(NeighborsResult {
        query_suburb: center,
        neighbor_count: neighbors.len(),
        neighbors,
        search_radius_km: radius_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn config() -> ServiceConfig {
        ServiceConfig::default()
    }

    fn names(suburbs: &[NearbySuburb]) -> Vec<&str> {
        suburbs.iter().map(|s| s.suburb.as_str()).collect()
    }

    #[test]
    fn lga_listing() {
        let result = suburbs_in_lga(
            &fixture::gazetteer(),
            &config(),
            &SuburbsInLgaParams {
                lga_name: "sydney".to_string(),
                state: None,
            },
        )
        .unwrap();
        let suburbs: Vec<&str> = result.suburbs.iter().map(|s| s.suburb.as_str()).collect();
        assert_eq!(suburbs, vec!["Haymarket", "Surry Hills", "Sydney", "The Rocks"]);
        assert_eq!(result.suburb_count, 4);
        assert_eq!(result.total_postcodes, 2);
        assert_eq!(result.lga_names_found, vec!["Sydney"]);
    }

    #[test]
    fn unknown_lga() {
        let result = suburbs_in_lga(
            &fixture::gazetteer(),
            &config(),
            &SuburbsInLgaParams {
                lga_name: "Atlantis".to_string(),
                state: None,
            },
        );
        assert!(matches!(result, Err(ToolError::NotFound { .. })));
    }

    #[test]
    fn single_lga_collects_postcodes() {
        let result = get_suburb_lga(
            &fixture::gazetteer(),
            &config(),
            &SuburbLgaParams {
                suburb: "Melbourne".to_string(),
                state: None,
            },
        )
        .unwrap();
        assert!(!result.multiple_lgas);
        let primary = result.primary_lga.unwrap();
        assert_eq!(primary.lga_name, "Melbourne");
        assert_eq!(primary.postcodes, vec!["3000", "3004"]);
    }

    #[test]
    fn name_spanning_lgas() {
        let result = get_suburb_lga(
            &fixture::gazetteer(),
            &config(),
            &SuburbLgaParams {
                suburb: "Newtown".to_string(),
                state: None,
            },
        )
        .unwrap();
        assert!(result.multiple_lgas);
        let lgas: Vec<&str> = result.all_lgas.iter().map(|l| l.lga_name.as_str()).collect();
        assert_eq!(lgas, vec!["Inner West", "Greater Geelong"]);
    }

    fn radius(location: &str, radius_km: Option<f64>) -> Result<RadiusResult, ToolError> {
        suburbs_within_radius(
            &fixture::gazetteer(),
            &config(),
            &RadiusParams {
                postcode_or_suburb: location.to_string(),
                radius_km,
                state: None,
            },
        )
    }

    #[test]
    fn radius_from_postcode() {
        let result = radius("2000", Some(2.0)).unwrap();
        assert_eq!(result.center.kind, CenterKind::Postcode);
        assert_eq!(result.center.suburb, "Haymarket");
        assert_eq!(names(&result.suburbs), vec!["Haymarket", "Surry Hills", "Sydney"]);
        let distances: Vec<f64> = result.suburbs.iter().map(|s| s.distance_km).collect();
        assert_eq!(distances, vec![0.0, 0.8, 1.4]);
    }

    #[test]
    fn radius_defaults_to_configured_value() {
        let result = radius("Sydney", None).unwrap();
        assert!((result.radius_km - 10.0).abs() < f64::EPSILON);
        assert!(names(&result.suburbs).contains(&"Newtown"));
        assert!(!names(&result.suburbs).contains(&"Parramatta"));
    }

    #[test]
    fn radius_bounds() {
        assert!(matches!(
            radius("2000", Some(0.0)),
            Err(ToolError::InvalidRadius { .. })
        ));
        assert!(matches!(
            radius("2000", Some(600.0)),
            Err(ToolError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn radius_center_without_coordinates() {
        assert!(matches!(
            radius("Hobart", Some(5.0)),
            Err(ToolError::MissingCoordinates(_))
        ));
        assert!(matches!(
            radius("Atlantis", Some(5.0)),
            Err(ToolError::NotFound { .. })
        ));
    }

    fn neighbors(max_neighbors: Option<i64>) -> NeighborsResult {
        find_neighbors(
            &fixture::gazetteer(),
            &config(),
            &NeighborsParams {
                suburb: "sydney".to_string(),
                state: None,
                max_neighbors,
            },
        )
        .unwrap()
    }

    #[test]
    fn neighbors_exclude_the_query_and_flag_shared_lga() {
        let result = neighbors(None);
        assert_eq!(
            names(&result.neighbors),
            vec!["The Rocks", "Haymarket", "Surry Hills", "Newtown"]
        );
        let same: Vec<bool> = result.neighbors.iter().map(|n| n.same_lga).collect();
        assert_eq!(same, vec![true, true, true, false]);
        assert!((result.search_radius_km - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn neighbor_limit() {
        assert_eq!(neighbors(Some(2)).neighbor_count, 2);
        assert_eq!(neighbors(Some(0)).neighbor_count, 4);
        assert_eq!(neighbors(Some(51)).neighbor_count, 4);
    }
}
