#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Proximity search over locality coordinates.
//!
//! Records are pre-filtered with a cheap latitude/longitude bounding box,
//! then measured with the spherical law of cosines and grouped so each
//! (locality, state) pair appears once at its minimum distance with the
//! union of its postcodes.
//!
//! [`search`] scans a slice; [`ProximityIndex`] answers the same query from
//! an R-tree built once over the directory.

mod index;

use std::collections::{BTreeMap, BTreeSet};

use postcodes_gazetteer_models::{NameRecord, ProximityResult, State};

pub use index::ProximityIndex;

/// Mean Earth radius used for distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate kilometres per degree of latitude, used for the bounding box.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Records this close beyond the radius still count as inside it.
const BOUNDARY_TOLERANCE_KM: f64 = 1e-9;

/// Below this, the longitude span is treated as unbounded.
const MIN_LON_DIVISOR: f64 = 1e-9;

/// Errors from proximity search.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProximityError {
    /// Radius was zero, negative, or not finite.
    #[error("Radius must be positive, got {0}")]
    InvalidRadius(f64),

    /// The search center has no usable coordinates.
    #[error("Search center has no coordinates")]
    MissingCoordinates,
}

/// A latitude/longitude rectangle that contains every point within a radius
/// of its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Builds the box around a center.
    ///
    /// The longitude span widens with latitude. At a pole, or when the span
    /// would cross the antimeridian, the longitude span is unbounded and
    /// only the distance check filters by longitude.
    #[must_use]
    pub fn around(center_lat: f64, center_lon: f64, radius_km: f64) -> Self {
        let lat_range = radius_km / KM_PER_DEGREE;
        let divisor = KM_PER_DEGREE * center_lat.to_radians().cos();

        let lon_range = (divisor > MIN_LON_DIVISOR).then(|| radius_km / divisor);
        let (min_lon, max_lon) = match lon_range {
            Some(range) if center_lon - range >= -180.0 && center_lon + range <= 180.0 => {
                (center_lon - range, center_lon + range)
            }
            _ => (f64::MIN, f64::MAX),
        };

        Self {
            min_lat: center_lat - lat_range,
            max_lat: center_lat + lat_range,
            min_lon,
            max_lon,
        }
    }

    /// Whether the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Great-circle distance in kilometres (spherical law of cosines).
#[must_use]
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (rlat1, rlat2) = (lat1.to_radians(), lat2.to_radians());
    let dlon = lon2.to_radians() - lon1.to_radians();

    let cosine = rlat1
        .cos()
        .mul_add(rlat2.cos() * dlon.cos(), rlat1.sin() * rlat2.sin())
        .clamp(-1.0, 1.0);

    EARTH_RADIUS_KM * cosine.acos()
}

/// Rounds a distance to `decimals` places for display.
#[must_use]
pub fn round_km(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn validate(center_lat: f64, center_lon: f64, radius_km: f64) -> Result<(), ProximityError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ProximityError::InvalidRadius(radius_km));
    }
    if !center_lat.is_finite() || !center_lon.is_finite() {
        return Err(ProximityError::MissingCoordinates);
    }
    Ok(())
}

/// A record inside the radius, with its position in the directory.
struct Hit<'a> {
    index: usize,
    record: &'a NameRecord,
    distance_km: f64,
}

/// Measures one record, returning a hit when it lies inside the radius.
fn measure<'a>(
    index: usize,
    record: &'a NameRecord,
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> Option<Hit<'a>> {
    let (lat, lon) = record.coordinates()?;
    let distance_km = great_circle_distance_km(center_lat, center_lon, lat, lon);
    (distance_km <= radius_km + BOUNDARY_TOLERANCE_KM).then_some(Hit {
        index,
        record,
        distance_km,
    })
}

/// Groups hits by (name, state) and sorts by distance, then name, then
/// state. The LGA of a group is the first non-empty one in directory order.
fn assemble(mut hits: Vec<Hit<'_>>) -> Vec<ProximityResult> {
    hits.sort_by_key(|hit| hit.index);

    let mut groups: BTreeMap<(&str, State), ProximityResult> = BTreeMap::new();

    for hit in hits {
        let record = hit.record;
        let group = groups
            .entry((record.name.as_str(), record.state))
            .or_insert_with(|| ProximityResult {
                name: record.name.clone(),
                state: record.state,
                postcodes: BTreeSet::new(),
                distance_km: hit.distance_km,
                lga_name: None,
            });

        group.postcodes.insert(record.postcode.clone());
        if hit.distance_km < group.distance_km {
            group.distance_km = hit.distance_km;
        }
        if group.lga_name.is_none() {
            group.lga_name = record.lga_name.clone().filter(|lga| !lga.is_empty());
        }
    }

    let mut results: Vec<ProximityResult> = groups.into_values().collect();
    results.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.state.cmp(&b.state))
    });
    results
}

/// Finds every locality within `radius_km` of the center.
///
/// Records lacking either coordinate are skipped. An empty result is not an
/// error.
///
/// # Errors
///
/// * [`ProximityError::InvalidRadius`] if `radius_km` is not a positive
///   finite number
/// * [`ProximityError::MissingCoordinates`] if the center is not finite
pub fn search(
    records: &[NameRecord],
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> Result<Vec<ProximityResult>, ProximityError> {
    validate(center_lat, center_lon, radius_km)?;

    let bbox = BoundingBox::around(center_lat, center_lon, radius_km);

    let hits: Vec<Hit<'_>> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            record
                .coordinates()
                .is_some_and(|(lat, lon)| bbox.contains(lat, lon))
        })
        .filter_map(|(index, record)| measure(index, record, center_lat, center_lon, radius_km))
        .collect();

    log::debug!(
        "Proximity search ({center_lat}, {center_lon}) r={radius_km}km: {} row(s) in range",
        hits.len()
    );

    Ok(assemble(hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, state: State, postcode: &str, lat: f64, lon: f64) -> NameRecord {
        NameRecord::new(name, state, postcode).with_coordinates(lat, lon)
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((-33.8688, 151.2093), (-37.8136, 144.9631)),
            ((-27.4698, 153.0251), (-31.9505, 115.8605)),
            ((0.0, 0.0), (0.0, 1.0)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = great_circle_distance_km(lat1, lon1, lat2, lon2);
            let ba = great_circle_distance_km(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-6);
        }
    }

    #[test]
    fn distance_sydney_to_melbourne() {
        let d = great_circle_distance_km(-33.8688, 151.2093, -37.8136, 144.9631);
        assert!((d - 713.4).abs() < 2.0, "distance was {d}");
        assert!(great_circle_distance_km(-33.0, 151.0, -33.0, 151.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_bad_radius() {
        let records = [record("Sydney", State::Nsw, "2000", -33.8688, 151.2093)];
        assert_eq!(
            search(&records, -33.0, 151.0, 0.0),
            Err(ProximityError::InvalidRadius(0.0))
        );
        assert!(matches!(
            search(&records, -33.0, 151.0, -5.0),
            Err(ProximityError::InvalidRadius(_))
        ));
        assert!(matches!(
            search(&records, -33.0, 151.0, f64::NAN),
            Err(ProximityError::InvalidRadius(_))
        ));
    }

    #[test]
    fn rejects_non_finite_center() {
        assert_eq!(
            search(&[], f64::NAN, 151.0, 10.0),
            Err(ProximityError::MissingCoordinates)
        );
    }

    #[test]
    fn radius_boundary() {
        let target = record("Edge", State::Nsw, "2999", -33.9, 151.3);
        let d = great_circle_distance_km(-33.8, 151.2, -33.9, 151.3);
        let records = [target];

        let inside = search(&records, -33.8, 151.2, d).unwrap();
        assert_eq!(inside.len(), 1);

        let outside = search(&records, -33.8, 151.2, d - 0.001).unwrap();
        assert!(outside.is_empty());
    }

    #[test]
    fn groups_by_name_and_state() {
        let records = [
            record("Paddington", State::Nsw, "2021", -33.884, 151.231),
            record("Paddington", State::Nsw, "2022", -33.890, 151.240),
            record("Paddington", State::Qld, "4064", -27.459, 153.000),
            record("Bondi", State::Nsw, "2026", -33.891, 151.274),
        ];
        let results = search(&records, -33.884, 151.231, 10.0).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Paddington");
        assert_eq!(results[0].state, State::Nsw);
        assert!(results[0].distance_km < 1e-3);
        assert_eq!(
            results[0].postcodes.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["2021", "2022"]
        );
        assert_eq!(results[1].name, "Bondi");
    }

    #[test]
    fn sorted_by_distance() {
        let records = [
            record("Far", State::Vic, "3001", -37.90, 145.10),
            record("Near", State::Vic, "3000", -37.82, 144.97),
            record("Middle", State::Vic, "3002", -37.85, 145.00),
        ];
        let results = search(&records, -37.8136, 144.9631, 50.0).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Middle", "Far"]);
    }

    #[test]
    fn skips_records_without_coordinates() {
        let records = [
            NameRecord::new("Nowhere", State::Sa, "5000"),
            record("Adelaide", State::Sa, "5000", -34.9285, 138.6007),
        ];
        let results = search(&records, -34.9285, 138.6007, 5.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Adelaide");
    }

    #[test]
    fn zero_latitude_keeps_eastward_records() {
        let records = [
            record("East", State::Nt, "0800", 0.0, 151.3),
            record("West", State::Nt, "0801", 0.0, 150.8),
        ];
        let results = search(&records, 0.0, 151.0, 50.0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "West");
        assert_eq!(results[1].name, "East");
    }

    #[test]
    fn pole_has_no_longitude_bound() {
        let bbox = BoundingBox::around(90.0, 0.0, 10.0);
        assert!(bbox.contains(89.95, 179.0));
        assert!(bbox.contains(89.95, -179.0));
    }

    #[test]
    fn finds_records_across_the_antimeridian() {
        let bbox = BoundingBox::around(-16.0, 179.9, 20.0);
        assert!(bbox.contains(-16.0, -179.95));

        let records = [
            record("Dateline", State::Nt, "0880", -16.0, -179.95),
            record("Faraway", State::Nt, "0881", -16.0, -170.0),
        ];
        let results = search(&records, -16.0, 179.9, 20.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Dateline");
        assert!(results[0].distance_km < 20.0);
    }

    #[test]
    fn bounded_away_from_the_antimeridian() {
        let bbox = BoundingBox::around(-33.8688, 151.2093, 10.0);
        assert!(bbox.min_lon > 151.0 && bbox.max_lon < 151.4);
        assert!(!bbox.contains(-33.8688, -151.2093));
    }

    #[test]
    fn lga_is_first_non_empty_in_directory_order() {
        let records = [
            record("Carlton", State::Vic, "3053", -37.800, 144.967),
            record("Carlton", State::Vic, "3054", -37.801, 144.968).with_lga("Melbourne"),
            record("Carlton", State::Vic, "3055", -37.802, 144.969).with_lga("Yarra"),
        ];
        let results = search(&records, -37.800, 144.967, 5.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lga_name.as_deref(), Some("Melbourne"));
    }

    #[test]
    fn rounds_for_display() {
        assert!((round_km(12.345, 1) - 12.3).abs() < 1e-9);
        assert!((round_km(12.355, 2) - 12.36).abs() < 1e-3);
        assert!((round_km(7.96, 0) - 8.0).abs() < 1e-9);
    }
}
