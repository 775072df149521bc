//! R-tree index over locality coordinates.

use geo::Point;
use postcodes_gazetteer_models::{NameRecord, ProximityResult};
use rstar::{AABB, RTree, RTreeObject};

use crate::{BoundingBox, Hit, ProximityError, assemble, measure, validate};

/// A located record stored in the R-tree with its directory position.
struct RecordEntry {
    index: usize,
    position: Point<f64>,
    record: NameRecord,
}

impl RTreeObject for RecordEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x(), self.position.y()])
    }
}

/// Pre-built spatial index over every record that has coordinates.
///
/// Built once from the directory and answers [`crate::search`] queries
/// without scanning every record. Results are identical to the slice scan
/// over the same records in the same order.
pub struct ProximityIndex {
    tree: RTree<RecordEntry>,
}

impl ProximityIndex {
    /// Builds the index. Records lacking either coordinate are dropped.
    #[must_use]
    pub fn new(records: Vec<NameRecord>) -> Self {
        let entries: Vec<RecordEntry> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let (lat, lon) = record.coordinates()?;
                Some(RecordEntry {
                    index,
                    position: Point::new(lon, lat),
                    record,
                })
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!("Built proximity index over {} record(s)", tree.size());

        Self { tree }
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds every locality within `radius_km` of the center.
    ///
    /// # Errors
    ///
    /// Same as [`crate::search`].
    pub fn search(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Result<Vec<ProximityResult>, ProximityError> {
        validate(center_lat, center_lon, radius_km)?;

        let bbox = BoundingBox::around(center_lat, center_lon, radius_km);
        let envelope = AABB::from_corners([bbox.min_lon, bbox.min_lat], [bbox.max_lon, bbox.max_lat]);

        let hits: Vec<Hit<'_>> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|entry| {
                measure(
                    entry.index,
                    &entry.record,
                    center_lat,
                    center_lon,
                    radius_km,
                )
            })
            .collect();

        Ok(assemble(hits))
    }
}
