use std::collections::BTreeMap;

use crate::{
    data::records::MovementRecord,
    foundation::{
        core::GeoPoint,
        error::{GeoTrailError, GeoTrailResult},
    },
};

#[derive(Clone, Debug, PartialEq)]
pub struct LocationPoint {
    pub location_name: String,
    pub position: GeoPoint,
}

/// Canonical coordinates per location name, frozen once built.
///
/// Keys are unique location names. When rows disagree about a location's coordinates, the first
/// row in input order wins; later rows are ignored without complaint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationRegistry {
    points: BTreeMap<String, LocationPoint>,
}

impl LocationRegistry {
    #[tracing::instrument(skip(records))]
    pub fn build<'a>(records: impl IntoIterator<Item = &'a MovementRecord>) -> Self {
        let mut points = BTreeMap::new();
        for rec in records {
            points
                .entry(rec.location_name.clone())
                .or_insert_with(|| LocationPoint {
                    location_name: rec.location_name.clone(),
                    position: rec.position,
                });
        }
        tracing::info!(locations = points.len(), "location registry built");
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, location_name: &str) -> Option<&LocationPoint> {
        self.points.get(location_name)
    }

    /// Like [`get`](Self::get), but an unknown name is a data-integrity failure.
    pub fn lookup(&self, location_name: &str) -> GeoTrailResult<&LocationPoint> {
        self.get(location_name).ok_or_else(|| {
            GeoTrailError::data_integrity(format!(
                "location '{location_name}' is not in the location registry"
            ))
        })
    }

    /// Points ordered by location name.
    pub fn iter(&self) -> impl Iterator<Item = &LocationPoint> {
        self.points.values()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rec(entity: &str, loc: &str, lat: f64, lon: f64, row: usize) -> MovementRecord {
        MovementRecord {
            entity_id: entity.to_string(),
            location_name: loc.to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            position: GeoPoint::new(lat, lon),
            row,
        }
    }

    #[test]
    fn one_point_per_name_first_row_wins() {
        let records = vec![
            rec("E1", "B", 31.0, -83.0, 0),
            rec("E2", "A", 30.0, -84.0, 1),
            rec("E3", "B", 99.0, 99.0, 2),
            rec("E4", "A", -1.0, -1.0, 3),
        ];
        let reg = LocationRegistry::build(&records);

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("A").unwrap().position, GeoPoint::new(30.0, -84.0));
        assert_eq!(reg.get("B").unwrap().position, GeoPoint::new(31.0, -83.0));
        let names: Vec<_> = reg.iter().map(|p| p.location_name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn lookup_unknown_is_data_integrity_error() {
        let reg = LocationRegistry::build(&[rec("E1", "A", 30.0, -84.0, 0)]);
        assert!(reg.lookup("A").is_ok());
        let err = reg.lookup("C").unwrap_err();
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("'C'"));
    }

    #[test]
    fn empty_input_gives_empty_registry() {
        let reg = LocationRegistry::build(std::iter::empty());
        assert!(reg.is_empty());
    }
}
