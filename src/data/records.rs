use std::{fs::File, io::Read, path::Path};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    config::ColumnNames,
    foundation::{
        core::GeoPoint,
        error::{GeoTrailError, GeoTrailResult},
    },
};

/// One assignment span of one entity at one location.
///
/// Several records with the same `entity_id` form that entity's career path.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementRecord {
    pub entity_id: String,
    pub location_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Coordinates reported on this row; only the registry reads them.
    pub position: GeoPoint,
    /// 0-based position in the input dataset.
    pub row: usize,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

struct ColumnIndex {
    entity_id: usize,
    location_name: usize,
    start_date: usize,
    end_date: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, names: &ColumnNames) -> GeoTrailResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    GeoTrailError::data_integrity(format!(
                        "dataset is missing required column '{name}'"
                    ))
                })
        };

        Ok(Self {
            entity_id: find(&names.entity_id)?,
            location_name: find(&names.location_name)?,
            start_date: find(&names.start_date)?,
            end_date: find(&names.end_date)?,
            latitude: find(&names.latitude)?,
            longitude: find(&names.longitude)?,
        })
    }
}

pub fn load_records(path: &Path, names: &ColumnNames) -> GeoTrailResult<Vec<MovementRecord>> {
    let f = File::open(path)
        .map_err(|e| GeoTrailError::io(format!("open dataset '{}': {e}", path.display())))?;
    read_records(f, names)
}

/// Parse a movement CSV. Rows keep their input order.
pub fn read_records<R: Read>(
    reader: R,
    names: &ColumnNames,
) -> GeoTrailResult<Vec<MovementRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| GeoTrailError::io(format!("read dataset header: {e}")))?
        .clone();
    let idx = ColumnIndex::resolve(&headers, names)?;

    let mut out = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let rec = result
            .map_err(|e| GeoTrailError::data_integrity(format!("row {}: {e}", row + 1)))?;
        out.push(parse_row(&rec, &idx, row)?);
    }
    Ok(out)
}

fn parse_row(
    rec: &csv::StringRecord,
    idx: &ColumnIndex,
    row: usize,
) -> GeoTrailResult<MovementRecord> {
    let cell = |i: usize| rec.get(i).unwrap_or("");
    let bad = |what: &str, value: &str| {
        GeoTrailError::data_integrity(format!("row {}: invalid {what} '{value}'", row + 1))
    };

    let entity_id = cell(idx.entity_id);
    if entity_id.is_empty() {
        return Err(bad("entity id", entity_id));
    }
    let location_name = cell(idx.location_name);
    if location_name.is_empty() {
        return Err(bad("location name", location_name));
    }

    let start_raw = cell(idx.start_date);
    let start_date = parse_date(start_raw)
        .ok()
        .flatten()
        .ok_or_else(|| bad("start date", start_raw))?;
    let end_raw = cell(idx.end_date);
    let end_date = parse_date(end_raw).map_err(|_| bad("end date", end_raw))?;

    let lat_raw = cell(idx.latitude);
    let lon_raw = cell(idx.longitude);
    let position = GeoPoint::new(
        parse_coord(lat_raw).ok_or_else(|| bad("latitude", lat_raw))?,
        parse_coord(lon_raw).ok_or_else(|| bad("longitude", lon_raw))?,
    );

    Ok(MovementRecord {
        entity_id: entity_id.to_string(),
        location_name: location_name.to_string(),
        start_date,
        end_date,
        position,
        row,
    })
}

/// Parse a date cell. Blank and `NaT` cells are absent dates.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nat") {
        return Ok(None);
    }

    let mut last_err = None;
    for fmt in DATETIME_FORMATS {
        match NaiveDateTime::parse_from_str(raw, fmt) {
            Ok(dt) => return Ok(Some(dt.date())),
            Err(e) => last_err = Some(e),
        }
    }
    for fmt in DATE_FORMATS {
        match NaiveDate::parse_from_str(raw, fmt) {
            Ok(d) => return Ok(Some(d)),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

fn parse_coord(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
