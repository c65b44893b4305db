use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::foundation::{
    core::{GeoPoint, Rgba8},
    error::{GeoTrailError, GeoTrailResult},
};

/// Rendering options for one run.
///
/// Every field has a default, so a JSON config only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Geographic position mapped to pixel (0, 0).
    pub top_left_anchor: GeoPoint,
    /// Geographic position mapped to pixel (width, height).
    pub bottom_right_anchor: GeoPoint,
    pub marker_color: Rgba8,
    pub transition_color: Rgba8,
    pub trail_color: Rgba8,
    /// Stroke width of historical trail segments.
    pub line_width: u32,
    /// Stroke width of the transition highlighted in the current frame.
    pub transition_width: u32,
    pub marker_radius: u32,
    pub frame_duration_ms: u32,
    pub columns: ColumnNames,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            top_left_anchor: GeoPoint::new(31.0, -87.6),
            bottom_right_anchor: GeoPoint::new(24.5, -80.0),
            marker_color: Rgba8::opaque(255, 165, 0),
            transition_color: Rgba8::opaque(0, 0, 255),
            trail_color: Rgba8::opaque(173, 216, 230),
            line_width: 10,
            transition_width: 12,
            marker_radius: 7,
            frame_duration_ms: 300,
            columns: ColumnNames::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> GeoTrailResult<()> {
        if !self.top_left_anchor.is_finite() || !self.bottom_right_anchor.is_finite() {
            return Err(GeoTrailError::validation("anchor coordinates must be finite"));
        }
        if self.bottom_right_anchor.lon == self.top_left_anchor.lon {
            return Err(GeoTrailError::validation(
                "anchors must span a non-zero longitude range",
            ));
        }
        if self.bottom_right_anchor.lat == self.top_left_anchor.lat {
            return Err(GeoTrailError::validation(
                "anchors must span a non-zero latitude range",
            ));
        }
        if self.line_width == 0 || self.transition_width == 0 {
            return Err(GeoTrailError::validation("line widths must be non-zero"));
        }
        if self.frame_duration_ms == 0 {
            return Err(GeoTrailError::validation("frame duration must be non-zero"));
        }
        self.columns.validate()
    }

    pub fn from_json_file(path: &Path) -> GeoTrailResult<Self> {
        let f = File::open(path).map_err(|e| {
            GeoTrailError::io(format!("open config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config JSON '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Header names of the movement dataset columns.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub entity_id: String,
    pub location_name: String,
    pub start_date: String,
    pub end_date: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            entity_id: "person_nbr".to_string(),
            location_name: "agcy_name".to_string(),
            start_date: "employ_start_date".to_string(),
            end_date: "separation_date".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn validate(&self) -> GeoTrailResult<()> {
        for name in self.all() {
            if name.trim().is_empty() {
                return Err(GeoTrailError::validation("column names must be non-empty"));
            }
        }
        Ok(())
    }

    pub fn all(&self) -> [&str; 6] {
        [
            &self.entity_id,
            &self.location_name,
            &self.start_date,
            &self.end_date,
            &self.latitude,
            &self.longitude,
        ]
    }
}

/// Where a run writes its artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Base map with markers; reused as the first layer of every frame.
    pub template: PathBuf,
    /// Directory receiving the per-event frame files.
    pub frame_dir: PathBuf,
    pub animation: PathBuf,
}

impl PipelinePaths {
    /// Lay out the template and frames under `work_dir`.
    pub fn in_work_dir(work_dir: impl Into<PathBuf>, animation: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            template: work_dir.join("base_map_with_points.png"),
            frame_dir: work_dir.join("frames"),
            animation: animation.into(),
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        frame_file_path(&self.frame_dir, index)
    }
}

pub fn frame_file_path(frame_dir: &Path, index: usize) -> PathBuf {
    frame_dir.join(format!("frame_{index:05}.png"))
}
