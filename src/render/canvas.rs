use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::{
    config::RenderConfig,
    data::registry::LocationRegistry,
    encode::png::{load_rgba, save_png},
    foundation::{core::Canvas, error::GeoTrailResult},
    render::{projection::Projector, raster::fill_circle},
};

/// Background raster with every location marker stamped on it.
///
/// Frames start from a clone of `image`; the template itself is never drawn on again.
#[derive(Clone, Debug)]
pub struct BaseCanvas {
    pub image: RgbaImage,
    pub projector: Projector,
    /// Where the template was persisted, if it was.
    pub path: Option<PathBuf>,
    /// Locations whose marker center projects outside the raster.
    pub off_canvas: usize,
}

impl BaseCanvas {
    pub fn canvas(&self) -> Canvas {
        self.projector.canvas
    }
}

/// Stamp one filled marker per registered location.
pub fn stamp_markers(
    img: &mut RgbaImage,
    registry: &LocationRegistry,
    projector: &Projector,
    cfg: &RenderConfig,
) {
    for point in registry.iter() {
        let center = projector.project(point.position);
        fill_circle(img, center, cfg.marker_radius, cfg.marker_color);
    }
}

/// Stamp markers onto an already decoded background.
pub fn compose_base(
    background: RgbaImage,
    registry: &LocationRegistry,
    cfg: &RenderConfig,
) -> GeoTrailResult<BaseCanvas> {
    cfg.validate()?;
    let (width, height) = background.dimensions();
    let projector = Projector::new(cfg, Canvas::new(width, height)?);

    let mut image = background;
    stamp_markers(&mut image, registry, &projector, cfg);

    let off_canvas = registry
        .iter()
        .filter(|p| !projector.canvas.contains(projector.project(p.position)))
        .count();
    if off_canvas > 0 {
        tracing::warn!(
            off_canvas,
            locations = registry.len(),
            "some locations fall outside the map anchors"
        );
    }

    Ok(BaseCanvas {
        image,
        projector,
        path: None,
        off_canvas,
    })
}

/// Load the background at `raster_path`, stamp markers, and persist the result to
/// `template_path`.
#[tracing::instrument(skip(registry, cfg))]
pub fn build_base(
    raster_path: &Path,
    registry: &LocationRegistry,
    cfg: &RenderConfig,
    template_path: &Path,
) -> GeoTrailResult<BaseCanvas> {
    let background = load_rgba(raster_path)?;
    let mut base = compose_base(background, registry, cfg)?;
    save_png(&base.image, template_path)?;
    base.path = Some(template_path.to_path_buf());

    let canvas = base.canvas();
    tracing::info!(
        width = canvas.width,
        height = canvas.height,
        markers = registry.len(),
        template = %template_path.display(),
        "base canvas written"
    );
    Ok(base)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        data::records::MovementRecord,
        foundation::{core::GeoPoint, error::GeoTrailError},
    };

    const BG: image::Rgba<u8> = image::Rgba([240, 240, 240, 255]);

    fn cfg() -> RenderConfig {
        RenderConfig {
            top_left_anchor: GeoPoint::new(32.0, -85.0),
            bottom_right_anchor: GeoPoint::new(29.0, -82.0),
            marker_radius: 2,
            ..RenderConfig::default()
        }
    }

    fn registry() -> LocationRegistry {
        let rec = |loc: &str, lat: f64, lon: f64| MovementRecord {
            entity_id: "E1".to_string(),
            location_name: loc.to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            position: GeoPoint::new(lat, lon),
            row: 0,
        };
        LocationRegistry::build(&[
            rec("A", 31.0, -84.0),
            rec("B", 30.0, -83.0),
            rec("Far", 40.0, -100.0),
        ])
    }

    #[test]
    fn markers_land_on_projected_positions() {
        let cfg = cfg();
        let base = compose_base(RgbaImage::from_pixel(90, 90, BG), &registry(), &cfg).unwrap();

        // A -> (30, 30), B -> (60, 60)
        let marker = cfg.marker_color.to_image();
        assert_eq!(*base.image.get_pixel(30, 30), marker);
        assert_eq!(*base.image.get_pixel(60, 60), marker);
        assert_eq!(*base.image.get_pixel(45, 45), BG);
        assert_eq!(*base.image.get_pixel(30, 34), BG);
        assert_eq!(base.off_canvas, 1);
    }

    #[test]
    fn build_base_is_idempotent_and_persists_template() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map.png");
        RgbaImage::from_pixel(90, 60, BG).save(&map).unwrap();

        let first = dir.path().join("t1.png");
        let second = dir.path().join("t2.png");
        let a = build_base(&map, &registry(), &cfg(), &first).unwrap();
        let b = build_base(&map, &registry(), &cfg(), &second).unwrap();

        assert_eq!(a.image, b.image);
        assert_eq!(load_rgba(&first).unwrap(), load_rgba(&second).unwrap());
        assert_eq!(a.path.as_deref(), Some(first.as_path()));
        assert_eq!(a.canvas(), Canvas::new(90, 60).unwrap());
    }

    #[test]
    fn missing_background_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_base(
            &dir.path().join("nope.png"),
            &registry(),
            &cfg(),
            &dir.path().join("t.png"),
        )
        .unwrap_err();
        assert!(matches!(err, GeoTrailError::Io(_)));
    }
}
