use crate::{
    config::RenderConfig,
    foundation::core::{Canvas, GeoPoint, PixelPoint},
};

/// Linear equirectangular mapping from degrees to raster pixels.
///
/// `x` grows with longitude and `y` grows as latitude decreases, measured from `top_left`.
/// The result is truncated toward zero and never clamped: points outside the anchored
/// extent land off-canvas.
pub fn project(
    lat: f64,
    lon: f64,
    top_left: GeoPoint,
    bottom_right: GeoPoint,
    width: u32,
    height: u32,
) -> PixelPoint {
    let lon_span = bottom_right.lon - top_left.lon;
    let lat_span = top_left.lat - bottom_right.lat;
    let x = (lon - top_left.lon) * f64::from(width) / lon_span;
    let y = (top_left.lat - lat) * f64::from(height) / lat_span;
    PixelPoint::new(x as i64, y as i64)
}

/// [`project`] bound to one raster and one pair of anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
    pub canvas: Canvas,
}

impl Projector {
    pub fn new(cfg: &RenderConfig, canvas: Canvas) -> Self {
        Self {
            top_left: cfg.top_left_anchor,
            bottom_right: cfg.bottom_right_anchor,
            canvas,
        }
    }

    pub fn project(&self, p: GeoPoint) -> PixelPoint {
        project(
            p.lat,
            p.lon,
            self.top_left,
            self.bottom_right,
            self.canvas.width,
            self.canvas.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TL: GeoPoint = GeoPoint::new(32.0, -88.0);
    const BR: GeoPoint = GeoPoint::new(24.0, -80.0);

    #[test]
    fn anchors_map_to_raster_corners() {
        assert_eq!(project(TL.lat, TL.lon, TL, BR, 800, 600), PixelPoint::new(0, 0));

        let br = project(BR.lat, BR.lon, TL, BR, 800, 600);
        assert!((799..=800).contains(&br.x));
        assert!((599..=600).contains(&br.y));
    }

    #[test]
    fn midpoint_maps_to_raster_center() {
        let p = project(28.0, -84.0, TL, BR, 800, 600);
        assert_eq!(p, PixelPoint::new(400, 300));
    }

    #[test]
    fn x_increases_with_longitude_and_y_decreases_with_latitude() {
        let mut prev = project(28.0, -87.9, TL, BR, 1000, 1000);
        for i in 1..50 {
            let lon = -87.9 + f64::from(i) * 0.15;
            let p = project(28.0, lon, TL, BR, 1000, 1000);
            assert!(p.x > prev.x, "x must grow with longitude at lon={lon}");
            assert_eq!(p.y, prev.y);
            prev = p;
        }

        let mut prev = project(24.1, -84.0, TL, BR, 1000, 1000);
        for i in 1..50 {
            let lat = 24.1 + f64::from(i) * 0.15;
            let p = project(lat, -84.0, TL, BR, 1000, 1000);
            assert!(p.y < prev.y, "y must shrink as latitude grows at lat={lat}");
            prev = p;
        }
    }

    #[test]
    fn out_of_extent_points_are_not_clamped() {
        let p = project(40.0, -100.0, TL, BR, 800, 600);
        assert!(p.x < 0);
        assert!(p.y < 0);

        let p = project(20.0, -70.0, TL, BR, 800, 600);
        assert!(p.x > 800);
        assert!(p.y > 600);
    }

    #[test]
    fn projector_matches_free_function() {
        let cfg = RenderConfig {
            top_left_anchor: TL,
            bottom_right_anchor: BR,
            ..RenderConfig::default()
        };
        let proj = Projector::new(&cfg, Canvas::new(640, 480).unwrap());
        let p = GeoPoint::new(30.5, -83.25);
        assert_eq!(proj.project(p), project(p.lat, p.lon, TL, BR, 640, 480));
    }
}
