use crate::foundation::error::{GeoTrailError, GeoTrailResult};

use kurbo::Point;

/// Geographic coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Integer pixel position. May lie outside the raster; drawing clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Pixel center in raster space.
    pub fn center(self) -> Point {
        Point::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> GeoTrailResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeoTrailError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn contains(self, p: PixelPoint) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < i64::from(self.width) && p.y < i64::from(self.height)
    }
}

/// Straight (non-premultiplied) RGBA8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_image(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    /// Source-over `self` onto `dst`, both straight alpha.
    pub fn over(self, dst: image::Rgba<u8>) -> image::Rgba<u8> {
        if self.a == 255 {
            return self.to_image();
        }
        if self.a == 0 {
            return dst;
        }

        let sa = u32::from(self.a);
        let da = u32::from(dst[3]);
        let inv = 255 - sa;
        let out_a = sa + mul_div255(da, inv);
        if out_a == 0 {
            return image::Rgba([0, 0, 0, 0]);
        }

        let mut out = [0u8; 4];
        for (i, sc) in [self.r, self.g, self.b].into_iter().enumerate() {
            let premul = u32::from(sc) * sa + mul_div255(u32::from(dst[i]) * da, inv);
            out[i] = ((premul + out_a / 2) / out_a).min(255) as u8;
        }
        out[3] = out_a.min(255) as u8;
        image::Rgba(out)
    }
}

fn mul_div255(x: u32, y: u32) -> u32 {
    ((x * y) + 127) / 255
}
