use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::error::{GeoTrailError, GeoTrailResult};

pub fn ensure_parent_dir(path: &Path) -> GeoTrailResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Decode any raster `image` understands and convert it to straight RGBA8.
pub fn load_rgba(path: &Path) -> GeoTrailResult<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| GeoTrailError::io(format!("load raster '{}': {e}", path.display())))?;
    Ok(img.to_rgba8())
}

pub fn save_png(img: &RgbaImage, path: &Path) -> GeoTrailResult<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| GeoTrailError::io(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_keeps_pixels_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("img.png");

        let mut img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, image::Rgba([200, 0, 0, 128]));
        save_png(&img, &path).unwrap();

        let back = load_rgba(&path).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn rgb_input_is_converted_to_opaque_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let back = load_rgba(&path).unwrap();
        assert_eq!(back.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn missing_raster_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rgba(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, GeoTrailError::Io(_)));
    }
}
