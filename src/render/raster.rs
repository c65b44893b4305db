use image::RgbaImage;
use kurbo::{Circle, Line, ParamCurveNearest, Point, Rect, Shape};

use crate::foundation::core::{PixelPoint, Rgba8};

/// Fill every pixel whose center lies inside the disc of `radius` around `center`.
///
/// Covers the same `2 * radius + 1` pixel span as an ellipse drawn into the box
/// `[center - radius, center + radius]`.
pub fn fill_circle(img: &mut RgbaImage, center: PixelPoint, radius: u32, color: Rgba8) {
    let circle = Circle::new(center.center(), f64::from(radius) + 0.5);
    fill_covered(img, circle.bounding_box(), color, |pt| circle.contains(pt));
}

/// Stroke a segment between two pixel centers with round caps.
pub fn draw_line(
    img: &mut RgbaImage,
    start: PixelPoint,
    end: PixelPoint,
    width: u32,
    color: Rgba8,
) {
    let half = f64::from(width.max(1)) / 2.0;
    if start == end {
        let dot = Circle::new(start.center(), half);
        fill_covered(img, dot.bounding_box(), color, |pt| dot.contains(pt));
        return;
    }

    let line = Line::new(start.center(), end.center());
    let reach = half * half;
    fill_covered(img, line.bounding_box().inflate(half, half), color, |pt| {
        line.nearest(pt, 1e-6).distance_sq <= reach
    });
}

fn fill_covered(
    img: &mut RgbaImage,
    bounds: Rect,
    color: Rgba8,
    covers: impl Fn(Point) -> bool,
) {
    let (width, height) = img.dimensions();
    let x0 = bounds.x0.floor().max(0.0);
    let y0 = bounds.y0.floor().max(0.0);
    let x1 = bounds.x1.ceil().min(f64::from(width));
    let y1 = bounds.y1.ceil().min(f64::from(height));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in (y0 as u32)..(y1 as u32) {
        for x in (x0 as u32)..(x1 as u32) {
            let pt = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if covers(pt) {
                let px = img.get_pixel_mut(x, y);
                *px = color.over(*px);
            }
        }
    }
}
