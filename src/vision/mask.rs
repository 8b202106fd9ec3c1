//! Polygon rasterization into single-channel masks.

use image::{GrayImage, Luma};

/// Value written inside the lip region.
pub const MASK_ON: u8 = 255;

/// Fill a closed polygon given in pixel coordinates.
///
/// Scanline fill with the even-odd rule, sampling pixel centers, so a
/// polygon drawn on top with `value = 0` punches a clean hole.
pub fn fill_polygon(mask: &mut GrayImage, points: &[(f32, f32)], value: u8) {
    if points.len() < 3 {
        return;
    }
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
    let first_row = (min_y - 0.5).ceil().max(0.0) as u32;
    let last_row = ((max_y - 0.5).floor().min(height as f32 - 1.0)).max(-1.0);
    if last_row < 0.0 {
        return;
    }
    let last_row = last_row as u32;

    let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
    for row in first_row..=last_row {
        let center_y = row as f32 + 0.5;
        crossings.clear();
        for (idx, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(idx + 1) % points.len()];
            let spans_row = (y0 <= center_y && center_y < y1) || (y1 <= center_y && center_y < y0);
            if spans_row {
                crossings.push(x0 + (center_y - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            let start = (pair[0] - 0.5).ceil().max(0.0);
            let end = (pair[1] - 0.5).ceil().min(width as f32);
            if end <= start {
                continue;
            }
            for col in start as u32..end as u32 {
                mask.put_pixel(col, row, Luma([value]));
            }
        }
    }
}

/// Scale normalized landmarks to pixel coordinates for a `width` x `height` frame.
pub fn to_pixels(points: &[super::Landmark], width: u32, height: u32) -> Vec<(f32, f32)> {
    points
        .iter()
        .map(|p| (p.x * width as f32, p.y * height as f32))
        .collect()
}

/// Outer polygon filled, inner polygon cleared.
pub fn donut_mask(
    width: u32,
    height: u32,
    outer: &[(f32, f32)],
    inner: &[(f32, f32)],
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    fill_polygon(&mut mask, outer, MASK_ON);
    fill_polygon(&mut mask, inner, 0);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(f32, f32)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    #[test]
    fn fills_axis_aligned_square_exactly() {
        let mut mask = GrayImage::new(10, 10);
        fill_polygon(&mut mask, &square(2.0, 3.0, 6.0, 5.0), MASK_ON);
        let filled = mask.pixels().filter(|p| p.0[0] == MASK_ON).count();
        assert_eq!(filled, 4 * 2);
        assert_eq!(mask.get_pixel(2, 3).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(5, 4).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(6, 4).0[0], 0);
        assert_eq!(mask.get_pixel(2, 5).0[0], 0);
    }

    #[test]
    fn clips_polygons_outside_the_raster() {
        let mut mask = GrayImage::new(4, 4);
        fill_polygon(&mut mask, &square(-5.0, -5.0, 2.0, 2.0), MASK_ON);
        assert_eq!(mask.get_pixel(0, 0).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(1, 1).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(2, 2).0[0], 0);
        fill_polygon(&mut mask, &square(10.0, 10.0, 20.0, 20.0), MASK_ON);
    }

    #[test]
    fn degenerate_polygons_are_ignored() {
        let mut mask = GrayImage::new(4, 4);
        fill_polygon(&mut mask, &[(0.0, 0.0), (3.0, 3.0)], MASK_ON);
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn donut_punches_inner_hole() {
        let mask = donut_mask(
            20,
            20,
            &square(2.0, 2.0, 18.0, 18.0),
            &square(7.0, 7.0, 13.0, 13.0),
        );
        assert_eq!(mask.get_pixel(10, 10).0[0], 0);
        assert_eq!(mask.get_pixel(4, 10).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn fills_concave_polygon_with_even_odd_rule() {
        // A "U" shape: the notch between the arms stays empty.
        let u_shape = vec![
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 6.0),
            (6.0, 6.0),
            (6.0, 0.0),
            (9.0, 0.0),
            (9.0, 9.0),
            (0.0, 9.0),
        ];
        let mut mask = GrayImage::new(10, 10);
        fill_polygon(&mut mask, &u_shape, MASK_ON);
        assert_eq!(mask.get_pixel(1, 1).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(4, 1).0[0], 0);
        assert_eq!(mask.get_pixel(7, 1).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(4, 7).0[0], MASK_ON);
    }
}
