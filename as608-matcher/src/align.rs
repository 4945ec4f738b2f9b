//! Centroid alignment
//!
//! Shifts a skeleton so the center of mass of its foreground pixels lands on
//! the image center. Only translation is applied; rotation and scale are left
//! to the tolerance of the matcher.

use image::GrayImage;
use tracing::trace;

use crate::error::{Error, Result};

/// Center of mass of the nonzero pixels as `(x, y)`, rounded down
///
/// # Errors
///
/// `EmptyRaster` when no pixel is set.
pub fn centroid(raster: &GrayImage) -> Result<(u32, u32)> {
    let mut sum_x: u64 = 0;
    let mut sum_y: u64 = 0;
    let mut count: u64 = 0;

    for (x, y, pixel) in raster.enumerate_pixels() {
        if pixel.0[0] > 0 {
            sum_x += u64::from(x);
            sum_y += u64::from(y);
            count += 1;
        }
    }

    if count == 0 {
        return Err(Error::EmptyRaster);
    }

    Ok(((sum_x / count) as u32, (sum_y / count) as u32))
}

/// Translation `(dx, dy)` that moves the centroid to `(width / 2, height / 2)`
pub fn alignment_offset(raster: &GrayImage) -> Result<(i64, i64)> {
    let (cx, cy) = centroid(raster)?;
    let dx = i64::from(raster.width() / 2) - i64::from(cx);
    let dy = i64::from(raster.height() / 2) - i64::from(cy);
    Ok((dx, dy))
}

/// Shift every pixel by `(dx, dy)`, filling uncovered area with zero
pub fn translate(raster: &GrayImage, dx: i64, dy: i64) -> GrayImage {
    let (width, height) = raster.dimensions();
    let mut out = GrayImage::new(width, height);

    for (x, y, pixel) in raster.enumerate_pixels() {
        let nx = i64::from(x) + dx;
        let ny = i64::from(y) + dy;
        if (0..i64::from(width)).contains(&nx) && (0..i64::from(height)).contains(&ny) {
            out.put_pixel(nx as u32, ny as u32, *pixel);
        }
    }

    out
}

/// Center the foreground of `raster`
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use as608_matcher::align;
///
/// let mut img = GrayImage::new(8, 8);
/// img.put_pixel(1, 1, Luma([255]));
///
/// let aligned = align(&img).unwrap();
/// assert_eq!(aligned.get_pixel(4, 4).0, [255]);
/// ```
pub fn align(raster: &GrayImage) -> Result<GrayImage> {
    let (dx, dy) = alignment_offset(raster)?;
    trace!(dx, dy, "Aligning raster on centroid");
    Ok(translate(raster, dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_pixel_moves_to_center() {
        let (w, h) = (256, 288);
        let mut img = GrayImage::new(w, h);
        img.put_pixel(w / 2 + 5, h / 2, Luma([255]));

        let aligned = align(&img).unwrap();

        assert_eq!(aligned.get_pixel(w / 2, h / 2).0, [255]);
        assert_eq!(aligned.get_pixel(w / 2 + 5, h / 2).0, [0]);
        assert_eq!(aligned.pixels().filter(|p| p.0[0] > 0).count(), 1);
    }

    #[test]
    fn test_empty_raster_is_an_error() {
        let img = GrayImage::new(16, 16);
        assert!(matches!(align(&img), Err(Error::EmptyRaster)));
        assert!(matches!(centroid(&img), Err(Error::EmptyRaster)));
    }

    #[test]
    fn test_centroid_rounds_down() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(2, 3, Luma([255]));
        img.put_pixel(3, 4, Luma([255]));

        assert_eq!(centroid(&img).unwrap(), (2, 3));
        assert_eq!(alignment_offset(&img).unwrap(), (3, 2));
    }

    #[test]
    fn test_shape_is_preserved() {
        let mut img = GrayImage::new(20, 20);
        for x in 0..4 {
            img.put_pixel(x, 0, Luma([255]));
        }

        let aligned = align(&img).unwrap();
        let lit: Vec<(u32, u32)> = aligned
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();

        // centroid (1, 0) moves to (10, 10)
        assert_eq!(lit, vec![(9, 10), (10, 10), (11, 10), (12, 10)]);
    }

    #[test]
    fn test_translate_clips_out_of_frame() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(3, 3, Luma([200]));
        img.put_pixel(0, 0, Luma([100]));

        let shifted = translate(&img, 2, 2);
        assert_eq!(shifted.get_pixel(2, 2).0, [100]);
        assert_eq!(shifted.pixels().filter(|p| p.0[0] > 0).count(), 1);
    }

    #[test]
    fn test_already_centered_is_unchanged() {
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([255]));
        assert_eq!(align(&img).unwrap(), img);
    }
}
