//! Bitmap helpers shared by the mask builder and the compositor

use image::{Rgba, RgbaImage};
use crate::error::{Error, Result};

/// Bytes per RGBA8 pixel
pub const CHANNELS: usize = 4;

/// Allocate a transparent black bitmap, rejecting zero or overflowing sizes
pub fn allocate(width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::Allocation { width, height });
    }

    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or(Error::Allocation { width, height })?;

    Ok(RgbaImage::new(width, height))
}

/// Build an RGBA bitmap from a raw buffer, checking the length invariant
pub fn from_raw(width: u32, height: u32, buffer: Vec<u8>) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::Allocation { width, height });
    }
    RgbaImage::from_raw(width, height, buffer).ok_or(Error::Allocation { width, height })
}

/// Straight-alpha source-over: draw `src` on top of `dst`
///
/// `out_a = sa + da * (1 - sa)` and each color channel is the alpha-weighted
/// mix of both, divided back by `out_a`. Integer math, rounded to nearest.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = src;
        return;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;

    // Both terms are scaled by 255 so the division below stays exact enough.
    let out_a = sa * 255 + da * inv;
    for c in 0..3 {
        let mixed = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * da * inv;
        dst[c] = ((mixed + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}

/// Draw `src` onto `dst` with its top-left corner at (`x`, `y`)
///
/// The origin may be negative or past the edges; whatever falls outside
/// `dst` is skipped.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dst_w, dst_h) = (i64::from(dst.width()), i64::from(dst.height()));
    let (src_w, src_h) = (i64::from(src.width()), i64::from(src.height()));

    let left = x.max(0);
    let top = y.max(0);
    let right = (x + src_w).min(dst_w);
    let bottom = (y + src_h).min(dst_h);

    if left >= right || top >= bottom {
        return;
    }

    for dy in top..bottom {
        for dx in left..right {
            let pixel = *src.get_pixel((dx - x) as u32, (dy - y) as u32);
            blend_over(dst.get_pixel_mut(dx as u32, dy as u32), pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_rejects_zero() {
        assert!(matches!(allocate(0, 10), Err(Error::Allocation { width: 0, height: 10 })));
        assert!(matches!(allocate(10, 0), Err(Error::Allocation { .. })));
    }

    #[test]
    fn test_allocate_size() {
        let img = allocate(3, 2).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.as_raw().len(), 3 * 2 * CHANNELS);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(from_raw(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn test_blend_transparent_is_noop() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([255, 255, 255, 0]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([1, 2, 3, 255]));
        assert_eq!(dst, Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_blend_translucent_black_over_opaque() {
        let mut dst = Rgba([200, 100, 50, 255]);
        blend_over(&mut dst, Rgba([0, 0, 0, 64]));
        // c * 191 / 255, rounded
        assert_eq!(dst, Rgba([150, 75, 37, 255]));
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut dst = Rgba([0, 0, 0, 0]);
        blend_over(&mut dst, Rgba([100, 150, 200, 64]));
        assert_eq!(dst, Rgba([100, 150, 200, 64]));
    }

    #[test]
    fn test_draw_over_clips_negative_origin() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        draw_over(&mut dst, &src, -2, -1);

        // Only the bottom-right 1x2 corner of src lands on dst at (0,0)..(1,2)
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(0, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(1, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.get_pixel(0, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_over_fully_outside() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let before = dst.clone();
        draw_over(&mut dst, &src, 10, 10);
        draw_over(&mut dst, &src, -5, 0);
        assert_eq!(dst, before);
    }
}
