//! Per-page compositing of the translucency mask

use image::RgbaImage;
use crate::error::Result;
use crate::raster;
use crate::watermark::mask::TranslucencyMask;

/// Top-left corner of the mask on a page, anchored bottom-right
///
/// May be negative when the mask plus margin does not fit on the page.
pub fn overlay_origin(page: (u32, u32), mask: (u32, u32), margin: u32) -> (i64, i64) {
    let x = i64::from(page.0) - i64::from(mask.0) - i64::from(margin);
    let y = i64::from(page.1) - i64::from(mask.1) - i64::from(margin);
    (x, y)
}

/// Draw `page`, then the mask over its bottom-right corner, into a new bitmap
///
/// The result always has the page's dimensions. Mask pixels that fall outside
/// the page are clipped.
pub fn composite_page(page: &RgbaImage, mask: &TranslucencyMask, margin: u32) -> Result<RgbaImage> {
    let (width, height) = page.dimensions();
    let mut output = raster::allocate(width, height)?;
    for (out, src) in output.pixels_mut().zip(page.pixels()) {
        *out = *src;
    }

    let (x, y) = overlay_origin((width, height), mask.dimensions(), margin);
    raster::draw_over(&mut output, mask.as_image(), x, y);

    Ok(output)
}
