//! Translucency mask built from a watermark image

use std::io::Cursor;
use image::{ImageReader, Rgba, RgbaImage};
use crate::error::{Error, Result};
use crate::raster;
use crate::settings::MaskSettings;

const WHITE: [u8; 3] = [255, 255, 255];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Pixel written where the watermark is pure white
pub const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// A watermark reduced to "present" / "absent" pixels
///
/// Pure white pixels become fully transparent; every other pixel becomes the
/// same translucent black, whatever its original color. The shape of the
/// watermark survives, its colors do not.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslucencyMask {
    image: RgbaImage,
}

impl TranslucencyMask {
    /// Decode watermark bytes and build the mask from them
    ///
    /// The header is read before any pixel buffer is allocated. Empty images
    /// and images over the decoder's memory limit are allocation errors.
    pub fn decode(bytes: &[u8], settings: &MaskSettings) -> Result<Self> {
        let (width, height) = match header_dimensions(bytes) {
            Ok(dimensions) => dimensions,
            // the png decoder refuses a zero-sized IHDR before reporting it
            Err(e) => match png_ihdr_dimensions(bytes) {
                Some((width, height)) if width == 0 || height == 0 => (width, height),
                _ => return Err(e),
            },
        };

        if width == 0 || height == 0 {
            return Err(Error::Allocation { width, height });
        }

        let watermark = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_image(&watermark, settings)
    }

    /// Build the mask from an already decoded watermark
    ///
    /// Only the RGB channels are inspected; the input alpha is ignored.
    pub fn from_image(watermark: &RgbaImage, settings: &MaskSettings) -> Result<Self> {
        let (width, height) = watermark.dimensions();
        let mut image = raster::allocate(width, height)?;

        let ink = Rgba([0, 0, 0, settings.alpha]);
        for (out, src) in image.pixels_mut().zip(watermark.pixels()) {
            *out = if src.0[..3] == WHITE { CLEAR } else { ink };
        }

        log::debug!(
            "Built {}x{} translucency mask (alpha {})",
            width,
            height,
            settings.alpha
        );

        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Read-only view of the mask pixels
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Image dimensions as declared in the header
fn header_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Width and height straight from a PNG's IHDR chunk, without validation
fn png_ihdr_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}
