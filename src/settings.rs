//! Tunable constants for the watermark pipeline

/// Alpha given to every non-white watermark pixel (about 25% opacity)
pub const DEFAULT_MASK_ALPHA: u8 = 64;

/// Gap in pixels between the watermark and the bottom-right page corner
pub const DEFAULT_MARGIN: u32 = 5;

/// Resolution pages are rendered at
pub const DEFAULT_DPI: f32 = 300.0;

/// PDF user space units per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Options for building the translucency mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskSettings {
    /// Alpha written for pixels that are not pure white
    pub alpha: u8,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_MASK_ALPHA,
        }
    }
}

/// Options for the document pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkSettings {
    /// Mask construction options
    pub mask: MaskSettings,
    /// Distance from the right and bottom page edges
    pub margin: u32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            mask: MaskSettings::default(),
            margin: DEFAULT_MARGIN,
        }
    }
}

/// Options for rendering PDF pages to bitmaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSettings {
    /// Rendering resolution in dots per inch
    pub dpi: f32,
}

impl RasterSettings {
    /// Scale factor from PDF points to pixels
    pub fn scale(&self) -> f32 {
        self.dpi / POINTS_PER_INCH
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = WatermarkSettings::default();
        assert_eq!(settings.mask.alpha, 64);
        assert_eq!(settings.margin, 5);
    }

    #[test]
    fn test_raster_scale() {
        let settings = RasterSettings { dpi: 144.0 };
        assert!((settings.scale() - 2.0).abs() < f32::EPSILON);
        assert!((RasterSettings::default().scale() - 300.0 / 72.0).abs() < 0.001);
    }
}
