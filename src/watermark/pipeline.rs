//! End-to-end watermarking of a PDF document

use std::fs;
use std::path::Path;
use crate::error::{Error, Result};
use crate::input::{read_input, validate_document, validate_watermark};
use crate::pdf::assemble::PdfAssembler;
use crate::pdf::rasterize::Rasterizer;
use crate::settings::WatermarkSettings;
use crate::watermark::composite::composite_page;
use crate::watermark::mask::TranslucencyMask;

/// Watermark every page of `document` and return the new PDF bytes
///
/// The mask is built once, then pages are rasterized, composited and written
/// one at a time. The first failure aborts the whole run; no partial document
/// is ever returned.
///
/// # Example
///
/// ```no_run
/// use pdf_watermark::pdf::PdfiumRasterizer;
/// use pdf_watermark::settings::{RasterSettings, WatermarkSettings};
/// use pdf_watermark::watermark::watermark_document;
///
/// let rasterizer = PdfiumRasterizer::new(RasterSettings::default())?;
/// let watermark = std::fs::read("logo.png")?;
/// let document = std::fs::read("input.pdf")?;
///
/// let output = watermark_document(&rasterizer, &watermark, &document, &WatermarkSettings::default())?;
/// std::fs::write("watermarked.pdf", output)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn watermark_document<R>(
    rasterizer: &R,
    watermark: &[u8],
    document: &[u8],
    settings: &WatermarkSettings,
) -> Result<Vec<u8>>
where
    R: Rasterizer + ?Sized,
{
    let mask = TranslucencyMask::decode(watermark, &settings.mask)?;
    let pages = rasterizer.rasterize(document)?;

    let mut assembler = PdfAssembler::new();
    for (index, page) in pages.enumerate() {
        let page = page?;
        let composited = composite_page(&page, &mask, settings.margin)?;
        // drop the source bitmap before the next page is rendered
        drop(page);

        assembler.add_image_page(&composited)?;
        log::debug!(
            "Watermarked page {} ({}x{})",
            index + 1,
            composited.width(),
            composited.height()
        );
    }

    if assembler.page_count() == 0 {
        return Err(Error::EmptyDocument);
    }

    let page_count = assembler.page_count();
    let output = assembler.finish()?;
    log::info!("Watermarked {} pages", page_count);

    Ok(output)
}

/// A rasterizer bundled with pipeline settings
pub struct Watermarker<R> {
    rasterizer: R,
    settings: WatermarkSettings,
}

impl<R: Rasterizer> Watermarker<R> {
    pub fn new(rasterizer: R, settings: WatermarkSettings) -> Self {
        Self {
            rasterizer,
            settings,
        }
    }

    /// Validate both inputs, then watermark the document
    pub fn apply(&self, watermark: &[u8], document: &[u8]) -> Result<Vec<u8>> {
        validate_watermark(watermark)?;
        validate_document(document)?;
        watermark_document(&self.rasterizer, watermark, document, &self.settings)
    }

    /// Watermark a file on disk
    ///
    /// `output` is only written once the whole document has been produced.
    pub fn apply_files(&self, watermark: &Path, document: &Path, output: &Path) -> Result<usize> {
        let watermark_bytes = read_input(watermark)?;
        let document_bytes = read_input(document)?;

        log::info!(
            "Watermarking {} with {}",
            document.display(),
            watermark.display()
        );

        let pdf = self.apply(&watermark_bytes, &document_bytes)?;
        fs::write(output, &pdf)?;

        log::info!("Wrote {} ({} bytes)", output.display(), pdf.len());
        Ok(pdf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pdf::rasterize::PageSequence;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    /// Hands out prepared bitmaps instead of rendering anything
    struct FixedPages(Vec<(u32, u32)>);

    impl Rasterizer for FixedPages {
        fn rasterize<'a>(&'a self, _document: &'a [u8]) -> Result<PageSequence<'a>> {
            Ok(PageSequence::new(self.0.iter().map(|&(w, h)| {
                Ok(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
            })))
        }
    }

    struct Unreadable;

    impl Rasterizer for Unreadable {
        fn rasterize<'a>(&'a self, _document: &'a [u8]) -> Result<PageSequence<'a>> {
            Err(Error::Rasterize("cannot open PDF".to_string()))
        }
    }

    fn png(pixel: Rgba<u8>) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(10, 10, pixel)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_page_count_preserved() {
        let rasterizer = FixedPages(vec![(20, 30), (40, 40), (25, 25)]);
        let out = watermark_document(
            &rasterizer,
            &png(Rgba([0, 0, 0, 255])),
            b"%PDF-1.7",
            &WatermarkSettings::default(),
        )
        .unwrap();

        let doc = lopdf::Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_empty_document() {
        let result = watermark_document(
            &FixedPages(vec![]),
            &png(Rgba([0, 0, 0, 255])),
            b"%PDF-1.7",
            &WatermarkSettings::default(),
        );
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_bad_watermark_fails_before_rasterizing() {
        let result = watermark_document(
            &Unreadable,
            b"not an image",
            b"%PDF-1.7",
            &WatermarkSettings::default(),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_rasterizer_error_propagates() {
        let result = watermark_document(
            &Unreadable,
            &png(Rgba([255, 255, 255, 255])),
            b"%PDF-1.7",
            &WatermarkSettings::default(),
        );
        assert!(matches!(result, Err(Error::Rasterize(_))));
    }

    #[test]
    fn test_apply_validates_inputs() {
        let watermarker = Watermarker::new(FixedPages(vec![(20, 20)]), WatermarkSettings::default());

        let err = watermarker.apply(b"GIF89a", b"%PDF-1.7").unwrap_err();
        assert!(matches!(err, Error::InvalidWatermark(_)));

        let err = watermarker
            .apply(&png(Rgba([0, 0, 0, 255])), b"<html>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));

        assert!(watermarker.apply(&png(Rgba([0, 0, 0, 255])), b"%PDF-1.7").is_ok());
    }
}
