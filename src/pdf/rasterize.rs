//! PDF page rasterization
//!
//! Pages come out of a [`Rasterizer`] as a [`PageSequence`]: a lazy,
//! forward-only iterator that renders one page per call to `next()`. The
//! PDFium-backed implementation binds the shared library once per process and
//! shares that handle read-only between every rasterizer instance.

use std::path::Path;
use image::RgbaImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use crate::error::{Error, Result};
use crate::raster;
use crate::settings::RasterSettings;

/// Turns PDF bytes into page bitmaps, in page order
pub trait Rasterizer {
    /// Open `document` and return its pages as a lazy sequence
    ///
    /// Errors that are visible when opening the document are returned here;
    /// per-page rendering errors surface from the sequence itself.
    fn rasterize<'a>(&'a self, document: &'a [u8]) -> Result<PageSequence<'a>>;
}

/// Lazily rendered pages of one document
///
/// Can be walked once. After the first error it yields nothing more.
pub struct PageSequence<'a> {
    pages: Box<dyn Iterator<Item = Result<RgbaImage>> + 'a>,
    failed: bool,
}

impl<'a> PageSequence<'a> {
    pub fn new<I>(pages: I) -> Self
    where
        I: Iterator<Item = Result<RgbaImage>> + 'a,
    {
        Self {
            pages: Box::new(pages),
            failed: false,
        }
    }
}

impl Iterator for PageSequence<'_> {
    type Item = Result<RgbaImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let page = self.pages.next()?;
        self.failed = page.is_err();
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            self.pages.size_hint()
        }
    }
}

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// Process-wide PDFium handle, bound on first use
///
/// `library_dir` is only consulted by the call that performs the binding.
/// Without it the current directory is tried first, then the system library
/// paths.
pub fn pdfium_engine(library_dir: Option<&Path>) -> Result<&'static Pdfium> {
    PDFIUM.get_or_try_init(|| {
        let bindings = match library_dir {
            Some(dir) => {
                let dir = dir.to_string_lossy();
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&*dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| {
            Error::RasterizerUnavailable(format!("failed to load the PDFium library: {:?}", e))
        })?;

        log::info!("PDFium library bound");
        Ok(Pdfium::new(bindings))
    })
}

/// Renders pages through PDFium
pub struct PdfiumRasterizer {
    engine: &'static Pdfium,
    settings: RasterSettings,
}

impl PdfiumRasterizer {
    /// Create a rasterizer using the default library search
    pub fn new(settings: RasterSettings) -> Result<Self> {
        Self::with_library_dir(None, settings)
    }

    /// Create a rasterizer, loading PDFium from `library_dir` if this is the first use
    pub fn with_library_dir(library_dir: Option<&Path>, settings: RasterSettings) -> Result<Self> {
        Ok(Self {
            engine: pdfium_engine(library_dir)?,
            settings,
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize<'a>(&'a self, document: &'a [u8]) -> Result<PageSequence<'a>> {
        let document = self
            .engine
            .load_pdf_from_byte_slice(document, None)
            .map_err(|e| Error::Rasterize(format!("cannot open PDF: {:?}", e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(self.settings.scale());

        log::debug!(
            "Opened PDF with {} pages, rendering at {} dpi",
            document.pages().len(),
            self.settings.dpi
        );

        Ok(PageSequence::new(PdfiumPages {
            document,
            config,
            next: 0,
        }))
    }
}

struct PdfiumPages<'a> {
    document: PdfDocument<'a>,
    config: PdfRenderConfig,
    next: usize,
}

impl PdfiumPages<'_> {
    fn len(&self) -> usize {
        self.document.pages().len() as usize
    }
}

impl Iterator for PdfiumPages<'_> {
    type Item = Result<RgbaImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(render_page(self.document.pages(), index, &self.config))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// Render a single page to an RGBA bitmap
fn render_page(pages: &PdfPages, index: usize, config: &PdfRenderConfig) -> Result<RgbaImage> {
    let page_index = PdfPageIndex::try_from(index)
        .map_err(|e| Error::Rasterize(format!("page index {} out of range: {:?}", index, e)))?;

    let page = pages
        .get(page_index)
        .map_err(|e| Error::Rasterize(format!("cannot load page {}: {:?}", index + 1, e)))?;

    let bitmap = page
        .render_with_config(config)
        .map_err(|e| Error::Rasterize(format!("cannot render page {}: {:?}", index + 1, e)))?;

    let width = u32::try_from(bitmap.width())
        .map_err(|e| Error::Rasterize(format!("bad bitmap width on page {}: {:?}", index + 1, e)))?;
    let height = u32::try_from(bitmap.height())
        .map_err(|e| Error::Rasterize(format!("bad bitmap height on page {}: {:?}", index + 1, e)))?;

    log::debug!("Rendered page {} at {}x{}", index + 1, width, height);

    raster::from_raw(width, height, bitmap.as_rgba_bytes())
}
