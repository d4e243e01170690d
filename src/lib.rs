//! PDF Watermark Library
//!
//! Stamps a translucent image watermark onto every page of a PDF.
//! This library provides functionality to:
//! - Reduce a watermark image to a translucency mask
//! - Rasterize PDF pages through PDFium
//! - Composite the mask onto the bottom-right corner of each page
//! - Reassemble the composited pages into a new PDF
//!
//! # Example
//!
//! ```no_run
//! use pdf_watermark::pdf::PdfiumRasterizer;
//! use pdf_watermark::settings::{RasterSettings, WatermarkSettings};
//! use pdf_watermark::watermark::Watermarker;
//! use std::path::Path;
//!
//! let rasterizer = PdfiumRasterizer::new(RasterSettings::default())
//!     .expect("PDFium not available");
//! let watermarker = Watermarker::new(rasterizer, WatermarkSettings::default());
//!
//! watermarker
//!     .apply_files(Path::new("logo.png"), Path::new("input.pdf"), Path::new("watermarked.pdf"))
//!     .expect("Failed to watermark PDF");
//! ```

pub mod error;
pub mod input;
pub mod pdf;
pub mod raster;
pub mod settings;
pub mod watermark;

// Re-export commonly used items
pub use error::{Error, ErrorKind, Result};
