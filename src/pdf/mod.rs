//! PDF rasterization, assembly and inspection

pub mod assemble;
pub mod metadata;
pub mod rasterize;

// Re-export commonly used items
pub use assemble::{PageCanvas, PdfAssembler};
pub use metadata::{extract_metadata, extract_metadata_from_bytes, PageSize, PdfMetadata};
pub use rasterize::{pdfium_engine, PageSequence, PdfiumRasterizer, Rasterizer};
