//! Watermark mask, per-page compositing and the document pipeline

pub mod mask;
pub mod composite;
pub mod pipeline;

// Re-export commonly used items
pub use mask::TranslucencyMask;
pub use composite::{composite_page, overlay_origin};
pub use pipeline::{watermark_document, Watermarker};
