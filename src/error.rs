//! Error types for the PDF watermark library

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category, kept for diagnostics at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input is not in the expected format at all
    InputFormat,
    /// The container looked right but its image or PDF content is corrupt or unsupported
    Decode,
    /// A bitmap could not be allocated with the requested dimensions
    Allocation,
    /// File system or shared library problems
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputFormat => "input format",
            ErrorKind::Decode => "decode",
            ErrorKind::Allocation => "allocation",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

/// Main error type for the PDF watermark library
#[derive(Error, Debug)]
pub enum Error {
    /// Watermark bytes are not an image we accept
    #[error("Invalid watermark: {0}")]
    InvalidWatermark(String),

    /// Document bytes are not a PDF
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The document rasterized to zero pages
    #[error("PDF has no pages")]
    EmptyDocument,

    /// Image decoding error
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Page rendering error reported by the rasterizer
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Bitmap dimensions that cannot be allocated
    #[error("Cannot allocate a {width}x{height} bitmap")]
    Allocation { width: u32, height: u32 },

    /// The rasterizer backend could not be loaded
    #[error("Rasterizer unavailable: {0}")]
    RasterizerUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl Error {
    /// The category this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidWatermark(_) | Error::InvalidDocument(_) | Error::EmptyDocument => {
                ErrorKind::InputFormat
            }
            Error::ImageDecode(image::ImageError::Limits(_)) | Error::Allocation { .. } => {
                ErrorKind::Allocation
            }
            Error::Pdf(lopdf::Error::IO(_))
            | Error::RasterizerUnavailable(_)
            | Error::Io(_)
            | Error::FileNotFound(_) => ErrorKind::Io,
            Error::ImageDecode(_) | Error::Rasterize(_) | Error::Pdf(_) => ErrorKind::Decode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::EmptyDocument.kind(), ErrorKind::InputFormat);
        assert_eq!(Error::Rasterize("bad page".into()).kind(), ErrorKind::Decode);
        assert_eq!(Error::Allocation { width: 0, height: 3 }.kind(), ErrorKind::Allocation);
        assert_eq!(Error::FileNotFound(PathBuf::from("a.pdf")).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_image_limits_are_allocation_errors() {
        use image::error::{LimitError, LimitErrorKind};

        let err = Error::from(image::ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::InsufficientMemory,
        )));
        assert_eq!(err.kind(), ErrorKind::Allocation);
    }

    #[test]
    fn test_pdf_write_failure_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full");
        assert_eq!(Error::Pdf(lopdf::Error::IO(io)).kind(), ErrorKind::Io);
        assert_eq!(
            Error::Pdf(lopdf::Error::PageNumberNotFound(3)).kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn test_allocation_message() {
        let err = Error::Allocation { width: 0, height: 10 };
        assert_eq!(err.to_string(), "Cannot allocate a 0x10 bitmap");
    }
}
