//! Reading and sniffing the two inputs before any decoding work starts

use std::fs;
use std::path::Path;
use image::ImageFormat;
use crate::error::{Error, Result};

/// Every PDF starts with this marker
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept the header anywhere in the first kilobyte
const PDF_HEADER_WINDOW: usize = 1024;

/// Check that `bytes` look like a PNG
pub fn validate_watermark(bytes: &[u8]) -> Result<()> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(()),
        Ok(other) => Err(Error::InvalidWatermark(format!(
            "the watermark should be a PNG image, found {:?}",
            other
        ))),
        Err(_) => Err(Error::InvalidWatermark(
            "the watermark should be a PNG image".to_string(),
        )),
    }
}

/// Check that `bytes` carry a PDF header
pub fn validate_document(bytes: &[u8]) -> Result<()> {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(Error::InvalidDocument(
            "the document should be a PDF file".to_string(),
        ))
    }
}

/// Read an input file, reporting a missing file distinctly
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_png_accepted() {
        assert!(validate_watermark(PNG_SIGNATURE).is_ok());
    }

    #[test]
    fn test_jpeg_rejected() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let err = validate_watermark(&jpeg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputFormat);
        assert!(err.to_string().contains("PNG"));
    }

    #[test]
    fn test_unknown_watermark_rejected() {
        assert!(matches!(validate_watermark(b"hello"), Err(Error::InvalidWatermark(_))));
    }

    #[test]
    fn test_pdf_header() {
        assert!(validate_document(b"%PDF-1.7\n...").is_ok());
        assert!(validate_document(b"\xEF\xBB\xBF junk %PDF-1.4").is_ok());
        assert!(matches!(validate_document(b"PK\x03\x04"), Err(Error::InvalidDocument(_))));
        assert!(validate_document(b"").is_err());
    }

    #[test]
    fn test_header_past_window_rejected() {
        let mut bytes = vec![b' '; PDF_HEADER_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(validate_document(&bytes).is_err());
    }

    #[test]
    fn test_read_missing_input() {
        let result = read_input(Path::new("does-not-exist.png"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
