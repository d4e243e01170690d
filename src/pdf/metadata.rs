//! PDF metadata extraction

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Find the MediaBox of a page, following inherited attributes up the tree
fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let mut node: &Dictionary = doc.get_dictionary(page_id).ok()?;

    // Bounded walk; malformed files can contain Parent cycles
    for _ in 0..32 {
        if let Ok(Object::Array(values)) = node.get(b"MediaBox") {
            if values.len() != 4 {
                return None;
            }
            let mut rect = [0.0; 4];
            for (slot, value) in rect.iter_mut().zip(values) {
                *slot = value.as_float().ok()?;
            }
            return Some(rect);
        }

        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Width and height of a page in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// MediaBox size of each page, in page order (None when missing or malformed)
    pub page_sizes: Vec<Option<PageSize>>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Read a text entry from the Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let info = doc.get_dictionary(info_id).ok()?;
    let bytes = info.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Page count and sizes both come from walking the page tree, so a stale
/// `/Count` in the Pages dictionary cannot make them disagree
fn metadata_of(doc: &Document) -> Result<PdfMetadata> {
    let page_sizes: Vec<Option<PageSize>> = doc
        .get_pages()
        .values()
        .map(|&id| {
            media_box(doc, id).map(|[x0, y0, x1, y1]| PageSize {
                width: (x1 - x0).abs(),
                height: (y1 - y0).abs(),
            })
        })
        .collect();

    if page_sizes.is_empty() {
        return Err(Error::EmptyDocument);
    }

    Ok(PdfMetadata {
        page_count: page_sizes.len(),
        page_sizes,
        title: info_string(doc, b"Title"),
        author: info_string(doc, b"Author"),
    })
}

/// Extract metadata from PDF bytes held in memory
pub fn extract_metadata_from_bytes(bytes: &[u8]) -> Result<PdfMetadata> {
    let doc = Document::load_mem(bytes)?;
    metadata_of(&doc)
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    metadata_of(&doc)
}
