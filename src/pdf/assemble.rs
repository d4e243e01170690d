//! Building a new PDF out of page bitmaps using lopdf
//!
//! Each page gets a MediaBox equal to its bitmap size (one pixel per point)
//! and a single image XObject drawn over it. Pixel data is Flate-compressed as
//! soon as it is drawn, so only the compressed pages stay in memory.

use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;

/// Incremental writer for an image-only PDF
pub struct PdfAssembler {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfAssembler {
    /// Start an empty document
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");

        // Reserve the Pages id up front so every page can point at its parent
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Open a new page of `width` x `height` points
    pub fn begin_page(&mut self, width: u32, height: u32) -> PageCanvas<'_> {
        PageCanvas {
            assembler: self,
            width,
            height,
            content: String::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Append one page sized to `image` with the image drawn at its origin
    pub fn add_image_page(&mut self, image: &RgbaImage) -> Result<()> {
        let mut page = self.begin_page(image.width(), image.height());
        page.draw_image(image, 0, 0)?;
        page.end_page();
        Ok(())
    }

    /// Number of pages closed so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Write the page tree and catalog, then serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(catalog);

        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut output = Vec::new();
        self.doc.save_to(&mut output)?;

        log::debug!("Assembled PDF: {} pages, {} bytes", self.page_ids.len(), output.len());

        Ok(output)
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// A page that is being drawn; closed with [`PageCanvas::end_page`]
pub struct PageCanvas<'a> {
    assembler: &'a mut PdfAssembler,
    width: u32,
    height: u32,
    content: String,
    xobjects: Dictionary,
}

impl PageCanvas<'_> {
    /// Draw `image` unscaled with its top-left corner at (`x`, `y`)
    ///
    /// Coordinates are in raster orientation (y grows downwards) and are
    /// flipped into PDF user space here.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) -> Result<()> {
        let stream = image_xobject(image)?;
        let image_id = self.assembler.doc.add_object(stream);

        let name = format!("Im{}", self.xobjects.len());
        self.xobjects.set(name.clone(), Object::Reference(image_id));

        let (w, h) = (i64::from(image.width()), i64::from(image.height()));
        let pdf_y = i64::from(self.height) - y - h;
        self.content.push_str(&format!(
            "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
            w, h, x, pdf_y, name
        ));

        Ok(())
    }

    /// Close the page and add it to the document
    pub fn end_page(self) {
        let PageCanvas {
            assembler,
            width,
            height,
            content,
            xobjects,
        } = self;

        let content_id = assembler
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(i64::from(width)),
            Object::Integer(i64::from(height)),
        ];

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(assembler.pages_id));
        page.set("MediaBox", Object::Array(media_box));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));

        let page_id = assembler.doc.add_object(page);
        assembler.page_ids.push(page_id);
    }
}

/// Encode an RGBA bitmap as a Flate-compressed DeviceRGB image XObject
///
/// Any remaining transparency is flattened against white, which is what a
/// viewer would show behind it.
fn image_xobject(image: &RgbaImage) -> Result<Stream> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let a = u32::from(pixel[3]);
        for c in 0..3 {
            let value = (u32::from(pixel[c]) * a + 255 * (255 - a) + 127) / 255;
            rgb.push(value as u8);
        }
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&rgb)?;
    let compressed = encoder.finish()?;

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(image.width())));
    dict.set("Height", Object::Integer(i64::from(image.height())));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    Ok(Stream::new(dict, compressed))
}
