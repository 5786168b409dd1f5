//! Document assembly: accumulate pages, render the PDF once.
//!
//! A fresh [`PdfAssembler`] already holds one empty page, as a new document in
//! any page-oriented PDF library does. The first image drawn goes onto that
//! pristine page; every later image gets a newly appended page. Blank pages
//! can be appended at any time.
//!
//! Image payloads are moved into the lopdf object table as soon as a page is
//! added, so the caller can drop its copy immediately. Page dictionaries,
//! content streams and the page tree are only materialised in
//! [`PdfAssembler::finish`].

use crate::config::{ImagePlacement, PageSize};
use crate::error::Img2PdfError;
use crate::pipeline::encode::EncodedImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

const PRODUCER: &str = concat!("edgequake-img2pdf ", env!("CARGO_PKG_VERSION"));

/// Resource name of the single image drawn on a content page.
const IMAGE_RESOURCE: &[u8] = b"Im1";

struct PageSlot {
    /// Image XObject and its `cm` matrix, `None` for a blank page.
    image: Option<(ObjectId, [f32; 6])>,
}

pub struct PdfAssembler {
    doc: Document,
    page_size_pt: (f32, f32),
    pages: Vec<PageSlot>,
    /// The default first page has not been drawn on yet.
    pristine: bool,
}

impl PdfAssembler {
    /// A document with a single empty page of `page_size`.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            doc: Document::with_version("1.4"),
            page_size_pt: page_size.dimensions_pt(),
            pages: vec![PageSlot { image: None }],
            pristine: true,
        }
    }

    /// Number of pages the finished document will have.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw `image` stretched into `placement` on its own page.
    ///
    /// Returns the 1-based page number that holds the image.
    pub fn add_image_page(&mut self, image: EncodedImage, placement: &ImagePlacement) -> usize {
        let xobject = image_xobject(image);
        let xobject_id = self.doc.add_object(xobject);
        let matrix = placement.to_matrix(self.page_size_pt.1);

        if self.pristine {
            self.pristine = false;
            self.pages[0].image = Some((xobject_id, matrix));
        } else {
            self.pages.push(PageSlot {
                image: Some((xobject_id, matrix)),
            });
        }

        debug!("Image placed on page {}", self.pages.len());
        self.pages.len()
    }

    /// Append an empty page. Returns its 1-based page number.
    pub fn add_blank_page(&mut self) -> usize {
        // An explicit new page ends the pristine state just like drawing does.
        self.pristine = false;
        self.pages.push(PageSlot { image: None });
        self.pages.len()
    }

    /// Build the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, Img2PdfError> {
        let (width, height) = self.page_size_pt;
        let pages_id = self.doc.new_object_id();
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for slot in &self.pages {
            let mut resources = Dictionary::new();
            let contents = match slot.image {
                Some((xobject_id, matrix)) => {
                    resources.set(
                        "XObject",
                        dictionary! { IMAGE_RESOURCE.to_vec() => xobject_id },
                    );
                    draw_image_ops(&matrix)
                }
                None => Content { operations: vec![] },
            };
            let content_id = self
                .doc
                .add_object(Stream::new(Dictionary::new(), contents.encode()?));

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| Img2PdfError::PdfAssemblyFailed(e.to_string()))?;

        debug!("Finalized PDF: {} pages, {} bytes", count, buf.len());
        Ok(buf)
    }
}

/// `DCTDecode` image XObject wrapping a baseline RGB JPEG.
fn image_xobject(image: EncodedImage) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "DCTDecode",
    };
    Stream::new(dict, image.jpeg).with_compression(false)
}

fn draw_image_ops(matrix: &[f32; 6]) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("cm", matrix.iter().map(|v| Object::Real(*v)).collect()),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
}
