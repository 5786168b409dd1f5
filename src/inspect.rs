//! Read-back of a finalized PDF: page count, page boxes and embedded images.
//!
//! Only the structures this crate writes are understood (one image XObject
//! per page, referenced from the page's own resources), which is enough to
//! check page order and re-decode every embedded payload.

use crate::error::Img2PdfError;
use crate::output::{DocumentSummary, EmbeddedImage, PageSummary};
use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// Summarise a PDF held in memory.
pub fn inspect(pdf: &[u8]) -> Result<DocumentSummary, Img2PdfError> {
    let doc = Document::load_mem(pdf).map_err(|e| Img2PdfError::CorruptPdf(e.to_string()))?;

    let mut pages = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| Img2PdfError::CorruptPdf(format!("page {page_num}: {e}")))?;

        let (width_pt, height_pt) = media_box(page).unwrap_or((0.0, 0.0));
        let image = first_image(&doc, page);

        pages.push(PageSummary {
            page_num: page_num as usize,
            width_pt,
            height_pt,
            image,
        });
    }

    debug!("Inspected PDF: {} pages", pages.len());
    Ok(DocumentSummary {
        page_count: pages.len(),
        pdf_version: doc.version.clone(),
        pages,
    })
}

/// Read a PDF from disk and summarise it.
pub async fn inspect_file(path: impl AsRef<std::path::Path>) -> Result<DocumentSummary, Img2PdfError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Img2PdfError::from_read_error(path, &e))?;
    inspect(&bytes)
}

fn media_box(page: &Dictionary) -> Option<(f32, f32)> {
    let rect = page.get(b"MediaBox").ok()?.as_array().ok()?;
    if rect.len() != 4 {
        return None;
    }
    let n = |i: usize| rect[i].as_float().ok();
    Some((n(2)? - n(0)?, n(3)? - n(1)?))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    doc.dereference(obj).ok().map(|(_, o)| o)
}

fn first_image(doc: &Document, page: &Dictionary) -> Option<EmbeddedImage> {
    let resources = resolve(doc, page.get(b"Resources").ok()?)?.as_dict().ok()?;
    let xobjects = resolve(doc, resources.get(b"XObject").ok()?)?
        .as_dict()
        .ok()?;

    xobjects.iter().find_map(|(_, obj)| {
        let stream = resolve(doc, obj)?.as_stream().ok()?;
        let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
        if subtype != b"Image" {
            return None;
        }
        let width = stream.dict.get(b"Width").ok()?.as_i64().ok()?;
        let height = stream.dict.get(b"Height").ok()?.as_i64().ok()?;
        let filter = stream
            .dict
            .get(b"Filter")
            .ok()
            .and_then(|f| f.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned());

        Some(EmbeddedImage {
            width: width as u32,
            height: height as u32,
            filter,
            data: stream.content.clone(),
        })
    })
}
