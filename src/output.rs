//! Result types returned by the conversion entry points.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// The finalized document plus per-image bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The rendered PDF file. Skipped by serde so `--json` stays readable.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// One entry per input, in input order.
    pub pages: Vec<PageResult>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Images that made it into the document.
    pub fn embedded(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.error.is_none())
    }

    /// Treat any skipped input as an error.
    pub fn into_result(self) -> Result<Self, PageError> {
        match self.pages.iter().find_map(|p| p.error.clone()) {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based position of the input in the sequence.
    pub index: usize,
    /// File name, path or URL the input came from.
    pub source: String,
    /// 1-based page number holding this image, `None` if skipped.
    pub page_num: Option<usize>,
    /// Native pixel size of the decoded raster.
    pub width: u32,
    pub height: u32,
    /// Size of the embedded JPEG payload.
    pub encoded_bytes: usize,
    pub duration_ms: u64,
    pub error: Option<PageError>,
}

/// Aggregate numbers for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input_images: usize,
    pub embedded_images: usize,
    pub skipped_images: usize,
    /// Pages in the finalized document, blank pages included.
    pub page_count: usize,
    pub pdf_bytes: usize,
    pub total_duration_ms: u64,
}

/// Structure of a finalized PDF as seen by [`crate::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub page_count: usize,
    pub pdf_version: String,
    pub pages: Vec<PageSummary>,
}

impl DocumentSummary {
    /// Pages that carry an image, in page order.
    pub fn image_pages(&self) -> impl Iterator<Item = &PageSummary> {
        self.pages.iter().filter(|p| p.image.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-based page number.
    pub page_num: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub image: Option<EmbeddedImage>,
}

/// An image XObject found on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// Stream filter, `DCTDecode` for everything this crate writes.
    pub filter: Option<String>,
    /// Raw stream payload (a complete JPEG file for `DCTDecode`).
    #[serde(skip)]
    pub data: Vec<u8>,
}
