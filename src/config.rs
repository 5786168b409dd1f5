//! Configuration types for image-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Defaults: A4 portrait pages, every
//! image stretched into a 190 × 150 mm box 10 mm from the top-left corner,
//! JPEG quality 92, and a blank page after every image.

use crate::error::Img2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Millimetres per PDF point (1 pt = 1/72 inch).
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// Configuration for an image-to-PDF conversion.
///
/// # Example
/// ```rust
/// use edgequake_img2pdf::{BlankPagePolicy, ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::Letter)
///     .jpeg_quality(85)
///     .blank_pages(BlankPagePolicy::None)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Geometry of every page, including the document's default first page.
    /// Default: A4 portrait.
    pub page_size: PageSize,

    /// Where each image is drawn on its page. Default: 10,10 / 190×150 mm.
    ///
    /// The source aspect ratio is ignored; images are stretched into the box.
    pub placement: ImagePlacement,

    /// JPEG quality used when re-encoding each raster (1–100). Default: 92.
    pub jpeg_quality: u8,

    /// Whether a blank page follows every image page. Default: after each image.
    pub blank_pages: BlankPagePolicy,

    /// What to do when an input cannot be decoded. Default: abort.
    pub on_decode_error: DecodeErrorPolicy,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            placement: ImagePlacement::default(),
            jpeg_quality: 92,
            blank_pages: BlankPagePolicy::default(),
            on_decode_error: DecodeErrorPolicy::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page_size", &self.page_size)
            .field("placement", &self.placement)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("blank_pages", &self.blank_pages)
            .field("on_decode_error", &self.on_decode_error)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn placement(mut self, placement: ImagePlacement) -> Self {
        self.config.placement = placement;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn blank_pages(mut self, policy: BlankPagePolicy) -> Self {
        self.config.blank_pages = policy;
        self
    }

    pub fn on_decode_error(mut self, policy: DecodeErrorPolicy) -> Self {
        self.config.on_decode_error = policy;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Img2PdfError> {
        let c = &self.config;
        let (page_w, page_h) = c.page_size.dimensions_mm();
        if !(page_w > 0.0 && page_h > 0.0) {
            return Err(Img2PdfError::InvalidConfig(format!(
                "page size must be positive, got {page_w}×{page_h} mm"
            )));
        }
        if !(c.placement.width_mm > 0.0 && c.placement.height_mm > 0.0) {
            return Err(Img2PdfError::InvalidConfig(format!(
                "image box must be positive, got {}×{} mm",
                c.placement.width_mm, c.placement.height_mm
            )));
        }
        if !(c.placement.x_mm.is_finite() && c.placement.y_mm.is_finite()) {
            return Err(Img2PdfError::InvalidConfig(
                "image offset must be finite".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(Img2PdfError::InvalidConfig(
                "download timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// Page geometry. Named sizes are portrait.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 210 × 297 mm (default).
    #[default]
    A4,
    /// 297 × 420 mm.
    A3,
    /// 148 × 210 mm.
    A5,
    /// 8.5 × 11 in.
    Letter,
    /// 8.5 × 14 in.
    Legal,
    /// Arbitrary width × height in millimetres.
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageSize {
    /// Width and height in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match *self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Width and height in PDF points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w), mm_to_pt(h))
    }
}

/// Image box on a page, measured in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Default for ImagePlacement {
    fn default() -> Self {
        Self {
            x_mm: 10.0,
            y_mm: 10.0,
            width_mm: 190.0,
            height_mm: 150.0,
        }
    }
}

impl ImagePlacement {
    /// The `cm` matrix operands `[w, 0, 0, h, x, y]` in points for a page of
    /// `page_height_pt`. PDF user space has its origin at the bottom-left.
    pub fn to_matrix(&self, page_height_pt: f32) -> [f32; 6] {
        let w = mm_to_pt(self.width_mm);
        let h = mm_to_pt(self.height_mm);
        let x = mm_to_pt(self.x_mm);
        let y = page_height_pt - mm_to_pt(self.y_mm) - h;
        [w, 0.0, 0.0, h, x, y]
    }
}

// ── Policies ─────────────────────────────────────────────────────────────

/// Whether a blank page is appended after each image page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlankPagePolicy {
    /// A blank page follows every image, including the last: N images → 2N pages.
    #[default]
    AfterEachImage,
    /// One page per image plus a single blank page at the end: N images →
    /// N + 1 pages.
    TrailingOnly,
    /// One page per image: N images → N pages.
    None,
}

/// What the pipeline does with an input that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecodeErrorPolicy {
    /// Stop and return [`Img2PdfError::DecodeFailed`] (default).
    #[default]
    Abort,
    /// Leave the file out, record a [`crate::error::PageError`], keep going.
    Skip,
}
