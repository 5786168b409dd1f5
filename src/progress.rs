//! Progress hooks: per-image conversion events and the loading indicator.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline commits each image. The delivery paths in
//! [`crate::deliver`] additionally drive a [`LoadingIndicator`]: shown before
//! conversion starts, hidden once the document is finalized and before it is
//! saved or previewed.
//!
//! # Example
//!
//! ```rust
//! use edgequake_img2pdf::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, index: usize, total: usize, encoded_bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Image {}/{} embedded ({} bytes)", index, total, encoded_bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each image.
///
/// Images are processed strictly one after another, so events for image
/// `k + 1` never start before image `k` has completed or failed. All methods
/// default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first image is read.
    fn on_conversion_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called before image `index` (1-based) is resolved and decoded.
    fn on_image_start(&self, index: usize, total_images: usize) {
        let _ = (index, total_images);
    }

    /// Called once image `index` has been committed to a page.
    ///
    /// `encoded_bytes` is the size of the embedded JPEG payload.
    fn on_image_complete(&self, index: usize, total_images: usize, encoded_bytes: usize) {
        let _ = (index, total_images, encoded_bytes);
    }

    /// Called when image `index` fails. Under the abort policy this is the
    /// last event before the conversion returns an error.
    fn on_image_error(&self, index: usize, total_images: usize, error: &str) {
        let _ = (index, total_images, error);
    }

    /// Called once after the document has been finalized.
    fn on_conversion_complete(&self, total_images: usize, embedded: usize) {
        let _ = (total_images, embedded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Visual "working…" feedback toggled around a conversion.
///
/// `show` is called before the first input is touched; `hide` after the
/// document is finalized (or the conversion failed) and before any output is
/// written.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Indicator that does nothing. Used by library callers without a UI.
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}
