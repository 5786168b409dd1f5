//! Error types for the edgequake-img2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Img2PdfError`] — **Fatal**: the conversion cannot produce a document
//!   (missing input, undecodable image under the `Abort` policy, PDF assembly
//!   failure). Returned as `Err(Img2PdfError)` from the `convert*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single input was dropped under
//!   [`crate::config::DecodeErrorPolicy::Skip`]. Stored inside
//!   [`crate::output::PageResult`] so callers can see which files were left
//!   out of the document.
//!
//! Every image-level variant carries the 1-based position of the offending
//! file in the input sequence.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// All fatal errors returned by the edgequake-img2pdf library.
#[derive(Debug, Error)]
pub enum Img2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The bytes of input `index` could not be decoded as a raster image.
    #[error("Image {index} ('{name}') could not be decoded: {detail}")]
    DecodeFailed {
        index: usize,
        name: String,
        detail: String,
    },

    /// The decoded raster of input `index` could not be re-encoded as JPEG.
    #[error("Image {index} ('{name}') could not be encoded as JPEG: {detail}")]
    EncodeFailed {
        index: usize,
        name: String,
        detail: String,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// lopdf refused to build or serialise the document.
    #[error("PDF assembly failed: {0}")]
    PdfAssemblyFailed(String),

    /// Bytes handed to [`crate::inspect`] are not a readable PDF.
    #[error("PDF is corrupt: {0}")]
    CorruptPdf(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Img2PdfError {
    /// Classify a failed read of `path`.
    pub fn from_read_error(path: &Path, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Img2PdfError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Img2PdfError::FileNotFound {
                path: path.to_path_buf(),
            },
        }
    }
}

impl From<lopdf::Error> for Img2PdfError {
    fn from(e: lopdf::Error) -> Self {
        Img2PdfError::PdfAssemblyFailed(e.to_string())
    }
}

/// A non-fatal error for a single input image.
///
/// Only produced when the conversion runs with
/// [`crate::config::DecodeErrorPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The input could not be read or decoded.
    #[error("Image {index} ('{name}'): decode failed: {detail}")]
    DecodeFailed {
        index: usize,
        name: String,
        detail: String,
    },

    /// The raster could not be re-encoded.
    #[error("Image {index} ('{name}'): JPEG encoding failed: {detail}")]
    EncodeFailed {
        index: usize,
        name: String,
        detail: String,
    },
}

impl PageError {
    /// 1-based position of the input this error belongs to.
    pub fn index(&self) -> usize {
        match self {
            PageError::DecodeFailed { index, .. } | PageError::EncodeFailed { index, .. } => *index,
        }
    }
}

impl From<PageError> for Img2PdfError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::DecodeFailed {
                index,
                name,
                detail,
            } => Img2PdfError::DecodeFailed {
                index,
                name,
                detail,
            },
            PageError::EncodeFailed {
                index,
                name,
                detail,
            } => Img2PdfError::EncodeFailed {
                index,
                name,
                detail,
            },
        }
    }
}
