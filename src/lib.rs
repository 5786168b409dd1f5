//! # edgequake-img2pdf
//!
//! Assemble an ordered set of images into a single multi-page PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! images (paths, URLs or bytes)
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Decode   PNG / JPEG / GIF / BMP / WebP → raster (spawn_blocking)
//!  ├─ 3. Draw     flatten onto an opaque surface of native size
//!  ├─ 4. Encode   surface → JPEG
//!  ├─ 5. Page     JPEG placed in a fixed box, optional blank page after it
//!  └─ 6. Output   finalized PDF bytes + per-image stats
//! ```
//!
//! Images are processed strictly one at a time, in input order; page `k`
//! always holds image `k`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_img2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert(&["scan-1.png", "scan-2.jpg"], &config).await?;
//!     std::fs::write("output.pdf", &output.pdf)?;
//!     eprintln!("{} pages, {} bytes", output.stats.page_count, output.stats.pdf_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-img2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod deliver;
pub mod error;
pub mod inspect;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BlankPagePolicy, ConversionConfig, ConversionConfigBuilder, DecodeErrorPolicy, ImagePlacement, PageSize};
pub use convert::{convert, convert_images, convert_sync, convert_to_file};
pub use deliver::{convert_and_preview, convert_and_save, pdf_data_url, preview_html, DEFAULT_OUTPUT_NAME};
pub use error::{Img2PdfError, PageError};
pub use inspect::{inspect, inspect_file};
pub use output::{ConversionOutput, ConversionStats, DocumentSummary, EmbeddedImage, PageResult, PageSummary};
pub use pipeline::input::InputImage;
pub use progress::{ConversionProgressCallback, LoadingIndicator, NoopIndicator, NoopProgressCallback, ProgressCallback};
