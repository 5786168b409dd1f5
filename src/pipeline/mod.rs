//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, run once per
//! input image, in order:
//!
//! ```text
//! input ──▶ decode ──▶ surface ──▶ encode ──▶ assemble
//! (path/URL) (image)   (RGB draw)  (JPEG)     (lopdf page)
//! ```
//!
//! 1. [`input`]    — read a local file or download a URL into an [`input::InputImage`]
//! 2. [`decode`]   — bytes → `DynamicImage`; fails fast on unknown or corrupt data
//! 3. [`surface`]  — flatten onto an opaque surface of the image's native size
//! 4. [`encode`]   — surface → baseline JPEG
//! 5. [`assemble`] — place the JPEG on a page and, at the end, serialise the PDF

pub mod assemble;
pub mod decode;
pub mod encode;
pub mod input;
pub mod surface;
