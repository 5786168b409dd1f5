//! Conversion entry points: ordered images in, one finalized PDF out.
//!
//! All entry points funnel into the same strictly sequential loop. Image `k`
//! is resolved, decoded, drawn, encoded and committed to the document before
//! image `k + 1` is touched. Decode and encode are CPU-bound and run under
//! `spawn_blocking`; the loop awaits each one before moving on.

use crate::config::{BlankPagePolicy, ConversionConfig, DecodeErrorPolicy};
use crate::error::{Img2PdfError, PageError};
use crate::output::{ConversionOutput, ConversionStats, PageResult};
use crate::pipeline::assemble::PdfAssembler;
use crate::pipeline::encode::{encode_surface, EncodedImage};
use crate::pipeline::input::{self, InputImage};
use crate::pipeline::{decode, surface::Surface};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the next image comes from.
enum Source<'a> {
    /// Path or URL, resolved lazily inside its own iteration.
    Location(&'a str),
    /// Bytes already in memory.
    Memory(InputImage),
}

impl Source<'_> {
    fn label(&self) -> String {
        match self {
            Source::Location(s) => s.to_string(),
            Source::Memory(img) => img.name.clone(),
        }
    }
}

/// Convert image files or URLs to a single PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `inputs` — local file paths and/or HTTP/HTTPS URLs, in page order
/// * `config` — conversion configuration
///
/// # Errors
/// Under [`DecodeErrorPolicy::Abort`] the first unreadable or undecodable
/// input ends the conversion with an error naming its 1-based position.
/// Under [`DecodeErrorPolicy::Skip`] such inputs are recorded in
/// `output.pages` and left out of the document.
pub async fn convert<S: AsRef<str>>(
    inputs: &[S],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    let sources = inputs.iter().map(|s| Source::Location(s.as_ref())).collect();
    run(sources, config).await
}

/// Convert images already held in memory.
pub async fn convert_images(
    images: Vec<InputImage>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    let sources = images.into_iter().map(Source::Memory).collect();
    run(sources, config).await
}

/// Convert and write the PDF directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file<S: AsRef<str>>(
    inputs: &[S],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Img2PdfError> {
    let output = convert(inputs, config).await?;
    write_atomic(output_path.as_ref(), &output.pdf).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync<S: AsRef<str>>(
    inputs: &[S],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Img2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(inputs, config))
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Img2PdfError> {
    let write_err = |source| Img2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Pipeline ─────────────────────────────────────────────────────────────

async fn run(
    sources: Vec<Source<'_>>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2PdfError> {
    let total_start = Instant::now();
    let total = sources.len();
    info!("Starting conversion of {} images", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    // ── Step 1: Empty document with its default page ─────────────────────
    let mut assembler = PdfAssembler::new(config.page_size);
    let mut pages = Vec::with_capacity(total);

    // ── Step 2: One image at a time ──────────────────────────────────────
    for (i, source) in sources.into_iter().enumerate() {
        let index = i + 1;
        let label = source.label();
        let image_start = Instant::now();

        if let Some(ref cb) = config.progress_callback {
            cb.on_image_start(index, total);
        }

        match prepare_image(index, source, config).await {
            Ok(encoded) => {
                let (width, height) = (encoded.width, encoded.height);
                let encoded_bytes = encoded.jpeg.len();

                let page_num = assembler.add_image_page(encoded, &config.placement);
                if config.blank_pages == BlankPagePolicy::AfterEachImage {
                    assembler.add_blank_page();
                }

                debug!("Image {} committed to page {}", index, page_num);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_complete(index, total, encoded_bytes);
                }

                pages.push(PageResult {
                    index,
                    source: label,
                    page_num: Some(page_num),
                    width,
                    height,
                    encoded_bytes,
                    duration_ms: image_start.elapsed().as_millis() as u64,
                    error: None,
                });
            }
            Err(Prepared::Fatal(e)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_error(index, total, &e.to_string());
                }
                return Err(e);
            }
            Err(Prepared::Page(page_err)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_error(index, total, &page_err.to_string());
                }
                if config.on_decode_error == DecodeErrorPolicy::Abort {
                    return Err(page_err.into());
                }

                warn!("Skipping image {}: {}", index, page_err);
                pages.push(PageResult {
                    index,
                    source: label,
                    page_num: None,
                    width: 0,
                    height: 0,
                    encoded_bytes: 0,
                    duration_ms: image_start.elapsed().as_millis() as u64,
                    error: Some(page_err),
                });
            }
        }
    }

    if config.blank_pages == BlankPagePolicy::TrailingOnly
        && pages.iter().any(|p| p.error.is_none())
    {
        assembler.add_blank_page();
    }

    // ── Step 3: Finalize ─────────────────────────────────────────────────
    let page_count = assembler.page_count();
    let pdf = assembler.finish()?;

    let embedded = pages.iter().filter(|p| p.error.is_none()).count();
    let stats = ConversionStats {
        input_images: total,
        embedded_images: embedded,
        skipped_images: total - embedded,
        page_count,
        pdf_bytes: pdf.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {}/{} images, {} pages, {} bytes, {}ms",
        embedded, total, page_count, stats.pdf_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, embedded);
    }

    Ok(ConversionOutput { pdf, pages, stats })
}

/// Why an image could not be prepared.
enum Prepared {
    /// Input could not even be located; never skippable.
    Fatal(Img2PdfError),
    /// Bytes were read but could not be turned into a page.
    Page(PageError),
}

/// Resolve, decode, draw and encode one image.
///
/// Everything allocated here (temp download, raster, surface) is dropped
/// before this returns; only the JPEG payload survives.
async fn prepare_image(
    index: usize,
    source: Source<'_>,
    config: &ConversionConfig,
) -> Result<EncodedImage, Prepared> {
    let image = match source {
        Source::Memory(img) => img,
        Source::Location(loc) => {
            let resolved = input::resolve_input(loc, config.download_timeout_secs)
                .await
                .map_err(Prepared::Fatal)?;
            resolved.load(loc).await.map_err(Prepared::Fatal)?
        }
    };

    let quality = config.jpeg_quality;
    tokio::task::spawn_blocking(move || {
        let raster = decode::decode_image(index, &image)?;
        let surface = Surface::for_image(&raster);
        drop(raster);
        encode_surface(index, &image.name, &surface, quality)
    })
    .await
    .map_err(|e| Prepared::Fatal(Img2PdfError::Internal(format!("Image task panicked: {}", e))))?
    .map_err(Prepared::Page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlankPagePolicy;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(w: u32, h: u32, color: [u8; 3]) -> InputImage {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        InputImage::new(format!("{w}x{h}.png"), buf).with_content_type("image/png")
    }

    #[tokio::test]
    async fn zero_images_yield_default_page() {
        let out = convert_images(vec![], &ConversionConfig::default())
            .await
            .unwrap();
        assert_eq!(out.stats.page_count, 1);
        assert!(out.pages.is_empty());
    }

    #[tokio::test]
    async fn trailing_blank_page_per_image() {
        let out = convert_images(
            vec![png(4, 4, [255, 0, 0]), png(4, 4, [0, 255, 0])],
            &ConversionConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(out.stats.page_count, 4);
        assert_eq!(out.pages[0].page_num, Some(1));
        assert_eq!(out.pages[1].page_num, Some(3));
    }

    #[tokio::test]
    async fn compact_layout_one_page_per_image() {
        let config = ConversionConfig::builder()
            .blank_pages(BlankPagePolicy::None)
            .build()
            .unwrap();
        let out = convert_images(
            vec![png(4, 4, [1, 2, 3]), png(5, 5, [4, 5, 6]), png(6, 6, [7, 8, 9])],
            &config,
        )
        .await
        .unwrap();
        assert_eq!(out.stats.page_count, 3);
        let nums: Vec<_> = out.pages.iter().map(|p| p.page_num).collect();
        assert_eq!(nums, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn trailing_only_adds_one_page_at_the_end() {
        let config = ConversionConfig::builder()
            .blank_pages(BlankPagePolicy::TrailingOnly)
            .build()
            .unwrap();
        let out = convert_images(
            vec![png(4, 4, [1, 2, 3]), png(5, 5, [4, 5, 6]), png(6, 6, [7, 8, 9])],
            &config,
        )
        .await
        .unwrap();
        assert_eq!(out.stats.page_count, 4);
        let nums: Vec<_> = out.pages.iter().map(|p| p.page_num).collect();
        assert_eq!(nums, vec![Some(1), Some(2), Some(3)]);

        let empty = convert_images(vec![], &config).await.unwrap();
        assert_eq!(empty.stats.page_count, 1);
    }

    #[tokio::test]
    async fn missing_path_is_fatal_even_when_skipping() {
        let config = ConversionConfig::builder()
            .on_decode_error(DecodeErrorPolicy::Skip)
            .build()
            .unwrap();
        let err = convert(&["/no/such/image.png"], &config).await.unwrap_err();
        assert!(matches!(err, Img2PdfError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.pdf");
        write_atomic(&path, b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(!dir.path().join("nested/deeper/out.pdf.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the destination makes the rename fail.
        let dest = dir.path().join("out.pdf");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), b"x").unwrap();

        let err = write_atomic(&dest, b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, Img2PdfError::OutputWriteFailed { .. }));
        assert!(!dir.path().join("out.pdf.tmp").exists());
    }
}
