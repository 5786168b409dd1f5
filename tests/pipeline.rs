//! Integration tests for edgequake-img2pdf.
//!
//! All fixtures are generated in memory with the `image` crate, so these run
//! offline and need no files in the repository. Every produced PDF is read
//! back with `inspect` and the embedded JPEGs are decoded again to check
//! which source image landed on which page.

use edgequake_img2pdf::{
    convert, convert_and_preview, convert_and_save, convert_images, convert_sync, inspect,
    inspect_file, BlankPagePolicy, ConversionConfig, ConversionProgressCallback,
    DecodeErrorPolicy, Img2PdfError, InputImage, LoadingIndicator, PageSize,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("fixture encodes");
    buf
}

fn solid_png(name: &str, w: u32, h: u32, color: [u8; 3]) -> InputImage {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)));
    InputImage::new(name, encode(img, ImageFormat::Png)).with_content_type("image/png")
}

fn write_fixture(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 3]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, solid_png(name, w, h, color).bytes).expect("fixture written");
    path.to_string_lossy().into_owned()
}

/// Average colour of a decoded JPEG payload.
fn mean_rgb(jpeg: &[u8]) -> [f32; 3] {
    let img = image::load_from_memory(jpeg)
        .expect("embedded payload decodes")
        .to_rgb8();
    let n = (img.width() * img.height()) as f32;
    let mut sum = [0f32; 3];
    for px in img.pixels() {
        for c in 0..3 {
            sum[c] += px.0[c] as f32;
        }
    }
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

fn assert_close(actual: [f32; 3], expected: [u8; 3], context: &str) {
    for c in 0..3 {
        assert!(
            (actual[c] - expected[c] as f32).abs() < 12.0,
            "[{context}] channel {c}: got {actual:?}, expected {expected:?}"
        );
    }
}

fn compact() -> ConversionConfig {
    ConversionConfig::builder()
        .blank_pages(BlankPagePolicy::None)
        .build()
        .expect("valid config")
}

// ── Page counts ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn n_images_give_2n_pages_by_default() {
    let inputs = vec![
        solid_png("a.png", 8, 4, [220, 30, 30]),
        solid_png("b.png", 6, 6, [30, 220, 30]),
        solid_png("c.png", 4, 8, [30, 30, 220]),
    ];
    let out = convert_images(inputs, &ConversionConfig::default())
        .await
        .expect("conversion succeeds");

    assert_eq!(out.stats.page_count, 6);
    let summary = inspect(&out.pdf).unwrap();
    assert_eq!(summary.page_count, 6);

    let with_image: Vec<usize> = summary.image_pages().map(|p| p.page_num).collect();
    assert_eq!(with_image, vec![1, 3, 5], "content pages interleave with blanks");
    assert!(summary.pages.last().unwrap().image.is_none(), "trailing blank page");
}

#[tokio::test]
async fn compact_layout_gives_n_pages() {
    let inputs = vec![
        solid_png("a.png", 4, 4, [0, 0, 0]),
        solid_png("b.png", 4, 4, [0, 0, 0]),
    ];
    let out = convert_images(inputs, &compact()).await.unwrap();
    let summary = inspect(&out.pdf).unwrap();
    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.image_pages().count(), 2);
}

#[tokio::test]
async fn no_images_give_single_empty_page() {
    let out = convert_images(vec![], &ConversionConfig::default())
        .await
        .unwrap();
    let summary = inspect(&out.pdf).unwrap();
    assert_eq!(summary.page_count, 1);
    assert_eq!(summary.image_pages().count(), 0);
    assert_eq!(out.stats.input_images, 0);
}

#[tokio::test]
async fn one_image_is_larger_than_none() {
    let empty = convert_images(vec![], &ConversionConfig::default())
        .await
        .unwrap();
    let one = convert_images(
        vec![solid_png("a.png", 16, 16, [90, 90, 90])],
        &ConversionConfig::default(),
    )
    .await
    .unwrap();
    assert!(one.pdf.len() > empty.pdf.len());
}

// ── Ordering and content ─────────────────────────────────────────────────────

#[tokio::test]
async fn page_order_follows_input_order() {
    let colors = [[220, 30, 30], [30, 220, 30], [30, 30, 220]];
    let sizes = [(8, 4), (6, 6), (4, 8)];
    let inputs = colors
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (c, (w, h)))| solid_png(&format!("{i}.png"), w, h, *c))
        .collect();

    let out = convert_images(inputs, &ConversionConfig::default())
        .await
        .unwrap();
    let summary = inspect(&out.pdf).unwrap();

    for (k, page) in summary.image_pages().enumerate() {
        let img = page.image.as_ref().unwrap();
        assert_eq!(img.filter.as_deref(), Some("DCTDecode"));
        assert_eq!((img.width, img.height), sizes[k], "page for input {}", k + 1);
        assert_close(mean_rgb(&img.data), colors[k], &format!("input {}", k + 1));
    }

    let indices: Vec<usize> = out.pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[tokio::test]
async fn duplicates_are_kept() {
    let a = solid_png("a.png", 5, 5, [10, 200, 10]);
    let out = convert_images(vec![a.clone(), a], &compact()).await.unwrap();
    assert_eq!(out.stats.embedded_images, 2);
    assert_eq!(inspect(&out.pdf).unwrap().image_pages().count(), 2);
}

#[tokio::test]
async fn jpeg_and_transparent_inputs_are_flattened() {
    let jpeg = InputImage::new(
        "photo.jpg",
        encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([200, 200, 40]))),
            ImageFormat::Jpeg,
        ),
    );
    let clear = InputImage::new(
        "clear.png",
        encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 0]))),
            ImageFormat::Png,
        ),
    );

    let out = convert_images(vec![jpeg, clear], &compact()).await.unwrap();
    let summary = inspect(&out.pdf).unwrap();
    let pages: Vec<_> = summary.image_pages().collect();

    assert_close(mean_rgb(&pages[0].image.as_ref().unwrap().data), [200, 200, 40], "jpeg");
    assert_close(mean_rgb(&pages[1].image.as_ref().unwrap().data), [0, 0, 0], "transparent");
}

#[tokio::test]
async fn page_size_is_applied_to_every_page() {
    let config = ConversionConfig::builder()
        .page_size(PageSize::Letter)
        .build()
        .unwrap();
    let out = convert_images(vec![solid_png("a.png", 3, 3, [1, 1, 1])], &config)
        .await
        .unwrap();
    let summary = inspect(&out.pdf).unwrap();
    for page in &summary.pages {
        assert!((page.width_pt - 612.0).abs() < 0.1, "page {}", page.page_num);
        assert!((page.height_pt - 792.0).abs() < 0.1, "page {}", page.page_num);
    }
}

// ── Failure handling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_blob_fails_fast_with_its_position() {
    let inputs = vec![
        solid_png("a.png", 4, 4, [1, 2, 3]),
        InputImage::new("broken.png", Vec::new()).with_content_type("image/png"),
        solid_png("c.png", 4, 4, [1, 2, 3]),
    ];
    let err = convert_images(inputs, &ConversionConfig::default())
        .await
        .expect_err("must not hang or succeed");

    match err {
        Img2PdfError::DecodeFailed { index, name, .. } => {
            assert_eq!(index, 2);
            assert_eq!(name, "broken.png");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn skip_policy_drops_bad_file_and_keeps_order() {
    let config = ConversionConfig::builder()
        .on_decode_error(DecodeErrorPolicy::Skip)
        .build()
        .unwrap();
    let inputs = vec![
        solid_png("a.png", 4, 4, [220, 30, 30]),
        InputImage::new("junk.png", b"not an image".to_vec()).with_content_type("image/png"),
        solid_png("c.png", 4, 4, [30, 30, 220]),
    ];

    let out = convert_images(inputs, &config).await.unwrap();
    assert_eq!(out.stats.skipped_images, 1);
    assert_eq!(out.stats.embedded_images, 2);
    assert_eq!(out.stats.page_count, 4);
    assert_eq!(out.pages[1].page_num, None);
    assert_eq!(out.pages[1].error.as_ref().map(|e| e.index()), Some(2));
    let kept: Vec<_> = out.embedded().map(|p| (p.index, p.page_num)).collect();
    assert_eq!(kept, vec![(1, Some(1)), (3, Some(3))]);

    let summary = inspect(&out.pdf).unwrap();
    let images: Vec<_> = summary.image_pages().collect();
    assert_close(mean_rgb(&images[0].image.as_ref().unwrap().data), [220, 30, 30], "first");
    assert_close(mean_rgb(&images[1].image.as_ref().unwrap().data), [30, 30, 220], "third");

    assert!(out.into_result().is_err());
}

// ── Delivery paths ───────────────────────────────────────────────────────────

/// Shared view of the indicator state for ordering checks.
#[derive(Default)]
struct Timeline {
    visible: AtomicBool,
    events: Mutex<Vec<String>>,
}

struct TestIndicator {
    timeline: Arc<Timeline>,
    dest: PathBuf,
}

impl LoadingIndicator for TestIndicator {
    fn show(&self) {
        self.timeline.visible.store(true, Ordering::SeqCst);
        self.timeline.events.lock().unwrap().push("show".into());
    }

    fn hide(&self) {
        self.timeline.visible.store(false, Ordering::SeqCst);
        let saved = self.dest.exists();
        self.timeline
            .events
            .lock()
            .unwrap()
            .push(format!("hide saved={saved}"));
    }
}

struct StartProbe(Arc<Timeline>);

impl ConversionProgressCallback for StartProbe {
    fn on_conversion_start(&self, _total: usize) {
        let visible = self.0.visible.load(Ordering::SeqCst);
        self.0
            .events
            .lock()
            .unwrap()
            .push(format!("start visible={visible}"));
    }
}

async fn save_with_timeline(inputs: &[String], dest: PathBuf) -> Vec<String> {
    let timeline = Arc::new(Timeline::default());
    let config = ConversionConfig::builder()
        .progress_callback(Arc::new(StartProbe(Arc::clone(&timeline))))
        .build()
        .unwrap();
    let indicator = TestIndicator {
        timeline: Arc::clone(&timeline),
        dest: dest.clone(),
    };

    convert_and_save(inputs, &dest, &config, &indicator)
        .await
        .expect("save succeeds");
    assert!(dest.exists(), "PDF saved");

    let events = timeline.events.lock().unwrap().clone();
    events
}

#[tokio::test]
async fn indicator_wraps_conversion_and_precedes_save() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        write_fixture(dir.path(), "a.png", 4, 4, [255, 0, 0]),
        write_fixture(dir.path(), "b.png", 4, 4, [0, 255, 0]),
    ];

    let events = save_with_timeline(&inputs, dir.path().join("output.pdf")).await;
    assert_eq!(events, vec!["show", "start visible=true", "hide saved=false"]);
}

#[tokio::test]
async fn indicator_protocol_holds_for_zero_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let events = save_with_timeline(&[], dir.path().join("output.pdf")).await;
    assert_eq!(events, vec!["show", "start visible=true", "hide saved=false"]);

    let summary = inspect_file(dir.path().join("output.pdf")).await.unwrap();
    assert_eq!(summary.page_count, 1);
}

#[tokio::test]
async fn preview_embeds_the_same_document() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write_fixture(dir.path(), "a.png", 4, 4, [9, 9, 9])];
    let html_path = dir.path().join("preview.html");

    let out = convert_and_preview(
        &inputs,
        &html_path,
        &ConversionConfig::default(),
        &edgequake_img2pdf::NoopIndicator,
    )
    .await
    .unwrap();

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("width=\"100%\""));
    assert!(html.contains(&edgequake_img2pdf::pdf_data_url(&out.pdf)));
    assert!(!dir.path().join("output.pdf").exists(), "preview does not save");
}

// ── Path inputs and sync wrapper ─────────────────────────────────────────────

#[tokio::test]
async fn local_paths_resolve_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        write_fixture(dir.path(), "one.png", 3, 7, [10, 10, 10]),
        write_fixture(dir.path(), "two.png", 7, 3, [240, 240, 240]),
    ];
    let out = convert(&inputs, &compact()).await.unwrap();
    assert_eq!(out.pages[0].source, inputs[0]);
    assert_eq!((out.pages[0].width, out.pages[0].height), (3, 7));
    assert_eq!((out.pages[1].width, out.pages[1].height), (7, 3));
}

#[test]
fn sync_wrapper_runs_outside_a_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write_fixture(dir.path(), "a.png", 2, 2, [0, 0, 0])];
    let out = convert_sync(&inputs, &ConversionConfig::default()).unwrap();
    assert_eq!(out.stats.page_count, 2);
}

#[test]
fn in_memory_conversion_with_block_on() {
    let out = tokio_test::block_on(convert_images(
        vec![solid_png("a.png", 2, 2, [50, 60, 70])],
        &compact(),
    ))
    .unwrap();
    assert_eq!(out.stats.page_count, 1);
    assert_eq!(out.stats.pdf_bytes, out.pdf.len());
}
