//! CLI binary for edgequake-img2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_img2pdf::{
    convert_and_preview, convert_and_save, inspect_file, BlankPagePolicy, ConversionConfig,
    ConversionProgressCallback, DecodeErrorPolicy, ImagePlacement, LoadingIndicator,
    NoopIndicator, PageSize, ProgressCallback, DEFAULT_OUTPUT_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Loading indicator + progress using indicatif ─────────────────────────────

/// Terminal spinner that doubles as the loading indicator: visible from the
/// moment conversion starts, cleared once the PDF is finalized.
struct CliProgress {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} images  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Converting");

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_for(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl LoadingIndicator for CliProgress {
    fn show(&self) {
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn hide(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgress {
    fn on_conversion_start(&self, total_images: usize) {
        self.bar.set_length(total_images as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_images} images…"))
        ));
    }

    fn on_image_start(&self, index: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
    }

    fn on_image_complete(&self, index: usize, total: usize, encoded_bytes: usize) {
        let secs = self.elapsed_for(index);
        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{:>6} KiB", encoded_bytes / 1024)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_for(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_images: usize, embedded: usize) {
        let skipped = self.errors.load(Ordering::SeqCst);
        if skipped == 0 {
            self.bar.println(format!(
                "{} {} images embedded",
                green("✔"),
                bold(&embedded.to_string())
            ));
        } else {
            self.bar.println(format!(
                "{} {}/{} images embedded  ({} skipped)",
                cyan("⚠"),
                bold(&embedded.to_string()),
                total_images,
                red(&skipped.to_string()),
            ));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Save scans as output.pdf in the current directory
  img2pdf scan-1.png scan-2.jpg

  # Choose the output file
  img2pdf *.jpg -o album.pdf

  # One page per image, no blank spacer pages
  img2pdf --no-blank-pages a.png b.png -o compact.pdf

  # Letter paper, image box 20mm in, 175×120mm
  img2pdf --page-size letter --placement 20,20,175,120 photo.webp

  # Write an HTML page that shows the PDF inline
  img2pdf --preview preview.html a.png b.png

  # Images from URLs, skipping anything that fails to decode
  img2pdf --skip-invalid https://example.com/1.png https://example.com/2.gif

  # Inspect a PDF (page count, embedded images)
  img2pdf --inspect-only output.pdf

PAGE LAYOUT:
  Every image is stretched into the same box regardless of its aspect
  ratio. Defaults: A4 portrait, box at x=10mm y=10mm, 190×150mm, and a
  blank page after every image (N images → 2N pages). With
  --no-blank-pages, N images → N pages; with --trailing-blank-only,
  N images → N + 1 pages. No images → one empty page.

ENVIRONMENT VARIABLES:
  RUST_LOG                Override log filter (e.g. edgequake_img2pdf=debug)
  IMG2PDF_OUTPUT          Default output path
  IMG2PDF_PAGE_SIZE       Default page size
"#;

/// Combine images into a single multi-page PDF.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Combine images into a single multi-page PDF",
    long_about = "Combine PNG, JPEG, GIF, BMP and WebP images (local files or URLs) into one PDF, \
one image per page, in the order given. Each image is re-encoded as JPEG and placed in a fixed box.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file paths or HTTP/HTTPS URLs, in page order.
    inputs: Vec<String>,

    /// Write the PDF to this file.
    #[arg(short, long, env = "IMG2PDF_OUTPUT", default_value = DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Write an HTML preview page embedding the PDF instead of saving it.
    #[arg(long, env = "IMG2PDF_PREVIEW")]
    preview: Option<PathBuf>,

    /// Page size: a4, a3, a5, letter, legal.
    #[arg(long, env = "IMG2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Image box in millimetres from the top-left corner: x,y,width,height.
    #[arg(long, env = "IMG2PDF_PLACEMENT", default_value = "10,10,190,150")]
    placement: String,

    /// JPEG quality for the embedded images (1–100).
    #[arg(long, env = "IMG2PDF_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Do not insert a blank page after each image.
    #[arg(long, env = "IMG2PDF_NO_BLANK_PAGES")]
    no_blank_pages: bool,

    /// Only add one blank page, after the last image.
    #[arg(long, env = "IMG2PDF_TRAILING_BLANK_ONLY", conflicts_with = "no_blank_pages")]
    trailing_blank_only: bool,

    /// Leave out images that fail to decode instead of aborting.
    #[arg(long, env = "IMG2PDF_SKIP_INVALID")]
    skip_invalid: bool,

    /// Print conversion results as JSON on stdout.
    #[arg(long, env = "IMG2PDF_JSON")]
    json: bool,

    /// Disable the progress indicator.
    #[arg(long, env = "IMG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Treat the first input as a PDF and print its structure only.
    #[arg(long)]
    inspect_only: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "IMG2PDF_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way while the spinner is drawing.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let path = cli
            .inputs
            .first()
            .context("--inspect-only needs a PDF path")?;
        let summary = inspect_file(path).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        } else {
            println!("File:         {}", path);
            println!("PDF Version:  {}", summary.pdf_version);
            println!("Pages:        {}", summary.page_count);
            for page in &summary.pages {
                match page.image {
                    Some(ref img) => println!(
                        "  page {:>3}  {:.0}×{:.0} pt  image {}×{} px  {} bytes",
                        page.page_num,
                        page.width_pt,
                        page.height_pt,
                        img.width,
                        img.height,
                        img.data.len()
                    ),
                    None => println!(
                        "  page {:>3}  {:.0}×{:.0} pt  blank",
                        page.page_num, page.width_pt, page.height_pt
                    ),
                }
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|p| p as Arc<dyn ConversionProgressCallback>),
    )?;
    let indicator: &dyn LoadingIndicator = match progress {
        Some(ref p) => p.as_ref(),
        None => &NoopIndicator,
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let (output, dest) = match cli.preview {
        Some(ref html) => (
            convert_and_preview(&cli.inputs, html, &config, indicator)
                .await
                .context("Conversion failed")?,
            html.clone(),
        ),
        None => (
            convert_and_save(&cli.inputs, &cli.output, &config, indicator)
                .await
                .context("Conversion failed")?,
            cli.output.clone(),
        ),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} images  {} pages  {}ms  →  {}",
            if stats.skipped_images == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.embedded_images,
            stats.input_images,
            stats.page_count,
            stats.total_duration_ms,
            bold(&dest.display().to_string()),
        );
        for page in output.pages.iter().filter(|p| p.error.is_some()) {
            if let Some(ref e) = page.error {
                eprintln!("   {} {}", red("skipped"), dim(&e.to_string()));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let placement = parse_placement(&cli.placement)?;

    let mut builder = ConversionConfig::builder()
        .page_size(cli.page_size.into())
        .placement(placement)
        .jpeg_quality(cli.quality)
        .blank_pages(if cli.no_blank_pages {
            BlankPagePolicy::None
        } else if cli.trailing_blank_only {
            BlankPagePolicy::TrailingOnly
        } else {
            BlankPagePolicy::AfterEachImage
        })
        .on_decode_error(if cli.skip_invalid {
            DecodeErrorPolicy::Skip
        } else {
            DecodeErrorPolicy::Abort
        })
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--placement` ("x,y,width,height" in mm) into an `ImagePlacement`.
fn parse_placement(s: &str) -> Result<ImagePlacement> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid placement value: '{}'", p.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    match parts.as_slice() {
        &[x_mm, y_mm, width_mm, height_mm] => Ok(ImagePlacement {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        }),
        _ => anyhow::bail!(
            "Placement must be four numbers x,y,width,height (got {} values)",
            parts.len()
        ),
    }
}
