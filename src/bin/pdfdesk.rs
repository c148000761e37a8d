//! CLI binary for pdfdesk.
//!
//! A thin shim over the library crate: flags map to `ConversionParams` and
//! `ConversionConfig`, input paths become `UploadedFile`s, and the packaged
//! artifacts are written to the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfdesk::{
    convert_async, package, write_artifacts, ConversionConfig, ConversionParams,
    ConversionProgressCallback, ConversionTask, PageSize, ProgressCallback, UploadedFile,
};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress bar. Starts as a spinner; the length is corrected as
/// adapters report the real item count (pages are only known once the PDF
/// is open).
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} items  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, task: ConversionTask, total_items: usize) {
        self.bar.set_prefix(task.label());
        self.bar.set_length(total_items as u64);
    }

    fn on_item_complete(&self, item: usize, total_items: usize) {
        if self.bar.length() != Some(total_items as u64) {
            self.bar.set_length(total_items as u64);
        }
        self.bar.set_position(item as u64);
    }

    fn on_conversion_complete(&self, _task: ConversionTask, _succeeded: bool) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"TASKS:
  images-to-pdf   one or more JPEG/PNG images → images_to_pdf.pdf
  pdf-to-jpg      one PDF → page_1.jpg, page_2.jpg, …
  docx-to-pdf     one DOCX → docx_to_pdf.pdf (text only)
  pdf-to-docx     one PDF → converted.docx (text only)
  merge-pdfs      one or more PDFs → merged.pdf
  split-pdf       one PDF + --start-page/--end-page → split.pdf
  protect-pdf     one PDF + --password → protected.pdf

EXAMPLES:
  # Scan pages to a single PDF
  pdfdesk images-to-pdf scan1.jpg scan2.png -o out/

  # Pages 2 to 4 of a report
  pdfdesk split-pdf report.pdf --start-page 2 --end-page 4

  # Render every page at 300 DPI
  pdfdesk pdf-to-jpg slides.pdf --dpi 300 -o slides/

  # Machine-readable manifest of what was written
  pdfdesk merge-pdfs a.pdf b.pdf --json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory); needed by
                      pdf-to-jpg and pdf-to-docx
  RUST_LOG            Override the log filter (e.g. pdfdesk=debug)
"#;

/// Everyday PDF, image and DOCX conversions.
#[derive(Parser, Debug)]
#[command(
    name = "pdfdesk",
    version,
    about = "Everyday PDF, image and DOCX conversions",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Conversion to run.
    #[arg(value_enum)]
    task: TaskArg,

    /// Input files, in order.
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory to write artifacts into.
    #[arg(short, long, env = "PDFDESK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// First page to keep (split-pdf, 1-based).
    #[arg(long, env = "PDFDESK_START_PAGE")]
    start_page: Option<u32>,

    /// Last page to keep (split-pdf, inclusive; clamped to the page count).
    #[arg(long, env = "PDFDESK_END_PAGE")]
    end_page: Option<u32>,

    /// Password for protect-pdf.
    #[arg(long, env = "PDFDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Rendering DPI for pdf-to-jpg (72–600).
    #[arg(long, env = "PDFDESK_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Cap on the longest rendered edge in pixels.
    #[arg(long, env = "PDFDESK_MAX_PIXELS", default_value_t = 4000)]
    max_pixels: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDFDESK_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Page size for docx-to-pdf.
    #[arg(long, env = "PDFDESK_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFDESK_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Print a JSON manifest of written artifacts instead of one line each.
    #[arg(long, env = "PDFDESK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFDESK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFDESK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFDESK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TaskArg {
    ImagesToPdf,
    PdfToJpg,
    DocxToPdf,
    PdfToDocx,
    MergePdfs,
    SplitPdf,
    ProtectPdf,
}

impl From<TaskArg> for ConversionTask {
    fn from(v: TaskArg) -> Self {
        match v {
            TaskArg::ImagesToPdf => ConversionTask::ImagesToPdf,
            TaskArg::PdfToJpg => ConversionTask::PdfToJpg,
            TaskArg::DocxToPdf => ConversionTask::DocxToPdf,
            TaskArg::PdfToDocx => ConversionTask::PdfToDocx,
            TaskArg::MergePdfs => ConversionTask::MergePdfs,
            TaskArg::SplitPdf => ConversionTask::SplitPdf,
            TaskArg::ProtectPdf => ConversionTask::ProtectPdf,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs are suppressed while the progress bar is up.
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

    // ── Read inputs ──────────────────────────────────────────────────────
    let task: ConversionTask = cli.task.into();
    let files = cli
        .inputs
        .iter()
        .map(|path| {
            UploadedFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let params = build_params(&cli);

    // ── Run conversion ───────────────────────────────────────────────────
    let started = Instant::now();
    let result = convert_async(task, files, params, config).await;

    let artifacts = match package(result, task) {
        Ok(artifacts) => artifacts,
        Err(failure) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "task": task, "error": failure }))
                        .context("Failed to serialise failure")?
                );
            } else if !cli.quiet {
                eprintln!("{} {}", red("✘"), bold(task.label()));
            }
            return Err(anyhow::Error::new(failure).context(format!("{} failed", task.label())));
        }
    };

    let paths = write_artifacts(&artifacts, &cli.output_dir).context("Failed to write output")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let entries: Vec<_> = artifacts
            .iter()
            .zip(&paths)
            .map(|(artifact, path)| {
                json!({
                    "filename": artifact.filename,
                    "content_type": artifact.content_type,
                    "size": artifact.size,
                    "path": path,
                })
            })
            .collect();
        let manifest = json!({
            "task": task,
            "artifacts": entries,
            "duration_ms": started.elapsed().as_millis() as u64,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&manifest).context("Failed to serialise manifest")?
        );
    } else if !cli.quiet {
        for (artifact, path) in artifacts.iter().zip(&paths) {
            println!(
                "{}  {}  {}",
                green("✓"),
                path.display(),
                dim(&format!("{} bytes", artifact.size))
            );
        }
        eprintln!(
            "{} {}: {} file(s) in {}ms",
            green("✔"),
            bold(task.label()),
            paths.len(),
            started.elapsed().as_millis()
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .max_rendered_pixels(cli.max_pixels)
        .jpeg_quality(cli.jpeg_quality)
        .page_size(cli.page_size.into());

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to `ConversionParams`. Range and password checks happen in
/// the library's validator.
fn build_params(cli: &Cli) -> ConversionParams {
    let mut params = ConversionParams::new();
    if let Some(start) = cli.start_page {
        params = params.start_page(start);
    }
    if let Some(end) = cli.end_page {
        params = params.end_page(end);
    }
    if let Some(ref password) = cli.password {
        params = params.password(password.clone());
    }
    params
}
