//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, converts page 1 and writes the PNG next to the input.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    CapabilityLoader, ConversionConfig, ConversionObserver, ConversionResult, Converter,
    EndpointConfig, PdfFile, PdfiumInitializer, Stage,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Stage spinner ────────────────────────────────────────────────────────────

/// Spinner whose message follows the pipeline stage.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new(name: &str) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix(name.to_string());
        bar.set_message("starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionObserver for CliObserver {
    fn on_stage(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_finished(&self, _result: &ConversionResult) {
        self.bar.finish_and_clear();
    }
}

// ── Engine download bar ──────────────────────────────────────────────────────

fn download_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    bar.set_prefix("PDF engine");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert page 1, writing report.png next to report.pdf
  pdf2img report.pdf

  # Choose the output file
  pdf2img scan.PDF -o thumbs/scan.png

  # Smaller preview: longest edge 512 px, no upscaling beyond 2x
  pdf2img --max-dimension 512 --max-scale 2 deck.pdf

  # Machine-readable result
  pdf2img --json report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium, skips auto-download
  PDF2IMG_CACHE_DIR       Override the engine cache directory
  PDF2IMG_ENGINE_URL      Release URL template ({version} and {archive} slots)
  PDF2IMG_ENGINE_VERSION  Pinned PDFium release
  PDF2IMG_ENGINE_DIR      Fallback directory holding the platform library
  RUST_LOG                Log filter (overrides -v/-q)

SETUP:
  PDFium (~30 MB) is downloaded automatically on first run and cached in
  ~/.cache/pdf2img/pdfium-<version>/. No manual library setup is required.
"#;

/// Convert the first page of a PDF into a PNG image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert the first page of a PDF into a PNG image",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Write the PNG here instead of next to the input.
    #[arg(short, long, env = "PDF2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the conversion result as JSON.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Longest edge, in pixels, that upscaling aims for.
    #[arg(long, env = "PDF2IMG_MAX_DIMENSION")]
    max_dimension: Option<f32>,

    /// Smallest render multiplier (≥ 1).
    #[arg(long, env = "PDF2IMG_MIN_SCALE")]
    min_scale: Option<f32>,

    /// Largest render multiplier.
    #[arg(long, env = "PDF2IMG_MAX_SCALE")]
    max_scale: Option<f32>,

    /// Encode through a data URL instead of the native PNG encoder.
    #[arg(long, env = "PDF2IMG_NO_NATIVE_ENCODING")]
    no_native_encoding: bool,

    /// Disable progress output.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep library INFO
    // logs out of its way unless asked for.
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

    // ── Engine loader ────────────────────────────────────────────────────
    // A download bar is only worth showing when the engine is not cached.
    let endpoints = EndpointConfig::from_env();
    let initializer = if show_progress && !pdfium_fetch::is_cached(&endpoints.version) {
        let bar = download_bar();
        PdfiumInitializer::with_progress(Arc::new(move |downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
            if total == Some(downloaded) {
                bar.finish_with_message("ready ✓");
            }
        }))
    } else {
        PdfiumInitializer::default()
    };
    let loader = Arc::new(CapabilityLoader::new(endpoints, initializer));

    // ── Convert ──────────────────────────────────────────────────────────
    let file = PdfFile::from_path(&cli.input);
    let observer = show_progress.then(|| CliObserver::new(file.name()));
    let config = build_config(&cli, observer)?;
    let converter = Converter::with_loader(loader, config);

    let result = converter.convert(&file).await;

    if let Some(error) = &result.error {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("Failed to serialise result")?
            );
        }
        anyhow::bail!("{}", red(error));
    }

    // ── Write output ─────────────────────────────────────────────────────
    let image = result
        .file
        .as_ref()
        .context("Conversion succeeded without an image")?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, &image.name));

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&output_path, image.bytes())
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}  {}",
            green("✔"),
            file.name(),
            bold(&output_path.display().to_string()),
            dim(&format!("{} bytes", image.size())),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, observer: Option<Arc<CliObserver>>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().native_encoding(!cli.no_native_encoding);

    if let Some(px) = cli.max_dimension {
        builder = builder.max_dimension(px);
    }
    if let Some(s) = cli.min_scale {
        builder = builder.min_scale(s);
    }
    if let Some(s) = cli.max_scale {
        builder = builder.max_scale(s);
    }
    if let Some(o) = observer {
        builder = builder.observer(o);
    }

    builder.build().context("Invalid configuration")
}

/// `dir/report.pdf` → `dir/report.png`.
fn default_output(input: &Path, png_name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(png_name))
        .unwrap_or_else(|| PathBuf::from(png_name))
}
