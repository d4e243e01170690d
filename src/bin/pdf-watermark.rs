//! PDF Watermark CLI tool
//!
//! A command-line tool for stamping a translucent PNG watermark onto PDFs.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;

use pdf_watermark::pdf::{extract_metadata, PdfiumRasterizer};
use pdf_watermark::settings::{
    MaskSettings, RasterSettings, WatermarkSettings, DEFAULT_DPI, DEFAULT_MARGIN,
    DEFAULT_MASK_ALPHA,
};
use pdf_watermark::watermark::Watermarker;
use pdf_watermark::Error;

/// PDF Watermark - Stamp a translucent watermark onto every page of a PDF
#[derive(Parser)]
#[command(name = "pdf-watermark")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Watermark a single PDF
    pdf-watermark apply input.pdf --watermark logo.png -o watermarked.pdf

    # Watermark every PDF in a folder
    pdf-watermark batch \"handouts/*.pdf\" --watermark logo.png --output-dir out

    # Render at 150 dpi with a lighter mark
    pdf-watermark --dpi 150 --mask-alpha 32 apply input.pdf --watermark logo.png -o out.pdf")]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,

    /// Log every page as it is processed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RenderArgs {
    /// Rendering resolution for PDF pages
    #[arg(long, global = true, env = "PDF_WATERMARK_DPI", default_value_t = DEFAULT_DPI)]
    dpi: f32,

    /// Opacity (0-255) given to the non-white parts of the watermark
    #[arg(long, global = true, env = "PDF_WATERMARK_ALPHA", default_value_t = DEFAULT_MASK_ALPHA)]
    mask_alpha: u8,

    /// Distance in pixels from the bottom-right page corner
    #[arg(long, global = true, env = "PDF_WATERMARK_MARGIN", default_value_t = DEFAULT_MARGIN)]
    margin: u32,

    /// Directory containing the PDFium shared library
    #[arg(long, global = true, env = "PDFIUM_DYNAMIC_LIB_PATH")]
    pdfium_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watermark a single PDF file
    Apply {
        /// Input PDF file
        input: PathBuf,

        /// Watermark PNG image
        #[arg(short, long)]
        watermark: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Watermark several PDF files with the same image
    Batch {
        /// Input PDF files. Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Watermark PNG image
        #[arg(short, long)]
        watermark: PathBuf,

        /// Directory for the watermarked files
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Apply { input, watermark, output, open } => {
            cmd_apply(&cli.render, input, watermark, output, open)
        }
        Commands::Batch { inputs, watermark, output_dir } => {
            cmd_batch(&cli.render, inputs, watermark, output_dir)
        }
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        match e.downcast_ref::<Error>() {
            Some(inner) => eprintln!("Error ({}): {:#}", inner.kind(), e),
            None => eprintln!("Error: {:#}", e),
        }
        process::exit(1);
    }
}

/// Build the pipeline from the global rendering options
fn build_watermarker(render: &RenderArgs) -> anyhow::Result<Watermarker<PdfiumRasterizer>> {
    if render.dpi.is_nan() || render.dpi <= 0.0 {
        bail!("--dpi must be a positive number, got {}", render.dpi);
    }

    let rasterizer = PdfiumRasterizer::with_library_dir(
        render.pdfium_dir.as_deref(),
        RasterSettings { dpi: render.dpi },
    )?;

    let settings = WatermarkSettings {
        mask: MaskSettings { alpha: render.mask_alpha },
        margin: render.margin,
    };

    Ok(Watermarker::new(rasterizer, settings))
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern)? {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => log::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                bail!("No files matched pattern: {}", pattern);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();
    paths.dedup();

    Ok(paths)
}

/// Output path for one batch input: `<dir>/<stem>-watermarked.pdf`
fn batch_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}-watermarked.pdf", stem))
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Watermark one PDF
fn cmd_apply(
    render: &RenderArgs,
    input: PathBuf,
    watermark: PathBuf,
    output: PathBuf,
    open: bool,
) -> anyhow::Result<()> {
    let watermarker = build_watermarker(render)?;

    watermarker
        .apply_files(&watermark, &input, &output)
        .with_context(|| format!("failed to watermark {}", input.display()))?;

    eprintln!("Output: {}", output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Watermark several PDFs into one directory
fn cmd_batch(
    render: &RenderArgs,
    inputs: Vec<String>,
    watermark: PathBuf,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    let inputs = expand_globs(inputs)?;
    let watermarker = build_watermarker(render)?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    eprintln!("Watermarking {} PDF files...", inputs.len());

    for (i, input) in inputs.iter().enumerate() {
        let output = batch_output_path(&output_dir, input);
        watermarker
            .apply_files(&watermark, input, &output)
            .with_context(|| format!("failed to watermark {}", input.display()))?;
        eprintln!("  [{}/{}] {}", i + 1, inputs.len(), output.display());
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    for (i, size) in metadata.page_sizes.iter().enumerate() {
        match size {
            Some(size) => println!("  Page {}: {} x {} pt", i + 1, size.width, size.height),
            None => println!("  Page {}: unknown size", i + 1),
        }
    }

    Ok(())
}
