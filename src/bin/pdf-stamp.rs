//! PDF Stamp CLI tool
//!
//! A command-line tool for numbering PDF pages and stamping logos and text.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use pdf_stamp_tools::numbering::NumberEnclosure;
use pdf_stamp_tools::pdf::{
    pdf_info, put_image, put_logo_with_text, put_text, stamp_pdf,
    ImageStamp, LogoTextOptions, PdfSource, StampOptions, StandardFont, TextStamp,
};
use pdf_stamp_tools::units::mm;

/// PDF Stamp - Number pages and stamp logos and text onto PDFs
#[derive(Parser)]
#[command(name = "pdf-stamp")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Number a set of chapters continuously into out/
    pdf-stamp stamp --out-dir out \"chapters/*.pdf\"

    # Build a header and number a single document with it
    pdf-stamp header -o header.pdf --logo logo.png --line \"Course 101\" --line \"Week 3\"
    pdf-stamp stamp notes.pdf -o notes-stamped.pdf --overlay header.pdf --enclosure parens

    # Put a text block on the first page, in place
    pdf-stamp text draft.pdf --line \"DRAFT\" --x-mm 20 --y-mm 280")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Number the pages of one or more PDFs, continuing across files
    Stamp {
        /// Input PDF files. Supports glob patterns like "*.pdf"; stamped in sorted order
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Directory to write stamped files to, under their original names
        #[arg(long, required_unless_present = "output", conflicts_with = "output")]
        out_dir: Option<PathBuf>,

        /// Output PDF file path (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// PDF whose first page is drawn on the first page of every input
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Number decoration: en_dash, em_dash, minus, parens, page or Page
        #[arg(long, default_value = "em_dash")]
        enclosure: String,

        /// Number of the first page
        #[arg(long, default_value_t = 1)]
        start: u32,

        /// Distance of the number's baseline from the page bottom, in mm
        #[arg(long, default_value_t = 10.5)]
        offset_mm: f32,

        /// Standard PDF font name
        #[arg(long, default_value = "Times-Roman")]
        font: String,
    },

    /// Create a one-page header with a logo and text lines
    Header {
        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Text line, repeat for more lines
        #[arg(long = "line")]
        lines: Vec<String>,

        /// Logo image (PNG or JPEG)
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Left edge of the logo, in mm
        #[arg(long, default_value_t = 84.0)]
        x_mm: f32,

        /// Bottom edge of the logo, in mm
        #[arg(long, default_value_t = 272.0)]
        y_mm: f32,

        /// Logo width, in mm
        #[arg(long, default_value_t = 18.0)]
        logo_width_mm: f32,

        /// Font size in points
        #[arg(long, default_value_t = 8.0)]
        font_size: f32,

        /// Standard PDF font name
        #[arg(long, default_value = "Times-Roman")]
        font: String,
    },

    /// Put an image on the first page of a PDF, in place
    Image {
        /// PDF to modify
        target: PathBuf,

        /// Image file (PNG or JPEG)
        #[arg(long)]
        image: PathBuf,

        /// Displayed width, in mm
        #[arg(long)]
        width_mm: f32,

        /// Left edge, in mm
        #[arg(long)]
        x_mm: f32,

        /// Bottom edge, in mm
        #[arg(long)]
        y_mm: f32,
    },

    /// Put lines of text on the first page of a PDF, in place
    Text {
        /// PDF to modify
        target: PathBuf,

        /// Text line, repeat for more lines
        #[arg(long = "line", required = true)]
        lines: Vec<String>,

        /// Left edge of the text, in mm
        #[arg(long)]
        x_mm: f32,

        /// Baseline of the first line, in mm
        #[arg(long)]
        y_mm: f32,

        /// Font size in points
        #[arg(long, default_value_t = 8.0)]
        font_size: f32,

        /// Standard PDF font name
        #[arg(long, default_value = "Times-Roman")]
        font: String,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Stamp {
            inputs, out_dir, output, overlay, enclosure, start, offset_mm, font,
        } => {
            cmd_stamp(inputs, out_dir, output, overlay, &enclosure, start, offset_mm, &font)
        }
        Commands::Header {
            output, lines, logo, x_mm, y_mm, logo_width_mm, font_size, font,
        } => {
            cmd_header(output, lines, logo, x_mm, y_mm, logo_width_mm, font_size, &font)
        }
        Commands::Image { target, image, width_mm, x_mm, y_mm } => {
            cmd_image(target, image, width_mm, x_mm, y_mm)
        }
        Commands::Text { target, lines, x_mm, y_mm, font_size, font } => {
            cmd_text(target, lines, x_mm, y_mm, font_size, &font)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
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

    // Numbering continues in this order
    paths.sort();

    Ok(paths)
}

fn parse_font(name: &str) -> Result<StandardFont> {
    name.parse::<StandardFont>().with_context(|| {
        let known: Vec<&str> = StandardFont::ALL.iter().map(|f| f.base_font()).collect();
        format!("Known fonts: {}", known.join(", "))
    })
}

/// Number the pages of every input, chaining page numbers
#[allow(clippy::too_many_arguments)]
fn cmd_stamp(
    inputs: Vec<String>,
    out_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    overlay: Option<PathBuf>,
    enclosure: &str,
    start: u32,
    offset_mm: f32,
    font: &str,
) -> Result<()> {
    let inputs = expand_globs(inputs)?;

    let enclosure: NumberEnclosure = enclosure.parse().with_context(|| {
        let known: Vec<&str> = NumberEnclosure::ALL.iter().map(|e| e.key()).collect();
        format!("Known enclosures: {}", known.join(", "))
    })?;

    let outputs: Vec<PathBuf> = match (out_dir, output) {
        (_, Some(output)) => {
            if inputs.len() != 1 {
                bail!("--output takes exactly one input, got {}; use --out-dir", inputs.len());
            }
            vec![output]
        }
        (Some(dir), None) => {
            let outputs = outputs_in_dir(&dir, &inputs)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            outputs
        }
        (None, None) => bail!("Either --out-dir or --output is required"),
    };

    let mut options = StampOptions {
        first_page_overlay: overlay.map(PdfSource::from),
        enclosure,
        start_num: start,
        vertical_offset: mm(offset_mm),
        font: parse_font(font)?,
    };

    eprintln!("Stamping {} PDF files...", inputs.len());

    for (input, output) in inputs.iter().zip(&outputs) {
        let next = stamp_pdf(input.as_path(), output.as_path(), &options)
            .with_context(|| format!("Failed to stamp {}", input.display()))?;
        eprintln!(
            "  {} -> {} (pages {}-{})",
            input.display(),
            output.display(),
            options.start_num,
            next.saturating_sub(1)
        );
        options.start_num = next;
    }

    println!("{}", options.start_num);

    Ok(())
}

/// Output path in `dir` for every input, under the input's file name
///
/// Two inputs with the same file name would overwrite each other, so that
/// is an error.
fn outputs_in_dir(dir: &Path, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut outputs = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = match input.file_name() {
            Some(name) => dir.join(name),
            None => bail!("Input has no file name: {}", input.display()),
        };
        if let Some(previous) = claimed.insert(output.clone(), input) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                output.display()
            );
        }
        outputs.push(output);
    }

    Ok(outputs)
}

/// Create a logo-and-text header page
#[allow(clippy::too_many_arguments)]
fn cmd_header(
    output: PathBuf,
    lines: Vec<String>,
    logo: Option<PathBuf>,
    x_mm: f32,
    y_mm: f32,
    logo_width_mm: f32,
    font_size: f32,
    font: &str,
) -> Result<()> {
    let options = LogoTextOptions {
        text_lines: lines,
        logo_file: logo,
        pos_x: mm(x_mm),
        pos_y: mm(y_mm),
        logo_width: mm(logo_width_mm),
        fontsize: font_size,
        font: parse_font(font)?,
    };

    put_logo_with_text(output.as_path(), &options)
        .with_context(|| format!("Failed to write header {}", output.display()))?;

    eprintln!("Output: {}", output.display());

    Ok(())
}

/// Put an image on the first page of a PDF
fn cmd_image(target: PathBuf, image: PathBuf, width_mm: f32, x_mm: f32, y_mm: f32) -> Result<()> {
    let stamp = ImageStamp {
        img_file: image,
        img_width: mm(width_mm),
        x: mm(x_mm),
        y: mm(y_mm),
    };

    put_image(target.as_path(), &stamp)
        .with_context(|| format!("Failed to stamp image onto {}", target.display()))?;

    eprintln!("Output: {}", target.display());

    Ok(())
}

/// Put lines of text on the first page of a PDF
fn cmd_text(target: PathBuf, lines: Vec<String>, x_mm: f32, y_mm: f32, font_size: f32, font: &str) -> Result<()> {
    let stamp = TextStamp {
        text_lines: lines,
        x: mm(x_mm),
        y: mm(y_mm),
        fontsize: font_size,
        font: parse_font(font)?,
    };

    put_text(target.as_path(), &stamp)
        .with_context(|| format!("Failed to stamp text onto {}", target.display()))?;

    eprintln!("Output: {}", target.display());

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let info = pdf_info(&PdfSource::from(input.as_path()))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", info.page_count);

    if let Some(title) = info.title {
        println!("Title: {}", title);
    }

    for (index, page_box) in info.page_boxes.iter().enumerate() {
        println!(
            "  Page {}: {:.1} x {:.1} pt ({:.1} x {:.1} mm)",
            index + 1,
            page_box.width(),
            page_box.height(),
            page_box.width() / mm(1.0),
            page_box.height() / mm(1.0)
        );
    }

    Ok(())
}
