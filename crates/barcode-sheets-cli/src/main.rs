//! sscc-barcode CLI - stamps SSCC barcodes into spreadsheets

use anyhow::{Context, Result};
use barcode_sheets::prelude::*;
use barcode_sheets::{process_file_with_options, BarcodeRenderer};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sscc-barcode")]
#[command(
    author,
    version,
    about = "Embed an ITF barcode next to every SSCC in a spreadsheet"
)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp barcodes into the first worksheet and write a new workbook
    Stamp {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Directory for the output file (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// JSON file with stamping options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show which column holds the identifiers
    Detect {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// JSON file with stamping options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render one identifier as a PNG
    Render {
        /// 18-digit SSCC
        sscc: String,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with stamping options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Stamp {
            input,
            output_dir,
            config,
        } => stamp(&input, output_dir.as_deref(), config.as_deref()),
        Commands::Detect { input, config } => detect(&input, config.as_deref()),
        Commands::Render {
            sscc,
            output,
            config,
        } => render(&sscc, &output, config.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<StampOptions> {
    let Some(path) = config else {
        return Ok(StampOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config '{}'", path.display()))
}

fn stamp(input: &Path, output_dir: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let options = load_options(config)?;
    let done = process_file_with_options(input, output_dir, &options)
        .with_context(|| format!("Failed to stamp '{}'", input.display()))?;

    eprintln!(
        "Embedded {} barcodes ({} distinct, {} rows skipped)",
        done.report.images_embedded, done.report.distinct_identifiers, done.report.rows_skipped
    );
    println!("{}", done.path.display());
    Ok(())
}

fn detect(input: &Path, config: Option<&Path>) -> Result<()> {
    let options = load_options(config)?;
    let workbook = barcode_sheets::load_workbook(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let sheet = workbook
        .worksheet(0)
        .context("Workbook has no worksheets")?;

    let found = ColumnDetector::new(options.detector)
        .detect(sheet)
        .with_context(|| format!("No SSCC column in '{}'", input.display()))?;

    match found.phase {
        DetectionPhase::Header { row } => {
            println!("{}\theader\trow {}", found.column_letters(), row)
        }
        DetectionPhase::Statistical { matches } => {
            println!("{}\tvalues\t{} matches", found.column_letters(), matches)
        }
    }
    Ok(())
}

fn render(raw: &str, output: &Path, config: Option<&Path>) -> Result<()> {
    let options = load_options(config)?;
    let sscc: Sscc = raw.parse()?;
    if !sscc.check_digit_valid() {
        log::warn!("{} has an inconsistent check digit", sscc);
    }

    let png = BarcodeRenderer::new(options.render)
        .render_png(sscc.as_str())
        .context("Failed to render barcode")?;
    std::fs::write(output, png)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!("Wrote {}", output.display());
    Ok(())
}
