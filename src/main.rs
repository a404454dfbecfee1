use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::{error, info};

use post_id_replacer::config::{Config, LocatorStrategy};
use post_id_replacer::logging;
use post_id_replacer::pipeline::ingestion::{collect_from_dir, collect_from_paths};
use post_id_replacer::pipeline::{DocumentOutcome, FsSink, Pipeline, RunSummary};

/// Replace Postnr values in XML files using a `Postnr;Id` CSV mapping
///
/// Every candidate field whose trimmed text is a `Postnr` in the CSV is rewritten
/// to the matching `Id`. Only documents with at least one replacement are written
/// to the output directory.
#[derive(Parser, Debug)]
#[command(name = "post_id_replacer")]
#[command(version, about, long_about)]
struct Cli {
    /// Semicolon-delimited CSV with `Postnr` and `Id` columns
    #[arg(short, long, value_name = "CSV")]
    mapping: PathBuf,

    /// Process every *.xml file in this directory (sorted by name)
    #[arg(short, long, value_name = "DIR", conflicts_with = "files")]
    input_dir: Option<PathBuf>,

    /// XML files to process, in the order given
    #[arg(value_name = "FILES", required_unless_present = "input_dir")]
    files: Vec<PathBuf>,

    /// Directory modified documents are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: PathBuf,

    /// Where candidate fields are looked for [default: flat, or the config file's strategy]
    #[arg(short, long, value_enum)]
    locator: Option<LocatorStrategy>,

    /// Prefix for output file names, e.g. "modified_"
    #[arg(short, long)]
    prefix: Option<String>,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,

    /// TOML file with locator tag names and output settings
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Also write JSON logs, rotated daily, to this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides this
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Run summary ({}):", summary.locator);
    for entry in &summary.documents {
        match &entry.outcome {
            DocumentOutcome::Serialized { report, artifact } => {
                println!("   ✅ {} -> {}", entry.name, artifact);
                for replacement in &report.replacements {
                    println!("      {} => {}", replacement.original, replacement.replacement);
                }
            }
            DocumentOutcome::Skipped { report } => {
                println!(
                    "   ⚠️  {}: no changes ({} candidate values, none in mapping)",
                    entry.name,
                    report.candidates.len()
                );
            }
            DocumentOutcome::Failed { error } => {
                println!("   ❌ {}: {}", entry.name, error.message);
            }
        }
    }
    println!(
        "   Written: {}  Unchanged: {}  Failed: {}  Replacements: {}",
        summary.serialized(),
        summary.skipped(),
        summary.failed(),
        summary.total_replacements()
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.verbose, cli.log_dir.as_deref());

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let locator = config.locator(cli.locator);
    let prefix = cli.prefix.clone().unwrap_or_else(|| config.output.prefix.clone());

    info!("Reading CSV file {}", cli.mapping.display());
    let pipeline = match Pipeline::from_csv_path(&cli.mapping, locator) {
        Ok(pipeline) => {
            info!("Loaded {} Postnr mappings", pipeline.mapping().len());
            pipeline.with_prefix(prefix)
        }
        Err(e) => {
            error!("Error reading CSV file: {}", e);
            return Err(e.into());
        }
    };

    let documents = match &cli.input_dir {
        Some(dir) => collect_from_dir(dir)
            .with_context(|| format!("Failed to list input directory '{}'", dir.display()))?,
        None => collect_from_paths(&cli.files),
    };

    let sink = FsSink::new(&cli.output_dir);
    pipeline.ensure_inputs_preserved(&documents, sink.output_dir())?;
    let summary = pipeline.run(&documents, &sink);
    print_summary(&summary);

    if let Some(path) = &cli.report {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write report '{}'", path.display()))?;
        info!("Wrote run summary to {}", path.display());
    }

    Ok(())
}
