//! Batch command - parse many files and optionally write a summary CSV.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use slipparse_core::SlipConfig;

use super::parse::{self, load_document, parse_with_policy, OutputFormat, SUMMARY_HEADER};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files, or directories to scan for .txt/.json files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Template key to force for every file (skips detection)
    #[arg(short, long)]
    template: Option<String>,

    /// Continue past files that fail to load or parse
    #[arg(long)]
    continue_on_error: bool,
}

fn is_input_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(ext.as_str(), "txt" | "text" | "json")
}

/// Expand files and directories into a flat, sorted file list.
fn collect_files(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_input_file(&path) {
                    files.push(path);
                }
            }
        } else if is_input_file(input) {
            files.push(input.clone());
        } else {
            warn!("skipping unsupported input: {}", input.display());
        }
    }
    files.sort();
    Ok(files)
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        SlipConfig::from_file(Path::new(path))?
    } else {
        SlipConfig::default()
    };

    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No .txt or .json input files found");
    }

    println!(
        "{} Found {} files to parse",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut summary_rows: Vec<Vec<String>> = Vec::with_capacity(files.len());
    let mut failures = 0usize;

    for path in &files {
        pb.set_message(path.display().to_string());

        let outcome = match load_document(path) {
            Ok(doc) => parse_with_policy(doc, args.template.clone(), &config).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(parsed) => {
                if let Some(ref output_dir) = args.output_dir {
                    let output = parse::format_parsed(&parsed, args.format)?;
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("result");
                    let ext = match args.format {
                        OutputFormat::Json => "json",
                        OutputFormat::Csv => "csv",
                        OutputFormat::Text => "txt",
                    };
                    fs::write(output_dir.join(format!("{}.{}", name, ext)), output)?;
                }
                summary_rows.push(parse::summary_record(path, &parsed));
            }
            Err(e) => {
                failures += 1;
                if args.continue_on_error {
                    warn!("failed on {}: {}", path.display(), e);
                } else {
                    pb.abandon();
                    return Err(e.context(format!("failed on {}", path.display())));
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    if let Some(summary_path) = &args.summary {
        let mut wtr = csv::Writer::from_path(summary_path)?;
        wtr.write_record(SUMMARY_HEADER)?;
        for row in &summary_rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!(
        "{} Parsed {}/{} files in {:.1}s",
        style("✓").green(),
        files.len() - failures,
        files.len(),
        start.elapsed().as_secs_f32()
    );
    debug!("batch finished in {:?}", start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_file_filter() {
        assert!(is_input_file(Path::new("slip.txt")));
        assert!(is_input_file(Path::new("slip.JSON")));
        assert!(!is_input_file(Path::new("slip.pdf")));
        assert!(!is_input_file(Path::new("slip")));
    }
}
