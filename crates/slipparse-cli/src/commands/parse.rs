//! Parse command - extract data from a single OCR text or document file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use slipparse_core::{OcrDocument, ParsedReceipt, ReceiptResult, SlipConfig, TemplateKey};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (.txt with raw OCR text, or .json with an OCR document)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Template key to force (skips detection)
    #[arg(short, long)]
    template: Option<String>,

    /// Show detection confidence and timing
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Load an input file into an OCR document. JSON files carry the full
/// document contract (layout included); text files are text-only.
pub fn load_document(path: &Path) -> anyhow::Result<OcrDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        "txt" | "text" => Ok(OcrDocument::from_text(fs::read_to_string(path)?)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Run one parse under the runtime policy: a wall-clock budget on a
/// blocking worker. A timeout or parser panic degrades to an empty
/// unknown-template record instead of failing the invocation; caller
/// mistakes (bad template key) stay hard errors.
pub async fn parse_with_policy(
    doc: OcrDocument,
    template: Option<String>,
    config: &SlipConfig,
) -> anyhow::Result<ParsedReceipt> {
    let budget = Duration::from_secs(config.runtime.parse_timeout_secs.max(1));
    let worker_config = config.clone();
    let worker = tokio::task::spawn_blocking(move || {
        slipparse_core::parse_receipt_with_config(&doc, template.as_deref(), &worker_config)
    });

    match tokio::time::timeout(budget, worker).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(join_error)) => {
            warn!("parser worker failed: {}", join_error);
            Ok(degraded_result(
                format!("parser failed: {}", join_error),
                budget,
            ))
        }
        Err(_) => {
            warn!("parse exceeded {}s budget", budget.as_secs());
            Ok(degraded_result(
                format!("parse exceeded {}s budget", budget.as_secs()),
                budget,
            ))
        }
    }
}

fn degraded_result(reason: String, budget: Duration) -> ParsedReceipt {
    ParsedReceipt {
        receipt: ReceiptResult::new(),
        template: TemplateKey::Unknown,
        confidence: 0.0,
        detected: false,
        warnings: vec![reason],
        processing_time_ms: budget.as_millis() as u64,
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        SlipConfig::from_file(Path::new(path))?
    } else {
        SlipConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let doc = load_document(&args.input)?;
    let parsed = parse_with_policy(doc, args.template.clone(), &config).await?;

    if !parsed.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &parsed.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_parsed(&parsed, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Template: {} ({})",
            style("ℹ").blue(),
            parsed.template,
            if parsed.detected { "detected" } else { "forced" }
        );
        println!(
            "{} Confidence: {:.1}%",
            style("ℹ").blue(),
            parsed.confidence * 100.0
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            parsed.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_parsed(parsed: &ParsedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&parsed.receipt)?),
        OutputFormat::Csv => format_csv(parsed),
        OutputFormat::Text => Ok(format_text(parsed)),
    }
}

pub fn summary_record(path: &Path, parsed: &ParsedReceipt) -> Vec<String> {
    let r = &parsed.receipt;
    vec![
        path.display().to_string(),
        parsed.template.to_string(),
        format!("{:.2}", parsed.confidence),
        r.merchant.name.clone().unwrap_or_default(),
        r.merchant
            .business_registration_number
            .clone()
            .unwrap_or_default(),
        r.meta.sale_date.clone().unwrap_or_default(),
        r.totals.total.map(|v| v.to_string()).unwrap_or_default(),
        r.items.len().to_string(),
        parsed.warnings.len().to_string(),
        parsed.processing_time_ms.to_string(),
    ]
}

pub const SUMMARY_HEADER: [&str; 10] = [
    "file",
    "template",
    "confidence",
    "merchant_name",
    "business_number",
    "sale_date",
    "total",
    "items",
    "warnings",
    "time_ms",
];

fn format_csv(parsed: &ParsedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SUMMARY_HEADER)?;
    wtr.write_record(summary_record(Path::new("-"), parsed))?;
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(parsed: &ParsedReceipt) -> String {
    let r = &parsed.receipt;
    let mut output = String::new();
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("Template: {}\n\n", parsed.template));
    output.push_str("Merchant:\n");
    output.push_str(&format!("  {}\n", opt(&r.merchant.name)));
    output.push_str(&format!(
        "  사업자번호: {}\n",
        opt(&r.merchant.business_registration_number)
    ));
    output.push_str(&format!(
        "  {} {}\n\n",
        opt(&r.meta.sale_date),
        opt(&r.meta.sale_time)
    ));

    if !r.items.is_empty() {
        output.push_str("Items:\n");
        for item in &r.items {
            output.push_str(&format!(
                "  {} x{} = {}\n",
                item.name,
                item.qty.unwrap_or(1),
                item.amount
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string())
            ));
        }
        output.push('\n');
    }

    output.push_str("Totals:\n");
    let amount = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    output.push_str(&format!("  합계:   {}\n", amount(r.totals.total)));
    output.push_str(&format!("  부가세: {}\n", amount(r.totals.vat)));
    if r.totals.discount.is_some() {
        output.push_str(&format!("  할인:   {}\n", amount(r.totals.discount)));
    }
    if let Some(brand) = &r.payment.card_brand {
        output.push_str(&format!("\nPayment: {}", brand));
        if let Some(masked) = &r.payment.masked_card_number {
            output.push_str(&format!(" ({})", masked));
        }
        output.push('\n');
    }

    output
}
