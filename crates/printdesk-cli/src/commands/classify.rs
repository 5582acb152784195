//! Classify command - per-page ink coverage of a single document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use printdesk_core::{Classification, CostCalculator, PageClass};

use super::config;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input file (PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Pages to classify
    #[arg(short, long, value_name = "EXPR")]
    pages: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
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

#[derive(Serialize)]
struct ReportRow {
    page: u32,
    coverage: f32,
    class: PageClass,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let document = super::read_document(&args.input, &args.pages, "")?;

    info!("Classifying {}", args.input.display());
    let calculator = CostCalculator::from_config(&config)?;
    let classification = calculator.classify_document(&document)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string(&classification)?,
        OutputFormat::Csv => format_csv(&classification)?,
        OutputFormat::Text => format_text(&classification),
    };

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

    Ok(())
}

fn format_csv(classification: &Classification) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for report in &classification.reports {
        wtr.serialize(ReportRow {
            page: report.page,
            coverage: report.coverage,
            class: report.class,
        })?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(classification: &Classification) -> String {
    let mut output = format!("Pages in document: {}\n", classification.page_count);

    for report in &classification.reports {
        let class = match report.class {
            PageClass::Content => style("content").green(),
            PageClass::LowOutput => style("low output").yellow(),
        };
        output.push_str(&format!(
            "  Page {:>4}: {:>6.2}% {}\n",
            report.page,
            report.coverage * 100.0,
            class
        ));
    }

    output.push_str(&format!(
        "Content: {}, low output: {}",
        classification.black_content.len(),
        classification.non_black.len()
    ));

    output
}
