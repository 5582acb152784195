//! Quote command - price a batch of documents.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use printdesk_core::{CostCalculator, CostQuote, Document};

use super::config;

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Documents to price (PDF or DOCX)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Monochrome page range per file, in file order
    #[arg(short, long = "pages", value_name = "EXPR")]
    pages: Vec<String>,

    /// Colored page range per file, in file order
    #[arg(short = 'C', long = "colored", value_name = "EXPR")]
    colored: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: QuoteFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum QuoteFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: QuoteArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let doc = super::read_document(path, "", "")?;
        files.push((doc.filename, doc.bytes));
    }
    let documents = Document::zip_parts(files, args.pages, args.colored)?;

    let calculator = CostCalculator::from_config(&config)?;
    info!("Quoting {} documents", documents.len());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Pricing {} documents...", documents.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = calculator.compute_cost(&documents);
    pb.finish_and_clear();
    let quote = result?;

    let output = match args.format {
        QuoteFormat::Json => serde_json::to_string(&quote)?,
        QuoteFormat::Text => format_text(&quote),
    };
    println!("{}", output);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_text(quote: &CostQuote) -> String {
    let mut output = String::new();

    for item in &quote.items {
        output.push_str(&format!("{} ({})\n", item.filename, item.format));
        output.push_str(&format!("  Content pages:    {}\n", item.black_pages));
        output.push_str(&format!("  Low output pages: {}\n", item.non_black_pages));
        output.push_str(&format!("  Colored pages:    {}\n", item.colored_pages));
        output.push_str(&format!("  Cost:             {}\n", item.cost));
    }

    if !quote.items.is_empty() {
        output.push('\n');
    }
    output.push_str(&format!("{} {}", style("Total:").bold(), quote.total));

    output
}
