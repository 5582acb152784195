//! Ranges command - expand a page range expression.

use clap::Args;
use console::style;

use printdesk_core::{PrintdeskError, parse_page_ranges};

/// Arguments for the ranges command.
#[derive(Args)]
pub struct RangesArgs {
    /// Range expression, e.g. "1-3,5"
    expr: String,

    /// Print each page once, in ascending order
    #[arg(long)]
    distinct: bool,

    /// Print the pages as a JSON array
    #[arg(long)]
    json: bool,
}

pub async fn run(args: RangesArgs) -> anyhow::Result<()> {
    let set = parse_page_ranges(&args.expr).map_err(PrintdeskError::from)?;

    let pages: Vec<u32> = if args.distinct {
        set.distinct().into_iter().collect()
    } else {
        set.pages().to_vec()
    };

    if args.json {
        println!("{}", serde_json::to_string(&pages)?);
    } else {
        let joined: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
        println!("{}", joined.join(","));
    }

    if !args.distinct && set.duplicate_count() > 0 {
        eprintln!(
            "{} {} pages listed more than once",
            style("ℹ").blue(),
            set.duplicate_count()
        );
    }

    Ok(())
}
