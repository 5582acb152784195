//! CLI application for pricing print shop printouts.

mod commands;

use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use printdesk_core::PrintdeskError;

use commands::{classify, config, draft, quote, ranges};

/// Print shop desk - quote and classify printout uploads
#[derive(Parser)]
#[command(name = "printdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote the cost of a batch of documents
    Quote(quote::QuoteArgs),

    /// Show per-page ink coverage of a document
    Classify(classify::ClassifyArgs),

    /// Expand a page range expression
    Ranges(ranges::RangesArgs),

    /// Validate and print a printout order draft
    Draft(draft::DraftArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Quote(args) => quote::run(args, config_path).await,
        Commands::Classify(args) => classify::run(args, config_path).await,
        Commands::Ranges(args) => ranges::run(args).await,
        Commands::Draft(args) => draft::run(args).await,
        Commands::Config(args) => config::run(args, config_path).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("✗").red(), e);
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

/// 2 for problems with the request itself, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PrintdeskError>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}
