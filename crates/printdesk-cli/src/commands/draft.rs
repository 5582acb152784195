//! Draft command - build a printout order record.

use clap::Args;
use rust_decimal::Decimal;

use printdesk_core::PrintoutDraft;

/// Arguments for the draft command.
#[derive(Args)]
pub struct DraftArgs {
    /// Ordering user
    #[arg(short, long)]
    user: String,

    /// Quoted cost
    #[arg(long)]
    cost: Decimal,

    /// Uploaded file name
    #[arg(long)]
    file: String,

    /// Monochrome page range
    #[arg(short, long, default_value = "")]
    pages: String,

    /// Colored page range
    #[arg(short = 'C', long, default_value = "")]
    colored: String,

    /// Note for the shop staff
    #[arg(short, long, default_value = "")]
    message: String,

    /// Print single-sided (true/false)
    #[arg(long)]
    one_side: Option<bool>,
}

pub async fn run(args: DraftArgs) -> anyhow::Result<()> {
    let draft = PrintoutDraft::new(args.user, args.file, args.cost)
        .with_pages(args.pages, args.colored)
        .with_message(args.message)
        .with_one_side(args.one_side);

    draft.validate()?;

    println!("{}", serde_json::to_string_pretty(&draft)?);

    Ok(())
}
