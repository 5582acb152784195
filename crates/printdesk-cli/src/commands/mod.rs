pub mod classify;
pub mod config;
pub mod draft;
pub mod quote;
pub mod ranges;

use std::fs;
use std::path::Path;

use printdesk_core::Document;

/// Read an upload from disk, keeping only its file name.
pub fn read_document(
    path: &Path,
    content_pages: &str,
    colored_pages: &str,
) -> anyhow::Result<Document> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?;

    Ok(Document::new(fs::read(path)?, filename, content_pages, colored_pages))
}
