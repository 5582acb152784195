//! Conversion through a headless office suite.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::DocumentConverter;
use crate::error::ConvertError;

/// Converts documents with `soffice --headless --convert-to pdf`.
///
/// Programs are tried in order; one that is not installed is skipped, one
/// that runs and fails ends the attempt.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    programs: Vec<String>,
}

impl OfficeConverter {
    pub fn new(programs: Vec<String>) -> Self {
        Self { programs }
    }

    pub fn programs(&self) -> &[String] {
        &self.programs
    }
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self::new(vec!["soffice".to_string(), "libreoffice".to_string()])
    }
}

impl DocumentConverter for OfficeConverter {
    fn name(&self) -> &str {
        "office"
    }

    fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> Result<Vec<u8>, ConvertError> {
        let stem = source
            .file_stem()
            .ok_or_else(|| ConvertError::NoOutput(source.display().to_string()))?;
        // soffice keeps every dot of the stem: `my.report.docx` -> `my.report.pdf`
        let expected = out_dir.join(format!("{}.pdf", stem.to_string_lossy()));

        // soffice refuses to start twice on one profile directory
        let profile = fs::canonicalize(out_dir)?.join(".office-profile");
        let installation = format!("-env:UserInstallation={}", file_url(&profile));

        for program in &self.programs {
            debug!("Converting {} with {}", source.display(), program);

            let output = Command::new(program)
                .arg(&installation)
                .arg("--headless")
                .arg("--convert-to")
                .arg("pdf")
                .arg("--outdir")
                .arg(out_dir)
                .arg(source)
                .output();

            let output = match output {
                Ok(output) => output,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("Converter {} not found, trying next", program);
                    continue;
                }
                Err(e) => return Err(ConvertError::Io(e)),
            };

            if !output.status.success() {
                return Err(ConvertError::Failed {
                    program: program.clone(),
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            return match fs::read(&expected) {
                Ok(pdf) => Ok(pdf),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(ConvertError::NoOutput(source.display().to_string()))
                }
                Err(e) => Err(ConvertError::Io(e)),
            };
        }

        Err(ConvertError::Unavailable(self.programs.join(", ")))
    }
}

/// `file://` URL for an absolute path.
fn file_url(path: &Path) -> String {
    format!("file://{}", urlencoding::encode_path(&path.to_string_lossy()))
}

/// Percent-encoding for path components of a file URL.
mod urlencoding {
    pub fn encode_path(s: &str) -> String {
        s.bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }
}
