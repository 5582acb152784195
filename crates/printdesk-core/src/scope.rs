//! Request-scoped temporary storage.
//!
//! Every cost request gets its own uniquely named directory, and every
//! document inside it a nested one. Both are removed when dropped, so
//! nothing written during a request outlives it, whichever way it ends.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;

const REQUEST_PREFIX: &str = "printdesk-req-";
const DOCUMENT_PREFIX: &str = "doc-";

/// Temporary storage namespace for one request.
#[derive(Debug)]
pub struct RequestScope {
    dir: TempDir,
}

impl RequestScope {
    /// Create a scope under `root`, or the system temp dir.
    pub fn new(root: Option<&Path>) -> io::Result<Self> {
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)?;
                Builder::new().prefix(REQUEST_PREFIX).tempdir_in(root)?
            }
            None => Builder::new().prefix(REQUEST_PREFIX).tempdir()?,
        };
        debug!("Opened request scope {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Unique token naming this request's namespace.
    pub fn token(&self) -> &str {
        self.dir
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(REQUEST_PREFIX)
    }

    /// Open a nested scope for one document.
    pub fn document(&self) -> io::Result<DocumentScope> {
        let dir = Builder::new()
            .prefix(DOCUMENT_PREFIX)
            .tempdir_in(self.dir.path())?;
        Ok(DocumentScope { dir })
    }

    /// Remove the scope now, reporting failures instead of ignoring them.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Closed request scope {}", path.display());
        Ok(())
    }
}

/// Temporary storage for the artifacts of one document.
#[derive(Debug)]
pub struct DocumentScope {
    dir: TempDir,
}

impl DocumentScope {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to a file called `name` inside the scope.
    ///
    /// Only the final component of `name` is used.
    pub fn persist(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("invalid file name '{}'", name))
            })?;
        let path = self.dir.path().join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
