//! Input resolution: load a statement into memory and, when an engine call
//! needs a path, stage it in a scratch file.
//!
//! Statements are small, so the whole document is read up front. Both
//! layouts then work from the same bytes; only the credit-card path needs
//! them on disk, and [`ScratchFile`] removes that copy when dropped, on
//! the error path as well as the happy one.

use crate::error::StatementError;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A statement PDF held in memory.
#[derive(Debug, Clone)]
pub struct StatementDocument {
    name: String,
    bytes: Vec<u8>,
}

impl StatementDocument {
    /// Read a local file, validating existence, permissions and the PDF
    /// magic bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StatementError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StatementError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(StatementError::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            Err(_) => {
                return Err(StatementError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
        };

        let name = display_name(path);
        debug!("Resolved local PDF: {}", path.display());
        Self::from_reader(name, file)
    }

    /// Read a document from any byte stream, e.g. an upload.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> Result<Self, StatementError> {
        let name = name.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| StatementError::ReadFailed {
                name: name.clone(),
                source,
            })?;
        Self::from_bytes(name, bytes)
    }

    /// Wrap bytes already in memory. Rejects data that is not a PDF.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, StatementError> {
        let name = name.into();
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(StatementError::NotAPdf {
                name,
                magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
            });
        }
        Ok(Self { name, bytes })
    }

    /// Name used in logs and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A `.pdf` temp file holding a copy of the document. Deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    pub fn create(bytes: &[u8]) -> Result<Self, StatementError> {
        let mut file = tempfile::Builder::new()
            .prefix("stmtparse-")
            .suffix(".pdf")
            .tempfile()
            .map_err(StatementError::ScratchFile)?;
        file.write_all(bytes).map_err(StatementError::ScratchFile)?;
        file.flush().map_err(StatementError::ScratchFile)?;
        debug!("Staged document at {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
