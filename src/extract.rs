//! Text extraction from statement PDFs.
//!
//! Thin wrapper around the external `pdftotext` tool. The `-layout` flag
//! keeps the column alignment of the original document, which the parser's
//! debit/credit heuristic depends on.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Run `pdftotext -layout` on a statement PDF and return the extracted
/// text. Synchronous; the whole text is produced before any parsing.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()?;

    if !output.status.success() {
        return Err(Error::Extraction {
            path: path.to_path_buf(),
            status: output.status,
        });
    }

    Ok(String::from_utf8(output.stdout)?)
}
