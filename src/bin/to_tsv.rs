//! lbp_to_tsv - CLI tool converting La Banque Postale PDF statements to TSV.
//!
//! Each PDF is run through `pdftotext -layout`, parsed into records, and
//! printed to stdout as tab-separated rows. Reconciliation discrepancies
//! are logged, never fatal: a bad statement does not stop the next one.

use clap::Parser;
use lbp_releve::extract::extract_text;
use lbp_releve::reconcile::Reconciler;
use lbp_releve::releve_format::records;
use lbp_releve::tsv_format::TsvWriter;
use lbp_releve::Result;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lbp_to_tsv")]
#[command(about = "Convert La Banque Postale PDF statements to TSV", long_about = None)]
struct Cli {
    /// Statement PDF files to convert
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.files.is_empty() {
        eprintln!("Usage: lbp_to_tsv *.pdf");
        std::process::exit(1);
    }

    let mut failed = false;
    for file in &cli.files {
        if let Err(e) = process_file(file) {
            log::error!("{}: {e}", file.display());
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

/// Parse one statement with fresh parser and reconciler state.
fn process_file(path: &Path) -> Result<()> {
    let text = extract_text(path)?;

    let stdout = io::stdout();
    let mut writer = TsvWriter::new(stdout.lock());
    let mut reconciler = Reconciler::new();

    for record in records(text.lines())? {
        writer.write_record(&record)?;
        if let Some(mismatch) = reconciler.observe(&record) {
            log::error!("{mismatch}");
        }
    }
    writer.flush()?;

    Ok(())
}
