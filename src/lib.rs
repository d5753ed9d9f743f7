//! La Banque Postale statement extraction library.
//!
//! Parses the semi-structured text obtained by running `pdftotext -layout`
//! on La Banque Postale PDF statements, and turns it into structured
//! [`Record`] values: one per account movement, plus metadata records for
//! balance markers and operation totals. A reconciliation pass verifies
//! that the old balance plus all movements matches the new balance.
//!
//! # Features
//!
//! - Lazy, line-oriented parsing of extracted statement text
//! - Locale-aware amount parsing (space thousands separator, comma decimal)
//! - Debit/credit inference from the statement's column layout
//! - Running-balance reconciliation with full diagnostics
//! - TSV rendering of the record stream
//!
//! # Examples
//!
//! ## Parsing extracted statement text
//!
//! ```no_run
//! use std::fs::File;
//! use lbp_releve::releve_format::ReleveStatement;
//!
//! let mut file = File::open("releve.txt")?;
//! let statement = ReleveStatement::from_read(&mut file)?;
//! for record in &statement.records {
//!     println!("{}: {}", record.title, record.amount);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Reconciling the balance
//!
//! ```no_run
//! use std::fs::File;
//! use lbp_releve::releve_format::ReleveStatement;
//! use lbp_releve::reconcile::reconcile;
//!
//! let mut file = File::open("releve.txt")?;
//! let statement = ReleveStatement::from_read(&mut file)?;
//! for mismatch in reconcile(&statement.records) {
//!     eprintln!("{mismatch}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod extract;
pub mod reconcile;
pub mod releve_format;
pub mod tsv_format;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use reconcile::{BalanceMismatch, Reconciler};
pub use releve_format::{records, ReleveStatement};
pub use types::Record;
