//! Common types shared by the statement parser and the reconciler.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label of the opening-balance marker line, as printed on the statement.
pub const OLD_BALANCE_LABEL: &str = "Ancien solde";

/// Label of the closing-balance marker line, as printed on the statement.
pub const NEW_BALANCE_LABEL: &str = "Nouveau solde";

/// Title of the emitted credit-total metadata record.
pub const CREDIT_TOTAL_TITLE: &str = "Crédit total";

/// Title of the emitted debit-total metadata record.
pub const DEBIT_TOTAL_TITLE: &str = "Débit total";

/// A single entry extracted from a statement.
///
/// If a record has a date, it is an account movement. Otherwise it is
/// metadata: a balance marker or an operations total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Date of the movement. `None` for metadata records.
    pub date: Option<NaiveDate>,

    /// Operation label, or the fixed label of a metadata record.
    pub title: String,

    /// The title plus any continuation lines, joined with `" / "`.
    pub details: String,

    /// Signed amount: positive for credits, negative for debits.
    pub amount: Decimal,

    /// Account identifier active when the record was built.
    pub account: Option<String>,
}

impl Record {
    /// Create a metadata record (balance marker or total).
    pub fn metadata(title: &str, details: String, amount: Decimal, account: Option<String>) -> Self {
        Self {
            date: None,
            title: title.to_string(),
            details,
            amount,
            account,
        }
    }

    /// Create a movement record. `details` starts out equal to the title.
    pub fn movement(date: NaiveDate, title: String, amount: Decimal, account: Option<String>) -> Self {
        Self {
            date: Some(date),
            details: title.clone(),
            title,
            amount,
            account,
        }
    }

    /// Whether this record is a dated account movement.
    pub fn is_movement(&self) -> bool {
        self.date.is_some()
    }

    /// Append a continuation line to the record's details.
    pub(crate) fn push_details(&mut self, text: &str) {
        self.details.push_str(" / ");
        self.details.push_str(text);
    }
}
