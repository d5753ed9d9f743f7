//! Running-balance reconciliation over a record stream.
//!
//! For each statement segment delimited by an "Ancien solde" and a
//! "Nouveau solde" marker, checks that the old balance plus all movement
//! amounts in between equals the new balance. Discrepancies are reported
//! as values, never by aborting the stream.

use crate::types::{Record, NEW_BALANCE_LABEL, OLD_BALANCE_LABEL};
use rust_decimal::Decimal;
use std::fmt;

/// Absolute tolerance when comparing the computed balance to the stated
/// one (1e-6).
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// A reconciliation discrepancy for one statement segment.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceMismatch {
    /// Account the segment belongs to, when known.
    pub account: Option<String>,
    /// Old balance plus all movements seen in the segment.
    pub computed: Decimal,
    /// The balance stated by the "Nouveau solde" marker.
    pub stated: Decimal,
    /// Sum of the positive movement amounts in the segment.
    pub credit: Decimal,
    /// Sum of the negative movement amounts in the segment.
    pub debit: Decimal,
}

impl fmt::Display for BalanceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance mismatch on account {}: computed {} vs stated {} (delta {}, credit {}, debit {})",
            self.account.as_deref().unwrap_or("<unknown>"),
            self.computed,
            self.stated,
            self.computed - self.stated,
            self.credit,
            self.debit,
        )
    }
}

/// Tracks the running balance across one statement's record stream.
///
/// Feed every record, in order, to [`Reconciler::observe`]; it returns a
/// [`BalanceMismatch`] when a "Nouveau solde" marker disagrees with the
/// computed balance beyond the tolerance.
#[derive(Debug, Default)]
pub struct Reconciler {
    balance: Option<Decimal>,
    credit: Decimal,
    debit: Decimal,
}

impl Reconciler {
    /// Create a reconciler with no balance seeded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the next record of the stream.
    pub fn observe(&mut self, record: &Record) -> Option<BalanceMismatch> {
        if record.title == OLD_BALANCE_LABEL {
            self.balance = Some(record.amount);
            self.credit = Decimal::ZERO;
            self.debit = Decimal::ZERO;
            return None;
        }

        if record.title == NEW_BALANCE_LABEL {
            let Some(computed) = self.balance else {
                log::warn!("new balance marker without a prior old balance, skipping check");
                return None;
            };
            let delta = computed - record.amount;
            if delta.abs() > TOLERANCE {
                return Some(BalanceMismatch {
                    account: record.account.clone(),
                    computed,
                    stated: record.amount,
                    credit: self.credit,
                    debit: self.debit,
                });
            }
            return None;
        }

        if record.is_movement() {
            match self.balance.as_mut() {
                Some(balance) => {
                    *balance += record.amount;
                    if record.amount > Decimal::ZERO {
                        self.credit += record.amount;
                    } else {
                        self.debit += record.amount;
                    }
                }
                None => {
                    log::debug!("movement before any old balance, not reconciled: {}", record.details);
                }
            }
        }

        None
    }
}

/// Reconcile a whole record stream, collecting every mismatch.
pub fn reconcile<'a, I>(records: I) -> Vec<BalanceMismatch>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut reconciler = Reconciler::new();
    records
        .into_iter()
        .filter_map(|record| reconciler.observe(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn old_balance(amount: &str) -> Record {
        Record::metadata(
            OLD_BALANCE_LABEL,
            "Ancien solde 01/03/2020".to_string(),
            dec(amount),
            Some("12345".to_string()),
        )
    }

    fn new_balance(amount: &str) -> Record {
        Record::metadata(
            NEW_BALANCE_LABEL,
            "Nouveau solde 31/03/2020".to_string(),
            dec(amount),
            Some("12345".to_string()),
        )
    }

    fn movement(day: u32, amount: &str) -> Record {
        Record::movement(
            NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            "ACHAT CARTE".to_string(),
            dec(amount),
            Some("12345".to_string()),
        )
    }

    #[test]
    fn test_consistent_segment_has_no_mismatch() {
        let records = vec![
            old_balance("100.00"),
            movement(1, "-20.00"),
            movement(2, "50.00"),
            new_balance("130.00"),
        ];
        assert_eq!(reconcile(&records), vec![]);
    }

    #[test]
    fn test_inconsistent_segment_reports_one_mismatch() {
        let records = vec![
            old_balance("100.00"),
            movement(1, "-20.00"),
            new_balance("90.00"),
        ];

        let mismatches = reconcile(&records);
        assert_eq!(mismatches.len(), 1);
        let mismatch = &mismatches[0];
        assert_eq!(mismatch.computed, dec("80.00"));
        assert_eq!(mismatch.stated, dec("90.00"));
        assert_eq!(mismatch.credit, dec("0"));
        assert_eq!(mismatch.debit, dec("-20.00"));
        assert_eq!(mismatch.account.as_deref(), Some("12345"));
    }

    #[test]
    fn test_credit_and_debit_totals_accumulate() {
        let mut reconciler = Reconciler::new();
        reconciler.observe(&old_balance("0.00"));
        reconciler.observe(&movement(1, "10.00"));
        reconciler.observe(&movement(2, "-4.00"));
        reconciler.observe(&movement(3, "6.00"));
        let mismatch = reconciler.observe(&new_balance("0.00")).unwrap();

        assert_eq!(mismatch.computed, dec("12.00"));
        assert_eq!(mismatch.credit, dec("16.00"));
        assert_eq!(mismatch.debit, dec("-4.00"));
    }

    #[test]
    fn test_old_balance_resets_accumulators() {
        let records = vec![
            old_balance("100.00"),
            movement(1, "-20.00"),
            new_balance("80.00"),
            // Second segment starts fresh.
            old_balance("80.00"),
            movement(15, "5.00"),
            new_balance("85.00"),
        ];
        assert_eq!(reconcile(&records), vec![]);
    }

    #[test]
    fn test_metadata_totals_do_not_move_the_balance() {
        let records = vec![
            old_balance("100.00"),
            Record::metadata(
                crate::types::CREDIT_TOTAL_TITLE,
                crate::types::CREDIT_TOTAL_TITLE.to_string(),
                dec("999.00"),
                None,
            ),
            new_balance("100.00"),
        ];
        assert_eq!(reconcile(&records), vec![]);
    }

    #[test]
    fn test_new_balance_without_old_is_skipped() {
        let records = vec![movement(1, "10.00"), new_balance("10.00")];
        assert_eq!(reconcile(&records), vec![]);
    }

    #[test]
    fn test_mismatch_display_carries_diagnostics() {
        let mismatch = BalanceMismatch {
            account: Some("12345".to_string()),
            computed: dec("80.00"),
            stated: dec("90.00"),
            credit: dec("0"),
            debit: dec("-20.00"),
        };
        let rendered = mismatch.to_string();
        assert!(rendered.contains("12345"));
        assert!(rendered.contains("80.00"));
        assert!(rendered.contains("90.00"));
        assert!(rendered.contains("-10.00"));
    }
}
