//! TSV rendering of the record stream.
//!
//! The reference output format is one tab-separated row per record:
//! date (or the literal `Metadata`), amount, account, details.

use crate::error::Result;
use crate::types::Record;
use csv::{Writer, WriterBuilder};
use std::io::Write;

/// Placeholder in the date column for non-movement records.
const METADATA_DATE: &str = "Metadata";

/// Writes records as tab-separated rows.
pub struct TsvWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> TsvWriter<W> {
    /// Wrap a destination in a tab-delimited writer with no header row.
    pub fn new(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .from_writer(writer),
        }
    }

    /// Write one record as a TSV row.
    ///
    /// # Examples
    ///
    /// ```
    /// use lbp_releve::tsv_format::TsvWriter;
    /// use lbp_releve::types::Record;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let record = Record::metadata(
    ///     "Ancien solde",
    ///     "Ancien solde 01/03/2020".to_string(),
    ///     Decimal::from_str("100.00")?,
    ///     Some("12345".to_string()),
    /// );
    /// let mut out = Vec::new();
    /// let mut writer = TsvWriter::new(&mut out);
    /// writer.write_record(&record)?;
    /// writer.flush()?;
    /// drop(writer);
    /// assert_eq!(
    ///     String::from_utf8(out)?,
    ///     "Metadata\t100.00\t12345\tAncien solde 01/03/2020\n"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let date = match record.date {
            Some(date) => date.format("%Y/%m/%d").to_string(),
            None => METADATA_DATE.to_string(),
        };
        let amount = record.amount.to_string();
        self.writer.write_record([
            date.as_str(),
            amount.as_str(),
            record.account.as_deref().unwrap_or(""),
            record.details.as_str(),
        ])?;
        Ok(())
    }

    /// Flush buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
