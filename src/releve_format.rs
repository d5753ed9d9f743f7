//! La Banque Postale statement text parser.
//!
//! Consumes the layout-preserving text produced by `pdftotext -layout` on a
//! statement PDF and emits one [`Record`] per account movement or metadata
//! entry (balance markers, operation totals).
//!
//! Each line is classified against a fixed priority list of recognizers;
//! continuation lines that match nothing are appended to the details of the
//! movement under construction.

use crate::error::{Error, Result};
use crate::types::{Record, CREDIT_TOTAL_TITLE, DEBIT_TOTAL_TITLE};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::io::Read;
use std::str::FromStr;

/// French month names in calendar order, for publication-date parsing.
const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
    "septembre", "octobre", "novembre", "décembre",
];

/// Lines whose amount sits in the débit column print shorter than the
/// header by at least this many characters. Heuristic calibrated against
/// pdftotext -layout output; see the sign inference in `parse_movement`.
const DEBIT_COLUMN_MARGIN: usize = 12;

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|month| *month == lower)
        .map(|index| index as u32 + 1)
}

/// Parse an amount in the statement's locale: space as thousands separator,
/// comma as decimal separator (`"1 234,56"` -> `1234.56`).
fn parse_amount(text: &str) -> Result<Decimal> {
    let normalized = text.replace(' ', "").replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| Error::InvalidAmount(text.to_string()))
}

fn parse_num<T: FromStr>(text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::InvalidDate(text.to_string()))
}

/// The recognizers, compiled once per parsed document.
struct LinePatterns {
    column_header: Regex,
    publication: Regex,
    account: Regex,
    balance: Regex,
    movement_start: Regex,
    movement_modern: Regex,
    movement_legacy: Regex,
    totals_pair: Regex,
    totals_single: Regex,
}

impl LinePatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            column_header: Regex::new(r"^\s*Date\s+Opération.+Débit.+Crédit")?,
            publication: Regex::new(
                r"Relevé\s+édité\s+le\s+(?P<day>\d{1,2})\s+(?P<month>\w+)\s+(?P<year>\d{4})",
            )?,
            account: Regex::new(r".+n°\s+(?P<account>[\w\d ]+)\s*")?,
            balance: Regex::new(
                r"^\s*(?P<label>(?:Ancien|Nouveau)\s+solde)\s+au\s+(?P<date>\d{2}/\d{2}/\d{4})\s+(?P<value>\d{1,3}(?: \d{3})*(?:,\d+)?)\s*$",
            )?,
            movement_start: Regex::new(r"^\s{0,2}\d{2}/\d{2}\s")?,
            movement_modern: Regex::new(
                r"^\s*(?P<day>\d{2})/(?P<month>\d{2})\s+(?P<title>.+?)\s+(?P<value>\d{1,3}(?: \d{3})*(?:,\d+)?)\s*$",
            )?,
            movement_legacy: Regex::new(
                r"^\s*(?P<day>\d{2})/(?P<month>\d{2})(?P<title>.*?)(?P<value>\d{1,3}(?: \d{3})*(?:,\d+)?)\s+(?P<sign>[-+]) ?(?P<francs>\d{1,3}(?: \d{3})*(?:,\d+)?)\s*$",
            )?,
            totals_pair: Regex::new(
                r"^\s*Total des opérations.+?(?P<debit>\d{1,3}(?: \d{3})*(?:,\d+))\s+(?P<credit>\d{1,3}(?: \d{3})*(?:,\d+)?)\s*$",
            )?,
            totals_single: Regex::new(r"^\s*Total des opérations\s+(?P<value>-?\d+(?:,\d+)?)\s*$")?,
        })
    }

    /// Classify one line. First matching recognizer wins; the order is part
    /// of the format contract.
    fn classify(&self, line: &str) -> Result<LineKind> {
        if self.column_header.is_match(line) {
            return Ok(LineKind::ColumnHeader);
        }
        if let Some(caps) = self.publication.captures(line) {
            let day: u32 = parse_num(&caps["day"])?;
            let month = month_number(&caps["month"])
                .ok_or_else(|| Error::InvalidDate(caps["month"].to_string()))?;
            let year: i32 = parse_num(&caps["year"])?;
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| Error::InvalidDate(line.trim().to_string()))?;
            return Ok(LineKind::PublicationDate(date));
        }
        if let Some(caps) = self.account.captures(line) {
            return Ok(LineKind::Account(caps["account"].replace(' ', "")));
        }
        if let Some(caps) = self.balance.captures(line) {
            return Ok(LineKind::Balance {
                label: caps["label"].to_string(),
                date: caps["date"].to_string(),
                amount: parse_amount(&caps["value"])?,
            });
        }
        if self.movement_start.is_match(line) {
            return Ok(LineKind::MovementStart);
        }
        if let Some(caps) = self.totals_pair.captures(line) {
            return Ok(LineKind::TotalsPair {
                debit: parse_amount(&caps["debit"])?,
                credit: parse_amount(&caps["credit"])?,
            });
        }
        if let Some(caps) = self.totals_single.captures(line) {
            return Ok(LineKind::TotalsSingle(parse_amount(&caps["value"])?));
        }
        if line.trim().is_empty() {
            return Ok(LineKind::Blank);
        }
        Ok(LineKind::Other)
    }
}

/// One statement line, classified.
enum LineKind {
    /// Column header row; its length is the reference for sign inference.
    ColumnHeader,
    PublicationDate(NaiveDate),
    Account(String),
    Balance {
        label: String,
        date: String,
        amount: Decimal,
    },
    /// Start of a movement. Full parsing is state-dependent and happens in
    /// `parse_movement`.
    MovementStart,
    TotalsPair {
        debit: Decimal,
        credit: Decimal,
    },
    TotalsSingle(Decimal),
    Blank,
    Other,
}

/// Mutable state accumulated while scanning one statement's lines.
#[derive(Default)]
struct ParserState {
    account: Option<String>,
    publication_date: Option<NaiveDate>,
    /// Char length of the last column-header line seen.
    reference_len: Option<usize>,
    /// The movement under construction. Only this record is ever mutated;
    /// records are immutable once flushed.
    current: Option<Record>,
}

impl ParserState {
    fn flush(&mut self) -> Option<Record> {
        self.current.take()
    }

    fn append(&mut self, text: &str) {
        if let Some(record) = self.current.as_mut() {
            record.push_details(text);
        }
    }
}

/// Lazy iterator over the records of one statement's text lines.
///
/// Produced by [`records`]. Yields records in the order their defining
/// lines were encountered and flushes the final in-progress record at end
/// of input. Malformed lines are logged and skipped, never emitted with a
/// corrupted amount.
pub struct RecordIter<I> {
    lines: I,
    patterns: LinePatterns,
    state: ParserState,
    pending: VecDeque<Record>,
    finished: bool,
}

/// Build a lazy [`Record`] iterator over statement text lines.
///
/// # Examples
///
/// ```
/// use lbp_releve::releve_format::records;
///
/// let lines = ["Relevé édité le 05 mars 2020", "Votre compte  n° 12345"];
/// let count = records(lines)?.count();
/// assert_eq!(count, 0);
/// # Ok::<(), lbp_releve::Error>(())
/// ```
pub fn records<I>(lines: I) -> Result<RecordIter<I::IntoIter>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Ok(RecordIter {
        lines: lines.into_iter(),
        patterns: LinePatterns::new()?,
        state: ParserState::default(),
        pending: VecDeque::new(),
        finished: false,
    })
}

impl<I> Iterator for RecordIter<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            if self.finished {
                return None;
            }
            match self.lines.next() {
                Some(line) => self.handle_line(line.as_ref()),
                None => {
                    self.finished = true;
                    if let Some(record) = self.state.flush() {
                        self.pending.push_back(record);
                    }
                }
            }
        }
    }
}

impl<I> RecordIter<I> {
    fn handle_line(&mut self, line: &str) {
        let kind = match self.patterns.classify(line) {
            Ok(kind) => kind,
            Err(e) => {
                log::error!("{e}, skipping line {line:?}");
                return;
            }
        };

        match kind {
            LineKind::ColumnHeader => {
                self.state.reference_len = Some(line.chars().count());
            }
            LineKind::PublicationDate(date) => {
                self.state.publication_date = Some(date);
            }
            LineKind::Account(id) => {
                self.state.account = Some(id);
            }
            LineKind::Balance {
                label,
                date,
                amount,
            } => {
                self.flush_pending();
                let details = format!("{label} {date}");
                self.pending.push_back(Record::metadata(
                    &label,
                    details,
                    amount,
                    self.state.account.clone(),
                ));
            }
            LineKind::MovementStart => {
                self.flush_pending();
                match self.parse_movement(line) {
                    Ok(record) => self.state.current = Some(record),
                    Err(e) => log::error!("{e}, skipping movement line {line:?}"),
                }
            }
            LineKind::TotalsPair { debit, credit } => {
                self.flush_pending();
                self.push_total(CREDIT_TOTAL_TITLE, credit);
                self.push_total(DEBIT_TOTAL_TITLE, debit);
            }
            LineKind::TotalsSingle(amount) => {
                self.flush_pending();
                let title = if amount >= Decimal::ZERO {
                    CREDIT_TOTAL_TITLE
                } else {
                    DEBIT_TOTAL_TITLE
                };
                self.push_total(title, amount);
            }
            LineKind::Blank => {
                self.flush_pending();
            }
            LineKind::Other => {
                self.state.append(line.trim());
            }
        }
    }

    fn flush_pending(&mut self) {
        if let Some(record) = self.state.flush() {
            self.pending.push_back(record);
        }
    }

    fn push_total(&mut self, title: &str, amount: Decimal) {
        self.pending.push_back(Record::metadata(
            title,
            title.to_string(),
            amount,
            self.state.account.clone(),
        ));
    }

    /// Fully parse a movement line. State-dependent: the publication date
    /// selects the legacy or modern column layout and supplies the year,
    /// and the header reference drives debit/credit inference.
    fn parse_movement(&self, line: &str) -> Result<Record> {
        let publication = self.state.publication_date.ok_or_else(|| {
            Error::MissingField("publication date before first movement".to_string())
        })?;
        let legacy = (publication.year(), publication.month(), publication.day()) < (2017, 3, 1);

        let (day, month, title, amount) = if legacy {
            // Before March 2017 statements carry an extra column with the
            // amount in francs; its explicit sign decides debit vs credit.
            let caps = self
                .patterns
                .movement_legacy
                .captures(line)
                .ok_or_else(|| Error::MalformedLine(line.trim().to_string()))?;
            let mut amount = parse_amount(&caps["value"])?;
            if &caps["sign"] == "-" {
                amount = -amount;
            }
            (
                parse_num::<u32>(&caps["day"])?,
                parse_num::<u32>(&caps["month"])?,
                caps["title"].trim().to_string(),
                amount,
            )
        } else {
            let caps = self
                .patterns
                .movement_modern
                .captures(line)
                .ok_or_else(|| Error::MalformedLine(line.trim().to_string()))?;
            let mut amount = parse_amount(&caps["value"])?;
            match self.state.reference_len {
                None => {
                    log::error!("no column header seen before {line:?}, assuming credit");
                }
                Some(reference_len) => {
                    // Amounts in the left (débit) column leave the line short
                    // of the header once trailing spaces are stripped.
                    if line.chars().count() < reference_len.saturating_sub(DEBIT_COLUMN_MARGIN) {
                        amount = -amount;
                    }
                }
            }
            (
                parse_num::<u32>(&caps["day"])?,
                parse_num::<u32>(&caps["month"])?,
                caps["title"].trim().to_string(),
                amount,
            )
        };

        // Statements issued in January may list December movements from the
        // previous year.
        let mut year = publication.year();
        if month == 12 && publication.month() == 1 {
            year -= 1;
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))?;

        Ok(Record::movement(
            date,
            title,
            amount,
            self.state.account.clone(),
        ))
    }
}

/// A fully parsed statement: the record stream, collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleveStatement {
    /// Records in the order their defining lines were encountered.
    pub records: Vec<Record>,
}

impl ReleveStatement {
    /// Parse statement text from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use lbp_releve::releve_format::ReleveStatement;
    ///
    /// let mut file = File::open("releve.txt")?;
    /// let statement = ReleveStatement::from_read(&mut file)?;
    /// println!("{} records", statement.records.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self {
            records: records(text.lines())?.collect(),
        })
    }
}
