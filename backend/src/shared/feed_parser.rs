//! Parsing of the delimited sensor feed
//!
//! Columns are located by name rather than position: the header row is
//! matched case-insensitively against known fragments, taking the first
//! matching column in header order. Data rows are scanned from the newest
//! (last) row backwards so that only the most recent valid readings are kept,
//! and the result is returned oldest-first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{Reading, MAX_HISTORY};
use crate::error::IngestError;

const NITROGEN_HEADERS: &[&str] = &["nitrogen"];
const PHOSPHORUS_HEADERS: &[&str] = &["phosphorus"];
const POTASSIUM_HEADERS: &[&str] = &["potassium"];
const MOISTURE_HEADERS: &[&str] = &["moisture", "water"];
const TIME_HEADERS: &[&str] = &["timestamp", "date", "time"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Resolved column indices for one feed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedColumns {
    pub nitrogen: usize,
    pub phosphorus: usize,
    pub potassium: usize,
    pub moisture: Option<usize>,
    pub time: Option<usize>,
}

impl FeedColumns {
    /// Locate columns in the header row. All three nutrient columns are required.
    pub fn resolve(headers: &StringRecord) -> Result<Self, IngestError> {
        let nitrogen = find_column(headers, NITROGEN_HEADERS);
        let phosphorus = find_column(headers, PHOSPHORUS_HEADERS);
        let potassium = find_column(headers, POTASSIUM_HEADERS);

        match (nitrogen, phosphorus, potassium) {
            (Some(nitrogen), Some(phosphorus), Some(potassium)) => Ok(Self {
                nitrogen,
                phosphorus,
                potassium,
                moisture: find_column(headers, MOISTURE_HEADERS),
                time: find_column(headers, TIME_HEADERS),
            }),
            _ => {
                let missing = [
                    ("nitrogen", nitrogen),
                    ("phosphorus", phosphorus),
                    ("potassium", potassium),
                ]
                .into_iter()
                .filter(|(_, index)| index.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(IngestError::MissingColumns(missing))
            }
        }
    }

    /// Highest index a row must reach to be considered
    fn max_index(&self) -> usize {
        [self.nitrogen, self.phosphorus, self.potassium]
            .into_iter()
            .chain(self.moisture)
            .chain(self.time)
            .max()
            .unwrap_or(0)
    }

    /// Convert one data row into a reading, or `None` when the row is rejected
    ///
    /// `position` is the 0-based index of the row among the document lines
    /// after the header, blank lines included.
    pub fn read_row(&self, record: &StringRecord, position: usize) -> Option<Reading> {
        if record.len() <= self.max_index() {
            return None;
        }

        let nitrogen = parse_level(record.get(self.nitrogen)?)?;
        let phosphorus = parse_level(record.get(self.phosphorus)?)?;
        let potassium = parse_level(record.get(self.potassium)?)?;
        let moisture = self
            .moisture
            .and_then(|index| record.get(index))
            .and_then(parse_level);

        let time_cell = self.time.and_then(|index| record.get(index));

        Some(Reading {
            nitrogen,
            phosphorus,
            potassium,
            moisture,
            time_label: time_label(time_cell, position),
        })
    }
}

/// Parse a feed document into at most `MAX_HISTORY` readings, oldest first
pub fn parse_feed(text: &str) -> Result<Vec<Reading>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Unparseable(e.to_string()))?
        .clone();

    if headers.iter().all(str::is_empty) {
        return Err(IngestError::EmptyDocument);
    }

    let columns = FeedColumns::resolve(&headers)?;

    // Blank lines are skipped by the reader, so positions come from line numbers
    let header_line = headers.position().map(|p| p.line()).unwrap_or(1);

    let rows: Vec<(usize, StringRecord)> = reader
        .records()
        .enumerate()
        .filter_map(|(index, record)| match record {
            Ok(record) => {
                let position = record
                    .position()
                    .map(|p| p.line().saturating_sub(header_line + 1) as usize)
                    .unwrap_or(index);
                Some((position, record))
            }
            Err(e) => {
                debug!(row = index + 1, error = %e, "Skipping unreadable feed row");
                None
            }
        })
        .collect();

    let mut history: Vec<Reading> = rows
        .iter()
        .rev()
        .filter_map(|(position, record)| {
            let reading = columns.read_row(record, *position);
            if reading.is_none() {
                debug!(row = position + 1, "Skipping invalid feed row");
            }
            reading
        })
        .take(MAX_HISTORY)
        .collect();

    if history.is_empty() {
        return Err(IngestError::NoValidRows);
    }

    // Scanned newest-first; the snapshot wants oldest-first
    history.reverse();

    Ok(history)
}

/// First header (in header order) containing any of the fragments, case-insensitive
pub fn find_column(headers: &StringRecord, fragments: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        fragments.iter().any(|fragment| header.contains(fragment))
    })
}

/// Non-empty, finite, non-negative number
pub fn parse_level(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Clock time for parseable timestamps, raw text otherwise,
/// positional placeholder when there is no time cell
pub fn time_label(cell: Option<&str>, position: usize) -> String {
    match cell.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_timestamp(raw)
            .map(|timestamp| timestamp.format("%H:%M").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => format!("Reading {}", position + 1),
    }
}

/// Parse the timestamp shapes spreadsheets commonly export
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
