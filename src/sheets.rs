//! The spreadsheet-service seam: cell values, records read back from a tab,
//! and the traits the dashboard talks to.

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::SheetsError;

/// A single cell, as written to or read back from a tab.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Converts a formatted cell into a typed value.
    ///
    /// Empty cells stay empty text. Otherwise integers win over reals and
    /// anything else is kept verbatim.
    pub fn numericise(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Text(String::new());
        }

        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            CellValue::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            CellValue::Float(f)
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Int(i64::from(n))
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

// Serialized the way the values API expects a raw row: numbers as JSON numbers.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(x) => serializer.serialize_f64(*x),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// All records of a tab: the header row plus one value per header per row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Records {
    /// Builds records from the raw grid of formatted values.
    ///
    /// The first row is the header. Short rows are padded with empty cells and
    /// cells past the last header are dropped.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Result<Self, SheetsError> {
        let mut lines = grid.into_iter();
        let Some(headers) = lines.next() else {
            return Ok(Records::default());
        };

        let mut seen = HashSet::new();
        for header in headers.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(header.as_str()) {
                return Err(SheetsError::DuplicateHeaders(header.clone()));
            }
        }

        let width = headers.len();
        let rows = lines
            .map(|line| {
                let mut row: Vec<CellValue> = line
                    .iter()
                    .take(width)
                    .map(|raw| CellValue::numericise(raw))
                    .collect();
                row.resize(width, CellValue::Text(String::new()));
                row
            })
            .collect();

        Ok(Records { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<CellValue>>) {
        (self.headers, self.rows)
    }
}

/// Read/append access to the tabs of one spreadsheet document.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Appends one row after the last row of `tab`.
    async fn append_row(&self, tab: &str, row: Vec<CellValue>) -> Result<(), SheetsError>;

    /// Reads every record of `tab`.
    async fn get_all_records(&self, tab: &str) -> Result<Records, SheetsError>;
}

/// Produces an authorized [`SheetStore`]; called until it first succeeds.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn SheetStore>, SheetsError>;
}
