//! A dated view over [`Records`]: every row carries its parsed date so it can
//! be sorted, charted and aggregated per day.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::DataError;
use crate::sheets::{CellValue, Records};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parses a date cell; date-times keep only their calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Coerces a cell to a number; anything non-numeric or non-finite becomes `None`.
pub fn to_numeric(value: &CellValue) -> Option<f64> {
    let x = match value {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(x) => *x,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    x.is_finite().then_some(x)
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatedRow {
    pub date: NaiveDate,
    pub cells: Vec<CellValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    headers: Vec<String>,
    date_index: usize,
    rows: Vec<DatedRow>,
}

impl Frame {
    /// Parses `date_column` of every record. One unparseable date fails the
    /// whole frame.
    pub fn with_dates(records: Records, date_column: &str) -> Result<Self, DataError> {
        let date_index = records
            .column_index(date_column)
            .ok_or_else(|| DataError::MissingColumn(date_column.to_string()))?;

        let (headers, rows) = records.into_parts();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let raw = cells[date_index].to_string();
                let date = parse_date(&raw).ok_or_else(|| DataError::InvalidDate {
                    column: date_column.to_string(),
                    value: raw,
                })?;
                Ok(DatedRow { date, cells })
            })
            .collect::<Result<Vec<_>, DataError>>()?;

        Ok(Frame {
            headers,
            date_index,
            rows,
        })
    }

    /// Stable sort on the date, so same-day rows keep their sheet order.
    pub fn sort_by_date(&mut self, descending: bool) {
        if descending {
            self.rows.sort_by(|a, b| b.date.cmp(&a.date));
        } else {
            self.rows.sort_by(|a, b| a.date.cmp(&b.date));
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[DatedRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn index_of(&self, column: &str) -> Result<usize, DataError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataError::MissingColumn(column.to_string()))
    }

    /// The column coerced to numbers, one entry per row.
    pub fn numeric(&self, column: &str) -> Result<Vec<Option<f64>>, DataError> {
        let index = self.index_of(column)?;
        Ok(self.rows.iter().map(|r| to_numeric(&r.cells[index])).collect())
    }

    /// `(date, value)` points of the column, skipping non-numeric cells.
    pub fn series(&self, column: &str) -> Result<Vec<(NaiveDate, f64)>, DataError> {
        let values = self.numeric(column)?;
        Ok(self
            .rows
            .iter()
            .zip(values)
            .filter_map(|(row, value)| value.map(|v| (row.date, v)))
            .collect())
    }

    /// Rows as display strings; the date column shows the parsed day.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        if i == self.date_index {
                            row.date.format("%Y-%m-%d").to_string()
                        } else {
                            cell.to_string()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[&[&str]]) -> Records {
        Records::from_grid(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepted_date_shapes() {
        assert_eq!(parse_date("2024-05-01"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("2024/05/01"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("5/1/2024"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01 18:30:00"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T18:30:00Z"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(to_numeric(&CellValue::Int(3)), Some(3.0));
        assert_eq!(to_numeric(&CellValue::Float(2.5)), Some(2.5));
        assert_eq!(to_numeric(&CellValue::Text(" 7 ".into())), Some(7.0));
        assert_eq!(to_numeric(&CellValue::Text("heavy".into())), None);
        assert_eq!(to_numeric(&CellValue::Text(String::new())), None);
        assert_eq!(to_numeric(&CellValue::Float(f64::NAN)), None);
    }

    #[test]
    fn infinite_cells_are_not_numeric() {
        assert_eq!(to_numeric(&CellValue::numericise("inf")), None);
        assert_eq!(to_numeric(&CellValue::numericise("-infinity")), None);
        assert_eq!(to_numeric(&CellValue::Text("1e400".into())), None);

        let frame = Frame::with_dates(
            records(&[
                &["Date", "Body Weight"],
                &["2024-05-01", "inf"],
                &["2024-05-02", "80"],
            ]),
            "Date",
        )
        .unwrap();
        assert_eq!(frame.series("Body Weight").unwrap(), vec![(day(2024, 5, 2), 80.0)]);
    }

    #[test]
    fn sorts_by_date_both_ways() {
        let mut frame = Frame::with_dates(
            records(&[
                &["Date", "Exercise"],
                &["2024-05-02", "Row"],
                &["2024-05-01", "Squat"],
                &["2024-05-03", "Press"],
                &["2024-05-01", "Lunge"],
            ]),
            "Date",
        )
        .unwrap();

        frame.sort_by_date(true);
        let names: Vec<String> = frame.display_rows().into_iter().map(|r| r[1].clone()).collect();
        assert_eq!(names, ["Press", "Row", "Squat", "Lunge"]);

        frame.sort_by_date(false);
        let names: Vec<String> = frame.display_rows().into_iter().map(|r| r[1].clone()).collect();
        assert_eq!(names, ["Squat", "Lunge", "Row", "Press"]);
    }

    #[test]
    fn display_normalises_the_date_column() {
        let frame = Frame::with_dates(
            records(&[&["Date", "Body Weight"], &["2024-05-01 07:15:00", "80.5"]]),
            "Date",
        )
        .unwrap();
        assert_eq!(frame.display_rows(), vec![vec!["2024-05-01", "80.5"]]);
    }

    #[test]
    fn bad_date_fails_the_frame() {
        let err = Frame::with_dates(
            records(&[&["Date"], &["2024-05-01"], &["someday"]]),
            "Date",
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataError::InvalidDate {
                column: "Date".into(),
                value: "someday".into()
            }
        );
    }

    #[test]
    fn missing_columns_are_reported() {
        let err = Frame::with_dates(records(&[&["Day"], &["2024-05-01"]]), "Date").unwrap_err();
        assert_eq!(err, DataError::MissingColumn("Date".into()));

        let frame = Frame::with_dates(records(&[&["Date"], &["2024-05-01"]]), "Date").unwrap();
        assert_eq!(
            frame.series("Body Weight").unwrap_err(),
            DataError::MissingColumn("Body Weight".into())
        );
    }

    #[test]
    fn series_skips_non_numeric_points() {
        let frame = Frame::with_dates(
            records(&[
                &["Date", "Body Weight"],
                &["2024-05-01", "80.5"],
                &["2024-05-02", "n/a"],
                &["2024-05-03", "79"],
            ]),
            "Date",
        )
        .unwrap();
        assert_eq!(
            frame.series("Body Weight").unwrap(),
            vec![(day(2024, 5, 1), 80.5), (day(2024, 5, 3), 79.0)]
        );
    }
}
