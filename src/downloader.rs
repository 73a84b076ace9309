use crate::sheets::{CellValue, Records};
use std::error::Error;

/// Convert a tab's records to CSV format
///
/// The first line holds the tab's headers; each record follows in sheet
/// order. Values containing commas, quotes or newlines are quoted.
///
/// # Arguments
/// * `records` - The records to convert
///
/// # Returns
/// * `String` - CSV content
pub fn to_csv(records: &Records) -> String {
    let mut csv_content = String::new();

    push_csv_line(&mut csv_content, records.headers().iter().map(String::as_str));
    for row in records.rows() {
        let values: Vec<String> = row.iter().map(CellValue::to_string).collect();
        push_csv_line(&mut csv_content, values.iter().map(String::as_str));
    }

    csv_content
}

fn push_csv_line<'a>(out: &mut String, values: impl Iterator<Item = &'a str>) {
    for (i, value) in values.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            let escaped = value.replace('"', "\"\"");
            out.push_str(&format!("\"{}\"", escaped));
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

/// Convert a tab's records to XLSX format
///
/// Exports the records to a single worksheet named after the tab using the
/// rust_xlsxwriter library. Numeric cells are written as numbers so they stay
/// numeric in Excel and other spreadsheet applications.
///
/// # Arguments
/// * `records` - The records to convert
/// * `sheet_name` - Name of the worksheet inside the workbook
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
pub fn to_xlsx(records: &Records, sheet_name: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet_name)?;

    for (c, header) in records.headers().iter().enumerate() {
        worksheet.write_string(0, c as u16, header)?;
    }

    for (r, row) in records.rows().iter().enumerate() {
        let xr = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let xc = c as u16;
            match cell {
                CellValue::Int(i) => {
                    worksheet.write_number(xr, xc, *i as f64)?;
                }
                CellValue::Float(x) => {
                    worksheet.write_number(xr, xc, *x)?;
                }
                CellValue::Text(s) if s.is_empty() => {}
                CellValue::Text(s) => {
                    worksheet.write_string(xr, xc, s)?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Records {
        Records::from_grid(vec![
            vec!["Date".into(), "Exercise".into(), "Sets".into()],
            vec!["2024-05-01".into(), "Squat, low bar".into(), "3".into()],
            vec!["2024-05-02".into(), "The \"big\" lift".into(), "5".into()],
        ])
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_escaped_values() {
        assert_eq!(
            to_csv(&records()),
            "Date,Exercise,Sets\n\
             2024-05-01,\"Squat, low bar\",3\n\
             2024-05-02,\"The \"\"big\"\" lift\",5\n"
        );
    }

    #[test]
    fn empty_records_export_headers_only() {
        let records = Records::from_grid(vec![vec!["Date".into(), "Sets".into()]]).unwrap();
        assert_eq!(to_csv(&records), "Date,Sets\n");
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&records(), "Workout Log").unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
