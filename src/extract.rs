//! Roster parsing: uploaded workbook bytes in, one record per data row out.
//!
//! Row 1 is always treated as the header and skipped; this is a fixed
//! convention of the upload format, not configuration. Missing or empty
//! cells degrade to the empty string so a ragged roster still produces a
//! full batch instead of aborting.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable xlsx workbook: {0}")]
    Workbook(String),
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

/// Raw cell payload carried from the worksheet to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Text(String::new()),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(d) => CellValue::Date(d.date()),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => {
                let day = s.get(..10).unwrap_or(s.as_str());
                match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                    Ok(d) => CellValue::Date(d),
                    Err(_) => CellValue::Text(s.clone()),
                }
            }
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    /// Plain string conversion, used for every non-date field and for
    /// filename derivation. Whole numbers drop the trailing `.0` an xlsx
    /// float cell would otherwise leak into the output.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.to_string(),
        }
    }
}

/// Field values for one data row, keyed by the template's field names.
pub struct Record {
    /// 1-based worksheet row this record came from (first data row is 2).
    pub row: u32,
    values: HashMap<&'static str, CellValue>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values.get(field)
    }
}

/// Decode the upload as an xlsx workbook and take its first worksheet.
pub fn parse_workbook(bytes: &[u8]) -> Result<Range<Data>, ExtractError> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ExtractError::Workbook(e.to_string()))?;
    workbook
        .worksheet_range_at(0)
        .ok_or(ExtractError::NoWorksheet)?
        .map_err(|e| ExtractError::Workbook(e.to_string()))
}

/// One record per data row, in worksheet order. Trailing fully-empty rows
/// inside the sheet's used range are kept; they render as blank certificates.
pub fn extract<'a>(
    range: &'a Range<Data>,
    fields: &'static [&'static str],
) -> impl Iterator<Item = Record> + 'a {
    range.rows().skip(1).enumerate().map(move |(i, row)| {
        let mut values = HashMap::with_capacity(fields.len());
        for (col, field) in fields.iter().enumerate() {
            let value = row
                .get(col)
                .map(CellValue::from_cell)
                .unwrap_or_else(|| CellValue::Text(String::new()));
            values.insert(*field, value);
        }
        Record {
            row: i as u32 + 2,
            values,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ROSTER_FIELDS;

    fn roster_range(rows: &[&[&str]]) -> Range<Data> {
        let height = rows.len() as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), 8));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    range.set_value((r as u32, c as u32), Data::String((*cell).to_string()));
                }
            }
        }
        range
    }

    #[test]
    fn header_row_is_always_skipped() {
        let range = roster_range(&[
            &["Rank", "Name", "Regt No"],
            &["CDT", "A Sharma", "PB123"],
        ]);
        let records: Vec<_> = extract(&range, ROSTER_FIELDS).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("rank"),
            Some(&CellValue::Text("CDT".to_string()))
        );
    }

    #[test]
    fn yields_one_record_per_data_row_with_2_based_row_numbers() {
        let range = roster_range(&[
            &["Rank", "Name"],
            &["CDT", "A"],
            &["SGT", "B"],
            &["CPL", "C"],
        ]);
        let rows: Vec<u32> = extract(&range, ROSTER_FIELDS).map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3, 4]);
    }

    #[test]
    fn missing_cells_become_empty_strings() {
        let range = roster_range(&[&["Rank", "Name"], &["CDT"]]);
        let records: Vec<_> = extract(&range, ROSTER_FIELDS).collect();
        assert_eq!(
            records[0].get("name"),
            Some(&CellValue::Text(String::new()))
        );
        assert_eq!(
            records[0].get("certNo"),
            Some(&CellValue::Text(String::new()))
        );
    }

    #[test]
    fn blank_trailing_rows_are_kept() {
        // Used range reports 4 rows; only the first two carry data.
        let mut range = Range::new((0, 0), (3, 8));
        range.set_value((0, 0), Data::String("Rank".to_string()));
        range.set_value((1, 0), Data::String("CDT".to_string()));
        let records: Vec<_> = extract(&range, ROSTER_FIELDS).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2].get("rank"),
            Some(&CellValue::Text(String::new()))
        );
    }

    #[test]
    fn numeric_and_date_cells_keep_their_semantics() {
        let mut range = Range::new((0, 0), (1, 8));
        range.set_value((1, 2), Data::Float(12345.0));
        range.set_value((1, 6), Data::DateTimeIso("2024-06-05T00:00:00".to_string()));
        let records: Vec<_> = extract(&range, ROSTER_FIELDS).collect();
        assert_eq!(records[0].get("regtNo"), Some(&CellValue::Number(12345.0)));
        assert_eq!(
            records[0].get("date"),
            Some(&CellValue::Date(
                NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
            ))
        );
    }

    #[test]
    fn whole_number_display_drops_the_float_suffix() {
        assert_eq!(CellValue::Number(12345.0).display(), "12345");
        assert_eq!(CellValue::Number(12.5).display(), "12.5");
    }

    #[test]
    fn garbage_bytes_are_malformed_input() {
        assert!(parse_workbook(b"not a workbook").is_err());
    }
}
