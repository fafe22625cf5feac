//! Row validation between the workbook loader and the pipeline.
//!
//! The loader hands over loosely typed cells; only rows with a filename, a
//! usable date and non-empty case text become [`RawRow`]s. Everything else is
//! reported as a [`ValidationError`] and skipped.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{RowDefect, ValidationError};
use crate::models::RawRow;

/// Date layouts seen in exports, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y %m %d", "%Y/%m/%d"];

/// Decision date as read from the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCell {
    Empty,
    Date(NaiveDate),
    Text(String),
}

/// One sheet row before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based spreadsheet row number.
    pub row_number: usize,
    pub filename: Option<String>,
    pub date: DateCell,
    /// `None` means the filename carries the case text.
    pub case_text: Option<String>,
}

/// Accepted rows in input order plus the rows that were rejected.
#[derive(Debug, Default)]
pub struct Ingested {
    pub rows: Vec<RawRow>,
    pub skipped: Vec<ValidationError>,
}

/// Parse a textual date; the time part of `YYYY-MM-DD HH:MM:SS` is ignored.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
}

/// `YYYY MM DD` at the start of a filename, e.g. `2019 05 02 [CAS Web Archives] ...`.
pub fn date_from_filename(filename: &str) -> Option<NaiveDate> {
    static LEADING_DATE: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_DATE
        .get_or_init(|| Regex::new(r"^\s*(\d{4}) (\d{2}) (\d{2})").expect("leading date regex"));
    let caps = re.captures(filename)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

pub fn validate_row(
    row: SheetRow,
    source_index: usize,
    date_fallback: bool,
) -> Result<RawRow, ValidationError> {
    let fail = |defect| ValidationError {
        row: row.row_number,
        defect,
    };

    let filename = row
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| fail(RowDefect::MissingFilename))?
        .to_string();

    let decision_date = match &row.date {
        DateCell::Date(date) => *date,
        DateCell::Text(text) if !text.trim().is_empty() => {
            parse_date_text(text).ok_or_else(|| fail(RowDefect::InvalidDate(text.trim().to_string())))?
        }
        _ => date_fallback
            .then(|| date_from_filename(&filename))
            .flatten()
            .ok_or_else(|| fail(RowDefect::MissingDate))?,
    };

    let case_text = match &row.case_text {
        Some(text) => text.trim().to_string(),
        None => filename.clone(),
    };
    if case_text.is_empty() {
        return Err(fail(RowDefect::EmptyCaseText));
    }

    Ok(RawRow {
        filename,
        decision_date,
        case_text,
        source_index,
    })
}

/// Validate every row. `source_index` is the row's position in `rows`.
pub fn ingest(rows: Vec<SheetRow>, date_fallback: bool) -> Ingested {
    let mut out = Ingested::default();
    for (index, row) in rows.into_iter().enumerate() {
        match validate_row(row, index, date_fallback) {
            Ok(raw) => out.rows.push(raw),
            Err(e) => {
                tracing::warn!(row = e.row, "skipping row: {}", e);
                out.skipped.push(e);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_row(filename: Option<&str>, date: DateCell, text: Option<&str>) -> SheetRow {
        SheetRow {
            row_number: 2,
            filename: filename.map(String::from),
            date,
            case_text: text.map(String::from),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_text_formats() {
        assert_eq!(parse_date_text("2020-03-01"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("01.03.2020"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("01/03/2020"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("2020 03 01"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("2020-03-01 00:00:00"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("2020-03-01T12:30:00"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date_text("March"), None);
    }

    #[test]
    fn filename_date_prefix() {
        assert_eq!(
            date_from_filename("2019 05 02 [CAS Web Archives] CAS 2018 A 1.pdf"),
            Some(ymd(2019, 5, 2))
        );
        assert_eq!(date_from_filename("CAS 2018 A 1.pdf"), None);
        assert_eq!(date_from_filename("2019 13 02 x.pdf"), None);
    }

    #[test]
    fn filename_doubles_as_case_text() {
        let raw = validate_row(
            sheet_row(Some(" CAS 2020 A 1.pdf "), DateCell::Date(ymd(2020, 1, 2)), None),
            4,
            true,
        )
        .unwrap();
        assert_eq!(raw.filename, "CAS 2020 A 1.pdf");
        assert_eq!(raw.case_text, "CAS 2020 A 1.pdf");
        assert_eq!(raw.source_index, 4);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = validate_row(sheet_row(None, DateCell::Date(ymd(2020, 1, 2)), None), 0, true)
            .unwrap_err();
        assert_eq!(err.defect, RowDefect::MissingFilename);

        let err = validate_row(sheet_row(Some("a.pdf"), DateCell::Empty, None), 0, true).unwrap_err();
        assert_eq!(err.defect, RowDefect::MissingDate);

        let err = validate_row(
            sheet_row(Some("a.pdf"), DateCell::Text("soon".into()), None),
            0,
            true,
        )
        .unwrap_err();
        assert_eq!(err.defect, RowDefect::InvalidDate("soon".into()));

        let err = validate_row(
            sheet_row(Some("a.pdf"), DateCell::Date(ymd(2020, 1, 2)), Some("  ")),
            0,
            true,
        )
        .unwrap_err();
        assert_eq!(err.defect, RowDefect::EmptyCaseText);
    }

    #[test]
    fn empty_date_falls_back_to_filename_when_enabled() {
        let row = sheet_row(Some("2019 05 02 CAS 2018 A 1.pdf"), DateCell::Empty, None);
        assert_eq!(
            validate_row(row.clone(), 0, true).unwrap().decision_date,
            ymd(2019, 5, 2)
        );
        assert_eq!(
            validate_row(row, 0, false).unwrap_err().defect,
            RowDefect::MissingDate
        );
    }

    #[test]
    fn ingest_keeps_going_after_bad_rows() {
        let rows = vec![
            sheet_row(Some("a.pdf"), DateCell::Date(ymd(2020, 1, 2)), Some("CAS 2020 A 1")),
            sheet_row(None, DateCell::Empty, None),
            sheet_row(Some("c.pdf"), DateCell::Date(ymd(2020, 1, 3)), Some("CAS 2020 A 2")),
        ];
        let ingested = ingest(rows, true);
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(ingested.skipped.len(), 1);
        assert_eq!(ingested.rows[1].source_index, 2);
    }
}
