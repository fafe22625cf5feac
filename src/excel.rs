//! Workbook edges of the tool: reading the decision export with calamine and
//! writing the formatted report with rust_xlsxwriter.

use calamine::{open_workbook_auto, Data, DataType, Reader};
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
    XlsxError,
};
use std::collections::HashMap;
use std::path::Path;

use crate::config::LoaderConfig;
use crate::errors::ReportError;
use crate::ingest::{DateCell, SheetRow};
use crate::models::{Category, DecisionRecord, Report};

const ALL_SHEET: &str = "All decisions";
const HEADERS: &[&str] = &["#", "Filename", "Decision date", "Case numbers"];
/// Year/count table feeding the chart (columns G:H).
const TABLE_COL: u16 = 6;
const CHART_ROW: u32 = 1;
const CHART_COL: u16 = 9;

fn cell_text(cell: Option<&Data>) -> Option<String> {
    let s = cell?.as_string()?;
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn date_cell(cell: Option<&Data>) -> DateCell {
    match cell {
        None | Some(Data::Empty) => DateCell::Empty,
        Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => DateCell::Text(s.clone()),
        Some(c @ (Data::DateTime(_) | Data::Float(_) | Data::Int(_))) => c
            .as_date()
            .map(DateCell::Date)
            .unwrap_or_else(|| DateCell::Text(c.to_string())),
        Some(other) => DateCell::Text(other.to_string()),
    }
}

/// Read data rows (header in the first used row) from the configured sheet, or the
/// first sheet. Completely empty rows are dropped here; everything else goes to
/// validation.
pub fn load_rows(path: &Path, loader: &LoaderConfig) -> Result<Vec<SheetRow>, ReportError> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReportError::Workbook(format!("Could not open Excel file: {}", e)))?;
    let sheet_name = match &loader.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReportError::Workbook("Workbook has no sheets.".to_string()))?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReportError::Workbook(format!("Sheet '{}' not found: {}", sheet_name, e)))?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut rows = Vec::new();
    for (i, row) in range.rows().enumerate() {
        let row_number = start_row + i + 1;
        if i == 0 || row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let cell = |col: usize| col.checked_sub(start_col).and_then(|idx| row.get(idx));
        rows.push(SheetRow {
            row_number,
            filename: cell_text(cell(loader.filename_column)),
            date: date_cell(cell(loader.date_column)),
            case_text: loader
                .case_text_column
                .map(|col| cell_text(cell(col)).unwrap_or_default()),
        });
    }
    tracing::info!(
        sheet = %sheet_name,
        rows = rows.len(),
        date_column = loader.date_column,
        "loaded input rows"
    );
    Ok(rows)
}

/// Drop control characters (except tab, newline, CR) that Excel refuses in cell text.
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            c == '\t' || c == '\n' || c == '\r' || !(u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF)
        })
        .collect()
}

/// Estimate column width from text length (char count × 1.2, clamped 10–50).
fn estimate_text_width(text: &str) -> f64 {
    let w = text.chars().count() as f64 * 1.2;
    w.clamp(10.0, 50.0)
}

fn column_widths(records: &[&DecisionRecord]) -> Vec<f64> {
    let mut widths: Vec<f64> = HEADERS.iter().map(|h| estimate_text_width(h)).collect();
    for record in records {
        let label = record.cases_label();
        let cells = [record.filename.as_str(), "YYYY-MM-DD", label.as_str()];
        for (i, text) in cells.iter().enumerate() {
            widths[i + 1] = widths[i + 1].max(estimate_text_width(text));
        }
    }
    widths[0] = 6.0;
    widths
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Medium)
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF))
}

fn row_format(rgb: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(rgb))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter)
}

fn counter_format(rgb: u32) -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(rgb))
        .set_border(FormatBorder::Medium)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Group counters for one sheet: numbered by first appearance in the sheet,
/// one merged cell per run of consecutive rows of the same group.
fn write_group_counters(
    worksheet: &mut Worksheet,
    records: &[&DecisionRecord],
    palette: &[u32],
) -> Result<(), XlsxError> {
    let mut numbers: HashMap<&str, usize> = HashMap::new();
    let mut start = 0;
    while start < records.len() {
        let key = records[start].group_key.as_str();
        let mut end = start;
        while end + 1 < records.len() && records[end + 1].group_key == key {
            end += 1;
        }
        let next = numbers.len() + 1;
        let number = *numbers.entry(key).or_insert(next);
        let format = counter_format(palette[records[start].color_slot % palette.len()]);
        let (first, last) = (start as u32 + 1, end as u32 + 1);
        if first == last {
            worksheet.write_number_with_format(first, 0, number as f64, &format)?;
        } else {
            worksheet.merge_range(first, 0, last, 0, &number.to_string(), &format)?;
        }
        start = end + 1;
    }
    Ok(())
}

fn write_year_chart(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    years: &[(i32, usize)],
) -> Result<(), XlsxError> {
    if years.is_empty() {
        return Ok(());
    }
    let header = header_format();
    worksheet.write_string_with_format(0, TABLE_COL, "Year", &header)?;
    worksheet.write_string_with_format(0, TABLE_COL + 1, "Unique cases", &header)?;
    for (i, (year, count)) in years.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_number(row, TABLE_COL, *year as f64)?;
        worksheet.write_number(row, TABLE_COL + 1, *count as f64)?;
    }
    worksheet.set_column_width(TABLE_COL + 1, 14.0)?;

    let last = years.len() as u32;
    let total: usize = years.iter().map(|(_, c)| c).sum();
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_categories((sheet_name, 1, TABLE_COL, last, TABLE_COL))
        .set_values((sheet_name, 1, TABLE_COL + 1, last, TABLE_COL + 1))
        .set_data_label(ChartDataLabel::new().show_value());
    let title = format!("Number of Unique Case Numbers per Year (Total: {})", total);
    chart.title().set_name(title.as_str());
    chart.x_axis().set_name("Year");
    chart.y_axis().set_name("Number of Unique Case Numbers");
    chart.legend().set_hidden();
    worksheet.insert_chart(CHART_ROW, CHART_COL, &chart)?;
    Ok(())
}

fn write_decision_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    records: &[&DecisionRecord],
    years: &[(i32, usize)],
    palette: &[u32],
) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, &w) in column_widths(records).iter().enumerate() {
        worksheet.set_column_width(col as u16, w)?;
    }
    let header = header_format();
    for (col, text) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *text, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let format = row_format(palette[record.color_slot % palette.len()]);
        worksheet.write_string_with_format(row, 1, sanitize_cell(&record.filename), &format)?;
        worksheet.write_string_with_format(
            row,
            2,
            record.decision_date.format("%Y-%m-%d").to_string(),
            &format,
        )?;
        worksheet.write_string_with_format(row, 3, sanitize_cell(&record.cases_label()), &format)?;
    }
    write_group_counters(worksheet, records, palette)?;
    worksheet.set_freeze_panes(1, 0)?;
    write_year_chart(worksheet, sheet_name, years)
}

/// Build the report workbook: every record first, then one sheet per
/// reported category and one for unclassified rows. `palette` must be non-empty.
pub fn build_workbook(report: &Report, palette: &[u32]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    let all: Vec<&DecisionRecord> = report.records.iter().collect();
    let totals: Vec<(i32, usize)> = report
        .year_totals
        .iter()
        .map(|t| (t.year, t.unique_case_count))
        .collect();
    write_decision_sheet(&mut workbook, ALL_SHEET, &all, &totals, palette)?;

    for category in Category::REPORTED {
        let records: Vec<&DecisionRecord> = report.records_in(category).collect();
        let years: Vec<(i32, usize)> = report
            .counts_for(category)
            .map(|c| (c.year, c.unique_case_count))
            .collect();
        write_decision_sheet(&mut workbook, category.sheet_name(), &records, &years, palette)?;
    }

    let other: Vec<&DecisionRecord> = report.records_in(Category::Unclassified).collect();
    write_decision_sheet(
        &mut workbook,
        Category::Unclassified.sheet_name(),
        &other,
        &[],
        palette,
    )?;
    Ok(workbook)
}

/// Write the report to `path`.
pub fn render_report(report: &Report, palette: &[u32], path: &Path) -> Result<(), ReportError> {
    if palette.is_empty() {
        return Err(ReportError::Workbook("Palette is empty.".to_string()));
    }
    let mut workbook = build_workbook(report, palette)
        .map_err(|e| ReportError::Workbook(format!("Could not build report: {}", e)))?;
    workbook.save(path).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("being used") {
            ReportError::Workbook("Please close the file in Excel first.".to_string())
        } else {
            ReportError::Workbook(format!("Cannot write to file: {}", msg))
        }
    })?;
    tracing::info!(path = %path.display(), sheets = 2 + Category::REPORTED.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_ampersands_and_drops_control_chars() {
        assert_eq!(sanitize_cell("CAS 1 & CAS 2\u{0007}"), "CAS 1 & CAS 2");
        assert_eq!(sanitize_cell("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(estimate_text_width("ab"), 10.0);
        assert_eq!(estimate_text_width(&"x".repeat(200)), 50.0);
    }

    #[test]
    fn date_cells() {
        assert_eq!(date_cell(None), DateCell::Empty);
        assert_eq!(date_cell(Some(&Data::Empty)), DateCell::Empty);
        assert_eq!(
            date_cell(Some(&Data::String("2020-03-01".into()))),
            DateCell::Text("2020-03-01".into())
        );
        assert_eq!(
            date_cell(Some(&Data::Float(43891.0))),
            DateCell::Date(chrono::NaiveDate::from_ymd_opt(2020, 3, 1).unwrap())
        );
    }
}
