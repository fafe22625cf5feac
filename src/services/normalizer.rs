use std::collections::BTreeSet;

use super::title_parser::TitleParser;
use crate::errors::ExtractionError;
use crate::models::{Category, DecisionRecord, RawRow};

/// Turn an accepted row into a record. Grouping fields are placeholders until
/// the grouper runs; category starts as `Unclassified` for every record.
///
/// A failed extraction still yields a record (empty case set) alongside the
/// error, so the row stays visible in the report.
pub fn normalize(parser: &TitleParser, row: RawRow) -> (DecisionRecord, Option<ExtractionError>) {
    let (case_numbers, error) = match parser.parse(&row.case_text) {
        Ok(cases) => (cases, None),
        Err(e) => (BTreeSet::new(), Some(e)),
    };
    let record = DecisionRecord {
        filename: row.filename,
        case_text: row.case_text,
        decision_date: row.decision_date,
        case_numbers,
        category: Category::Unclassified,
        group_key: String::new(),
        group_index: 0,
        color_slot: 0,
        source_index: row.source_index,
    };
    (record, error)
}
