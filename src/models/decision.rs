use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::CaseNumber;

/// One accepted input row. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    pub filename: String,
    pub decision_date: NaiveDate,
    pub case_text: String,
    /// 0-based position in the input, used as the ordering tie-break.
    pub source_index: usize,
}

/// Report category derived from the filename.
///
/// Declaration order is the sheet order in the rendered workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, serde::Deserialize)]
pub enum Category {
    Archive,
    Bull,
    Unclassified,
}

impl Category {
    /// Categories that get their own sheet and yearly counts.
    pub const REPORTED: [Category; 2] = [Category::Archive, Category::Bull];

    pub fn sheet_name(self) -> &'static str {
        match self {
            Category::Archive => "Archive",
            Category::Bull => "Bull",
            Category::Unclassified => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// A decision row after extraction, with grouping and category assigned by
/// the later pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub filename: String,
    pub case_text: String,
    pub decision_date: NaiveDate,
    pub case_numbers: BTreeSet<CaseNumber>,
    pub category: Category,
    pub group_key: String,
    /// Running distinct-group index in output order, starting at 0.
    pub group_index: usize,
    pub color_slot: usize,
    pub source_index: usize,
}

impl DecisionRecord {
    /// Whether extraction produced at least one case number.
    pub fn is_parsed(&self) -> bool {
        !self.case_numbers.is_empty()
    }

    pub fn year(&self) -> i32 {
        self.decision_date.year()
    }

    /// Case numbers in canonical form, joined for display.
    pub fn cases_label(&self) -> String {
        self.case_numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" & ")
    }
}
