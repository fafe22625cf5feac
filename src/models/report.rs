use serde::Serialize;

use super::{Category, DecisionRecord};
use crate::errors::{ExtractionError, ValidationError};

/// Unique case numbers for one category in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyCount {
    pub category: Category,
    pub year: i32,
    pub unique_case_count: usize,
}

/// Unique case numbers in one year across every parsed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTotal {
    pub year: i32,
    pub unique_case_count: usize,
}

/// A row whose title yielded no case number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionIssue {
    pub source_index: usize,
    pub filename: String,
    pub error: ExtractionError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub extraction_failures: Vec<ExtractionIssue>,
    pub skipped_rows: Vec<ValidationError>,
}

impl Diagnostics {
    /// No skipped rows and no failed extractions.
    pub fn is_clean(&self) -> bool {
        self.extraction_failures.is_empty() && self.skipped_rows.is_empty()
    }
}

/// Everything the renderer needs: ordered, grouped, categorized records plus
/// the per-year counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub records: Vec<DecisionRecord>,
    /// Sorted by category, then year.
    pub yearly_counts: Vec<YearlyCount>,
    /// Sorted by year.
    pub year_totals: Vec<YearTotal>,
    pub diagnostics: Diagnostics,
}

impl Report {
    pub fn records_in(&self, category: Category) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    pub fn counts_for(&self, category: Category) -> impl Iterator<Item = &YearlyCount> {
        self.yearly_counts.iter().filter(move |c| c.category == category)
    }

    /// Number of distinct groups in the ordered record sequence.
    pub fn group_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.group_index + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RowDefect;

    #[test]
    fn diagnostics_are_clean_only_without_issues() {
        let mut diagnostics = Diagnostics::default();
        assert!(diagnostics.is_clean());

        diagnostics.skipped_rows.push(ValidationError {
            row: 3,
            defect: RowDefect::MissingFilename,
        });
        assert!(!diagnostics.is_clean());

        let diagnostics = Diagnostics {
            extraction_failures: vec![ExtractionIssue {
                source_index: 0,
                filename: "scan.pdf".to_string(),
                error: ExtractionError::NoCaseNumber("scan.pdf".to_string()),
            }],
            skipped_rows: Vec::new(),
        };
        assert!(!diagnostics.is_clean());
    }

    #[test]
    fn empty_report_has_no_groups() {
        assert_eq!(Report::default().group_count(), 0);
    }
}
