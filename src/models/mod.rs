mod case_number;
mod decision;
mod report;

pub use case_number::CaseNumber;
pub use decision::{Category, DecisionRecord, RawRow};
pub use report::{Diagnostics, ExtractionIssue, Report, YearTotal, YearlyCount};
