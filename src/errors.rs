use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A title that does not follow the configured case-number convention.
///
/// Never fatal: the record is kept as unclassified and the error is reported
/// in the run diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ExtractionError {
    #[error("no case number found in '{0}'")]
    NoCaseNumber(String),
    #[error("case number '{0}' is out of range")]
    NumberOutOfRange(String),
}

/// Which required field of an input row was missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowDefect {
    MissingFilename,
    MissingDate,
    InvalidDate(String),
    EmptyCaseText,
}

/// A structurally invalid input row. The row is skipped, the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("row {row}: {}", describe_defect(.defect))]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// 1-based spreadsheet row number (header is row 1).
    pub row: usize,
    pub defect: RowDefect,
}

fn describe_defect(defect: &RowDefect) -> String {
    match defect {
        RowDefect::MissingFilename => "filename is empty".to_string(),
        RowDefect::MissingDate => "decision date is missing".to_string(),
        RowDefect::InvalidDate(raw) => format!("decision date '{}' is not a date", raw),
        RowDefect::EmptyCaseText => "case text is empty".to_string(),
    }
}

/// Rejected pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("case grammar needs at least one prefix")]
    NoPrefixes,
    #[error("case grammar prefix '{0}' must be alphanumeric")]
    InvalidPrefix(String),
    #[error("case grammar needs at least one continuation delimiter")]
    NoDelimiters,
    #[error("case grammar does not compile: {0}")]
    Pattern(#[from] regex::Error),
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("palette color '{0}' is not a 6-digit hex color")]
    InvalidColor(String),
    #[error("could not read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Run-level failure: nothing useful can be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("input file {0} not found")]
    InputNotFound(PathBuf),
    #[error("input file {0} must be an .xlsx workbook")]
    NotAWorkbook(PathBuf),
    #[error("output file {0} already exists")]
    OutputExists(PathBuf),
    #[error("output file must differ from the input file")]
    SamePath,
    #[error("{0}")]
    Workbook(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
