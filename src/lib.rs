pub mod config;
pub mod errors;
pub mod excel;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod runner;
pub mod services;

pub use config::{CaseGrammar, CategoryRule, FilenameMatch, LoaderConfig, PipelineConfig};
pub use errors::{ConfigError, ExtractionError, ReportError, RowDefect, ValidationError};
pub use models::{
    CaseNumber, Category, DecisionRecord, Diagnostics, ExtractionIssue, RawRow, Report, YearTotal,
    YearlyCount,
};
pub use pipeline::build_report;
pub use runner::{run, RunOptions};
pub use services::TitleParser;
