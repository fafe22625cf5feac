use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::errors::{ConfigError, ValidationError};
use crate::models::{Diagnostics, ExtractionIssue, RawRow, Report};
use crate::services::{aggregator, classifier, grouper, normalizer, TitleParser};

/// Run the stages in order: extract, group, classify, count.
///
/// Only configuration problems fail; per-row extraction failures end up in
/// `Report::diagnostics`. `skipped_rows` are the validation failures from
/// ingestion, carried through so the report tells the whole story.
pub fn build_report(
    rows: Vec<RawRow>,
    skipped_rows: Vec<ValidationError>,
    config: &PipelineConfig,
) -> Result<Report, ConfigError> {
    config.validate()?;
    let parser = TitleParser::new(&config.grammar)?;

    let mut extraction_failures = Vec::new();
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let (record, error) = normalizer::normalize(&parser, row);
        if let Some(error) = error {
            warn!(row = record.source_index, file = %record.filename, "{}", error);
            extraction_failures.push(ExtractionIssue {
                source_index: record.source_index,
                filename: record.filename.clone(),
                error,
            });
        }
        records.push(record);
    }

    let mut records = grouper::group_records(records, config.palette_size());
    classifier::classify_records(&config.categories, &mut records);

    let yearly_counts = aggregator::yearly_counts(&records);
    let year_totals = aggregator::year_totals(&records);

    info!(
        records = records.len(),
        counts = yearly_counts.len(),
        unparsed = extraction_failures.len(),
        skipped = skipped_rows.len(),
        "report built"
    );

    Ok(Report {
        records,
        yearly_counts,
        year_totals,
        diagnostics: Diagnostics {
            extraction_failures,
            skipped_rows,
        },
    })
}
