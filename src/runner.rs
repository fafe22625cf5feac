use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::errors::ReportError;
use crate::models::Report;
use crate::{excel, ingest, pipeline};

/// One tool invocation: read `input`, write the report to `output`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: PipelineConfig,
}

/// Ensure an `.xlsx` extension, appending it when missing.
pub fn with_xlsx_extension(path: &Path) -> PathBuf {
    let mut pb = path.to_path_buf();
    if pb.extension().map(|e| e.to_str()) != Some(Some("xlsx")) {
        let name = format!("{}.xlsx", pb.file_name().and_then(|n| n.to_str()).unwrap_or("report"));
        pb.set_file_name(name);
    }
    pb
}

/// `Decisions_<timestamp>.xlsx` in Downloads (or Desktop), with a counter
/// suffix when that name is taken.
pub fn default_output_path() -> Result<PathBuf, ReportError> {
    let dir = dirs::download_dir()
        .or_else(dirs::desktop_dir)
        .ok_or_else(|| ReportError::Workbook("Could not find Downloads or Desktop folder.".to_string()))?;
    let now = chrono::Local::now();
    let stamp = now.format("%Y%m%d_%H%M%S");
    let mut p = dir.join(format!("Decisions_{}.xlsx", stamp));
    let mut counter = 2u32;
    while p.exists() {
        p = dir.join(format!("Decisions_{}_{}.xlsx", stamp, counter));
        counter += 1;
    }
    Ok(p)
}

/// Input must exist and be a workbook; output must be new and differ from input.
pub fn check_paths(input: &Path, output: &Path) -> Result<(), ReportError> {
    if !input.is_file() {
        return Err(ReportError::InputNotFound(input.to_path_buf()));
    }
    if input.extension().and_then(|e| e.to_str()) != Some("xlsx") {
        return Err(ReportError::NotAWorkbook(input.to_path_buf()));
    }
    if output == input {
        return Err(ReportError::SamePath);
    }
    if output.exists() {
        return Err(ReportError::OutputExists(output.to_path_buf()));
    }
    Ok(())
}

/// Load, validate, build and render. Returns the report that was written.
pub fn run(options: &RunOptions) -> Result<Report, ReportError> {
    check_paths(&options.input, &options.output)?;
    options.config.validate()?;
    let palette = options.config.palette_rgb()?;

    let sheet_rows = excel::load_rows(&options.input, &options.config.loader)?;
    let ingested = ingest::ingest(sheet_rows, options.config.loader.date_from_filename);
    let report = pipeline::build_report(ingested.rows, ingested.skipped, &options.config)?;
    excel::render_report(&report, &palette, &options.output)?;
    Ok(report)
}
