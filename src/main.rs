use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use decision_report_lib::runner::{default_output_path, with_xlsx_extension};
use decision_report_lib::{run, PipelineConfig, Report, ReportError, RunOptions};

const LOG_ENV: &str = "DECISION_REPORT_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "decision-report",
    about = "Group tribunal decisions by case numbers and chart unique cases per year",
    long_about = "Read a decision export (filename, decision date, case text), extract case numbers, group identical decisions and write a multi-sheet Excel report with per-year charts.",
    after_help = "Config is resolved from --config, then DECISION_REPORT_CONFIG, then built-in defaults. Set DECISION_REPORT_LOG to tune logging."
)]
struct Cli {
    #[arg(value_name = "INPUT", help = "Decision export workbook (.xlsx is appended when missing)")]
    input: PathBuf,
    #[arg(
        short,
        long,
        value_name = "OUTPUT",
        help = "Report path; must not exist (default: Downloads/Decisions_<timestamp>.xlsx)"
    )]
    output: Option<PathBuf>,
    #[arg(long, value_name = "NAME", help = "Input sheet (default: first sheet)")]
    sheet: Option<String>,
    #[arg(long, value_name = "FILE", help = "JSON pipeline config")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print the report as JSON on stdout")]
    json: bool,
    #[arg(long, help = "Open the report when done")]
    open: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("decision_report_lib=info,decision_report=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn print_summary(report: &Report) {
    eprintln!(
        "{} decisions in {} groups, {} category/year counts",
        report.records.len(),
        report.group_count(),
        report.yearly_counts.len()
    );
    let diagnostics = &report.diagnostics;
    if diagnostics.is_clean() {
        return;
    }
    if !diagnostics.skipped_rows.is_empty() {
        eprintln!("{} row(s) skipped:", diagnostics.skipped_rows.len());
        for err in &diagnostics.skipped_rows {
            eprintln!("  {}", err);
        }
    }
    if !diagnostics.extraction_failures.is_empty() {
        eprintln!(
            "{} decision(s) without a recognizable case number:",
            diagnostics.extraction_failures.len()
        );
        for issue in &diagnostics.extraction_failures {
            eprintln!("  {}", issue.filename);
        }
    }
}

fn execute(cli: Cli, mut config: PipelineConfig) -> Result<(), ReportError> {
    if let Some(sheet) = cli.sheet {
        config.loader.sheet = Some(sheet);
    }
    let input = with_xlsx_extension(&cli.input);
    let output = match cli.output {
        Some(p) => with_xlsx_extension(&p),
        None => default_output_path()?,
    };

    let report = run(&RunOptions {
        input,
        output: output.clone(),
        config,
    })?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ReportError::Workbook(format!("Could not serialize report: {}", e)))?;
        println!("{}", json);
    }
    print_summary(&report);
    eprintln!("Report saved to {}", output.display());

    if cli.open {
        if let Err(e) = opener::open(&output) {
            tracing::warn!("could not open {}: {}", output.display(), e);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Resolving also loads `.env`, which may set the log filter.
    let config = match PipelineConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing();
    match execute(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
