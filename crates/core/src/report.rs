//! Report rendering and writing.
//!
//! Two artifacts are produced per run:
//! - an xlsx workbook with one row per successful result and a summary row
//! - a failure list in the task-list format, ready to be fed back as input

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, ColNum, Format, FormatAlign, RowNum, Workbook, XlsxError};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::config::OutputConfig;
use crate::runner::RunReport;
use crate::task::{CheckResult, MAX_TICKETS};

/// Name of the single worksheet in the report workbook.
pub const SHEET_NAME: &str = "Check Results";

const IDENTITY_HEADERS: [&str; 6] = [
    "Name",
    "Credential",
    "Crowd Type",
    "Tour Date",
    "Start Date",
    "End Date",
];

/// Identity columns followed by an item/status pair per ticket slot.
const COLUMN_COUNT: ColNum = (IDENTITY_HEADERS.len() + MAX_TICKETS * 2) as ColNum;

/// Column holding the success count in the summary row.
const SUMMARY_COUNT_COLUMN: ColNum = 5;

const COLUMN_WIDTH: f64 = 25.0;
const HEADER_ROW_HEIGHT: f64 = 30.0;
const ROW_HEIGHT: f64 = 25.0;
const SUMMARY_ROW_HEIGHT: f64 = 60.0;

/// Errors that can occur while writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create the output directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a report file.
    #[error("Failed to write report: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook could not be assembled.
    #[error("Failed to render spreadsheet: {0}")]
    Spreadsheet(#[from] XlsxError),
}

/// Locations of the written reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub table: PathBuf,
    pub failures: PathBuf,
}

/// Render the success spreadsheet as xlsx bytes.
///
/// The header row is bold and shaded, the first row and column are frozen,
/// and an autofilter spans the header and the result rows.
pub fn render_table(report: &RunReport) -> Result<Vec<u8>, ReportError> {
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(0xD9E1F2));
    let cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for col in 0..COLUMN_COUNT {
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    sheet.set_row_height(0, HEADER_ROW_HEIGHT)?;
    for (col, header) in header_row().iter().enumerate() {
        sheet.write_string_with_format(0, col as ColNum, header, &header_format)?;
    }

    let mut row: RowNum = 1;
    for result in &report.successes {
        sheet.set_row_height(row, ROW_HEIGHT)?;
        for (col, cell) in result_row(result).iter().enumerate() {
            if !cell.is_empty() {
                sheet.write_string_with_format(row, col as ColNum, cell, &cell_format)?;
            }
        }
        row += 1;
    }

    sheet.set_freeze_panes(1, 1)?;
    sheet.autofilter(0, 0, row.saturating_sub(1), COLUMN_COUNT - 1)?;

    sheet.set_row_height(row, SUMMARY_ROW_HEIGHT)?;
    sheet.write_string_with_format(row, 0, "Total", &header_format)?;
    sheet.write_string_with_format(
        row,
        SUMMARY_COUNT_COLUMN,
        format!("Succeeded: {}", report.success_count()),
        &cell_format,
    )?;

    Ok(workbook.save_to_buffer()?)
}

/// Render the failed tasks as `name credential` lines.
///
/// A failure whose name or credential is blank would not parse back as a
/// task, so it is left out of the list and logged instead.
pub fn render_failures(report: &RunReport) -> String {
    report
        .failures
        .iter()
        .filter(|r| {
            let rerunnable = !r.visitor_name.trim().is_empty() && !r.credential.trim().is_empty();
            if !rerunnable {
                warn!(
                    name = %r.visitor_name,
                    credential = %r.credential,
                    "Failed task has no usable identity, leaving it out of the failure list"
                );
            }
            rerunnable
        })
        .map(|r| format!("{} {}\n", r.visitor_name, r.credential))
        .collect()
}

fn header_row() -> Vec<String> {
    let mut header: Vec<String> = IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    for slot in 1..=MAX_TICKETS {
        header.push(format!("Item {}", slot));
        header.push(format!("Status {}", slot));
    }
    header
}

fn result_row(result: &CheckResult) -> Vec<String> {
    let mut row = vec![
        result.visitor_name.clone(),
        result.credential.clone(),
        result.crowd_type_name.clone(),
        result.tour_date.clone(),
        result.start_date.clone(),
        result.end_date.clone(),
    ];
    for ticket in result.tickets.iter().take(MAX_TICKETS) {
        row.push(ticket.sku_name.clone());
        row.push(ticket.child_status_name.clone());
    }
    row
}

/// Writes run reports into the configured output directory.
pub struct ReportWriter {
    config: OutputConfig,
}

impl ReportWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write `<timestamp>-<date>.xlsx` and the failure list.
    pub async fn write(&self, report: &RunReport, date: &str) -> Result<ReportPaths, ReportError> {
        let table = render_table(report)?;

        fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|source| ReportError::DirectoryCreationFailed {
                path: self.config.dir.clone(),
                source,
            })?;

        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let paths = ReportPaths {
            table: self.config.dir.join(format!("{}-{}.xlsx", stamp, date)),
            failures: self.config.dir.join(&self.config.failures_file),
        };

        write_file(&paths.table, table).await?;
        write_file(&paths.failures, render_failures(report).into_bytes()).await?;

        info!(
            table = %paths.table.display(),
            failures = %paths.failures.display(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Reports written"
        );

        Ok(paths)
    }
}

async fn write_file(path: &Path, contents: Vec<u8>) -> Result<(), ReportError> {
    fs::write(path, contents)
        .await
        .map_err(|source| ReportError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
}
