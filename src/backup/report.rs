//! Summary of a backup run, as a text table or as JSON.

use crate::backup::outcome::{ArchiveResult, ArchiveStatus};
use crate::backup::result_error::result::Result;

use clap::ValueEnum;
use serde::Serialize;
use serde_with::skip_serializing_none;

use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

static HEADERS: [&str; 6] = [
    "Target",
    "Archived Files",
    "Archived Bytes",
    "Ignored Files",
    "Archive Size",
    "Status",
];

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    target: &'a str,
    status: ArchiveStatus,
    archived_file_count: Option<u64>,
    archived_byte_count: Option<u64>,
    ignored_file_count: Option<u64>,
    archive_size: Option<u64>,
    archive_path: Option<PathBuf>,
    error: Option<String>,
}

impl<'a> From<&'a ArchiveResult> for ReportRow<'a> {
    fn from(result: &'a ArchiveResult) -> Self {
        Self {
            target: result.target().description(),
            status: result.status(),
            archived_file_count: result.archived_file_count(),
            archived_byte_count: result.archived_byte_count(),
            ignored_file_count: result.ignored_file_count(),
            archive_size: result.archive_size(),
            archive_path: result.archive_path().map(PathBuf::from),
            error: result.error().map(ToString::to_string),
        }
    }
}

pub fn all_succeeded(results: &[ArchiveResult]) -> bool {
    results.iter().all(ArchiveResult::is_success)
}

pub fn render(results: &[ArchiveResult], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(render_table(results)),
        ReportFormat::Json => render_json(results),
    }
}

pub fn render_json(results: &[ArchiveResult]) -> Result<String> {
    let rows: Vec<ReportRow> = results.iter().map(ReportRow::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Renders the summary table. Numbers are right aligned, the status centered, and
/// absent figures of failed targets shown as `-`. Errors are listed below the table.
pub fn render_table(results: &[ArchiveResult]) -> String {
    let cell = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    let rows: Vec<[String; 6]> = results
        .iter()
        .map(|r| {
            [
                r.target().description().clone(),
                cell(r.archived_file_count()),
                cell(r.archived_byte_count()),
                cell(r.ignored_file_count()),
                cell(r.archive_size()),
                r.status().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{separator}+\n");

    let mut out = String::new();
    out.push_str("Summary\n");
    out.push_str(&separator);
    push_row(&mut out, &HEADERS.map(String::from), &widths, true);
    out.push_str(&separator);
    for row in &rows {
        push_row(&mut out, row, &widths, false);
        out.push_str(&separator);
    }

    for result in results {
        if let Some(error) = result.error() {
            let _ = writeln!(
                out,
                "\n{} failed:\n{}",
                result.target().description(),
                indent::indent_all_with("  ", error.to_string())
            );
        }
    }
    out
}

fn push_row(out: &mut String, row: &[String; 6], widths: &[usize; 6], header: bool) {
    out.push('|');
    for (idx, (value, width)) in row.iter().zip(widths.iter().copied()).enumerate() {
        let _ = match idx {
            _ if header => write!(out, " {value:^width$} |"),
            0 => write!(out, " {value:<width$} |"),
            5 => write!(out, " {value:^width$} |"),
            _ => write!(out, " {value:>width$} |"),
        };
    }
    out.push('\n');
}
