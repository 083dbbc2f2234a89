//! Text and JSON output of an analysis.

use serde::Serialize;
use std::io::{self, Write};

use crate::analysis::{
    AnalysisSession, CategoryRow, DisplayConfig, FileRecord, FileRow, category_rows, file_rows,
    format_bytes, select_visible,
};

const BAR_WIDTH: usize = 20;

/// Everything one render shows
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub file: &'a str,
    pub total_bytes: u64,
    pub total: String,
    pub config: DisplayConfig,
    pub categories: Vec<CategoryRow>,
    pub files: Vec<FileRow>,
}

impl<'a> Report<'a> {
    pub fn new(session: &'a AnalysisSession, config: &DisplayConfig) -> Self {
        Self {
            file: &session.filename_label,
            total_bytes: session.total_uncompressed_size,
            total: format_bytes(session.total_uncompressed_size),
            config: *config,
            categories: category_rows(session),
            files: file_rows(select_visible(&session.files, config)),
        }
    }
}

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn write_header(out: &mut impl Write, session: &AnalysisSession) -> io::Result<()> {
    writeln!(
        out,
        "{} ({})",
        session.filename_label,
        format_bytes(session.total_uncompressed_size)
    )
}

pub fn write_categories(out: &mut impl Write, rows: &[CategoryRow]) -> io::Result<()> {
    writeln!(out, "{:<22} {:>10} {:>6}", "Category", "Size", "Share")?;
    for row in rows {
        writeln!(
            out,
            "{:<22} {:>10} {:>5.1}%  {}",
            row.category.label(),
            format_bytes(row.total_bytes),
            row.percent_of_total,
            bar(row.percent_of_total)
        )?;
    }
    Ok(())
}

/// File table; previewable rows are marked with `*`.
pub fn write_files(out: &mut impl Write, files: &[&FileRecord]) -> io::Result<()> {
    if files.is_empty() {
        return writeln!(out, "(no files match the current filters)");
    }
    writeln!(out, "{:>10}  {:<20} File", "Size", "Category")?;
    for row in files.iter().copied().map(FileRow::from) {
        let marker = if row.is_previewable { '*' } else { ' ' };
        writeln!(
            out,
            "{:>10}  {:<20} {marker} {}",
            format_bytes(row.size_bytes),
            row.category.label(),
            row.path
        )?;
    }
    Ok(())
}

pub fn write_report(
    out: &mut impl Write,
    session: &AnalysisSession,
    config: &DisplayConfig,
) -> io::Result<()> {
    write_header(out, session)?;
    writeln!(out)?;
    write_categories(out, &category_rows(session))?;
    writeln!(out)?;
    write_files(out, &select_visible(&session.files, config))
}

pub fn write_json(
    out: &mut impl Write,
    session: &AnalysisSession,
    config: &DisplayConfig,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &Report::new(session, config))?;
    writeln!(out)?;
    Ok(())
}
