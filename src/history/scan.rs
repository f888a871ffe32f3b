// Log file discovery and CSV parsing for history reads.

use crate::daily_log::LogLayout;
use crate::error::{CollectError, Result};
use crate::models::Sample;
use crate::schema::{self, RowLayout, TIMESTAMP_HEADER};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

fn csv_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect()
}

/// Every `*.csv` in the log directory and in each archive month directory,
/// sorted by path.
pub fn list_log_files(layout: &LogLayout) -> Vec<PathBuf> {
    let mut files = csv_files_in(layout.log_dir());
    if let Ok(months) = std::fs::read_dir(layout.archive_dir()) {
        for month in months.filter_map(|e| e.ok().map(|e| e.path())) {
            if month.is_dir() {
                files.extend(csv_files_in(&month));
            }
        }
    }
    files.sort();
    files
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        // A row being appended while we read may be short.
        .flexible(true)
        .from_path(path)
        .map_err(|e| CollectError::csv(path, e))
}

/// Unique row dates of one file, using its timestamp-like column.
pub fn dates_in_file(path: &Path) -> Result<BTreeSet<NaiveDate>> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| CollectError::csv(path, e))?
        .clone();
    let col = schema::find_time_column(&headers).ok_or_else(|| CollectError::MissingColumn {
        path: path.to_path_buf(),
        column: TIMESTAMP_HEADER.to_string(),
    })?;
    let mut dates = BTreeSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| CollectError::csv(path, e))?;
        if let Some(date) = record.get(col).and_then(schema::parse_date) {
            dates.insert(date);
        }
    }
    Ok(dates)
}

/// Rows of `path` dated `date`, sorted ascending by timestamp. Malformed rows
/// are skipped with a warning.
pub fn read_day(path: &Path, date: NaiveDate) -> Result<Vec<Sample>> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| CollectError::csv(path, e))?
        .clone();
    let layout = RowLayout::from_headers(&headers).map_err(|column| CollectError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| CollectError::csv(path, e))?;
        match layout.parse(&record) {
            Some(s) if s.timestamp.date() == date => rows.push(s),
            Some(_) => {}
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(file = %path.display(), skipped, "skipped malformed log rows");
    }
    rows.sort_by_key(|s| s.timestamp);
    Ok(rows)
}
