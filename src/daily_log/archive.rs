// Month-bucketed archival of old daily files.

use super::{FILE_PREFIX, FILE_SUFFIX, LogLayout};
use crate::error::{CollectError, Result};
use crate::schema::DATE_FORMAT;
use chrono::{NaiveDate, TimeDelta};
use std::path::PathBuf;

/// Outcome of one archival scan.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// Destination paths of moved files.
    pub moved: Vec<PathBuf>,
    /// Files matching `system_stats_*.csv` without a parseable date.
    pub skipped: usize,
    /// Moves that failed (logged).
    pub failed: usize,
}

/// `system_stats_2024-01-31.csv` -> 2024-01-31.
pub fn date_from_file_name(name: &str) -> Result<NaiveDate> {
    let pattern_err = || CollectError::FilenamePattern {
        name: name.to_string(),
    };
    let stamp = name
        .strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
        .ok_or_else(pattern_err)?;
    let well_formed = stamp.len() == 10
        && stamp.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !well_formed {
        return Err(pattern_err());
    }
    NaiveDate::parse_from_str(stamp, DATE_FORMAT).map_err(|_| pattern_err())
}

pub(super) fn archive_old(
    layout: &LogLayout,
    today: NaiveDate,
    threshold_days: u32,
) -> Result<ArchiveReport> {
    let cutoff = today - TimeDelta::days(i64::from(threshold_days));
    let log_dir = layout.log_dir();
    let entries = std::fs::read_dir(log_dir).map_err(|e| CollectError::io(log_dir, e))?;

    let mut report = ArchiveReport::default();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, dir = %log_dir.display(), "unreadable log dir entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)) {
            continue;
        }
        let date = match date_from_file_name(name) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, file = name, "skipping log file during archival");
                report.skipped += 1;
                continue;
            }
        };
        if date >= cutoff {
            continue;
        }
        let month_dir = layout.archive_month_dir(date);
        let target = month_dir.join(name);
        let moved = std::fs::create_dir_all(&month_dir)
            .and_then(|()| std::fs::rename(&path, &target));
        match moved {
            Ok(()) => {
                tracing::info!(
                    file = name,
                    archive_dir = %month_dir.display(),
                    "archived old log file"
                );
                report.moved.push(target);
            }
            Err(e) => {
                tracing::error!(error = %e, file = name, "failed to archive log file");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}
