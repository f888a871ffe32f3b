// Durable daily CSV log. One file per calendar day in the log directory;
// files past the retention threshold move to archive/YYYY-MM/ unchanged.
// Rotation and archival are driven by the collection loop, not a timer.

mod archive;

pub use archive::{ArchiveReport, date_from_file_name};

use crate::error::{CollectError, Result};
use crate::models::Sample;
use crate::schema::{self, DATE_FORMAT};
use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::instrument;

pub const FILE_PREFIX: &str = "system_stats_";
pub const FILE_SUFFIX: &str = ".csv";
pub const ARCHIVE_DIR: &str = "archive";
pub const DEFAULT_ARCHIVE_AFTER_DAYS: u32 = 30;

/// Where daily files live. Shared by the writer and the history reader.
#[derive(Debug, Clone)]
pub struct LogLayout {
    log_dir: PathBuf,
}

impl LogLayout {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.log_dir.join(ARCHIVE_DIR)
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format(DATE_FORMAT))
    }

    /// `<log_dir>/system_stats_YYYY-MM-DD.csv`
    pub fn active_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(Self::file_name(date))
    }

    pub fn archive_month_dir(&self, date: NaiveDate) -> PathBuf {
        self.archive_dir().join(date.format("%Y-%m").to_string())
    }

    /// `<log_dir>/archive/YYYY-MM/system_stats_YYYY-MM-DD.csv`
    pub fn archive_path(&self, date: NaiveDate) -> PathBuf {
        self.archive_month_dir(date).join(Self::file_name(date))
    }
}

pub struct DailyLog {
    layout: LogLayout,
    active_date: Mutex<NaiveDate>,
    archive_after_days: u32,
}

impl DailyLog {
    pub fn open(log_dir: impl Into<PathBuf>, archive_after_days: u32) -> Result<Self> {
        Self::open_at(log_dir, archive_after_days, Local::now().date_naive())
    }

    /// Creates the log and archive directories and the header of `today`'s
    /// file if needed.
    pub fn open_at(
        log_dir: impl Into<PathBuf>,
        archive_after_days: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        let layout = LogLayout::new(log_dir);
        let archive_dir = layout.archive_dir();
        std::fs::create_dir_all(&archive_dir).map_err(|e| CollectError::io(&archive_dir, e))?;
        Self::ensure_header(&layout.active_path(today))?;
        Ok(Self {
            layout,
            active_date: Mutex::new(today),
            archive_after_days,
        })
    }

    /// Handle over an existing log directory that touches nothing on disk.
    /// For readers; the active date is `today` and no header is written.
    pub fn attach(
        log_dir: impl Into<PathBuf>,
        archive_after_days: u32,
        today: NaiveDate,
    ) -> Self {
        Self {
            layout: LogLayout::new(log_dir),
            active_date: Mutex::new(today),
            archive_after_days,
        }
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

    pub fn active_date(&self) -> NaiveDate {
        *self
            .active_date
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active_path(&self) -> PathBuf {
        self.layout.active_path(self.active_date())
    }

    /// Writes the header row when `path` is missing or empty. Returns whether
    /// it wrote one.
    pub fn ensure_header(path: &Path) -> Result<bool> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CollectError::io(path, e))?;
        if file_len(&file, path)? > 0 {
            return Ok(false);
        }
        write_header(&mut file, path)?;
        tracing::debug!(path = %path.display(), "log header written");
        Ok(true)
    }

    /// Appends one row to the active file and flushes it.
    #[instrument(skip(self, sample), fields(operation = "append"))]
    pub fn append(&self, sample: &Sample) -> Result<()> {
        let path = self.active_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| CollectError::io(&path, e))?;
        // The file may have been removed behind our back since rotation.
        if file_len(&file, &path)? == 0 {
            write_header(&mut file, &path)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(schema::format_row(sample))
            .map_err(|e| CollectError::csv(&path, e))?;
        writer.flush().map_err(|e| CollectError::io(&path, e))?;
        Ok(())
    }

    /// Switches the active file when `today` differs from the active date,
    /// writes the new file's header, then archives old files. Returns whether
    /// a rotation happened.
    #[instrument(skip(self), fields(operation = "rotate"))]
    pub fn rotate_if_day_changed(&self, today: NaiveDate) -> Result<bool> {
        let previous = {
            let mut active = self
                .active_date
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *active == today {
                return Ok(false);
            }
            std::mem::replace(&mut *active, today)
        };
        tracing::info!(from = %previous, to = %today, "day changed, rotating log file");
        Self::ensure_header(&self.layout.active_path(today))?;
        if let Err(e) = self.archive_old_at(today, self.archive_after_days) {
            tracing::error!(error = %e, operation = "archive_old", "log archival failed");
        }
        Ok(true)
    }

    pub fn archive_old(&self) -> Result<ArchiveReport> {
        self.archive_old_at(Local::now().date_naive(), self.archive_after_days)
    }

    /// Moves `system_stats_*.csv` files dated before `today - threshold_days`
    /// into their archive month directory.
    #[instrument(skip(self), fields(operation = "archive_old"))]
    pub fn archive_old_at(&self, today: NaiveDate, threshold_days: u32) -> Result<ArchiveReport> {
        archive::archive_old(&self.layout, today, threshold_days)
    }
}

fn file_len(file: &File, path: &Path) -> Result<u64> {
    file.metadata()
        .map(|m| m.len())
        .map_err(|e| CollectError::io(path, e))
}

fn write_header(file: &mut File, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer
        .write_record(schema::header())
        .map_err(|e| CollectError::csv(path, e))?;
    writer.flush().map_err(|e| CollectError::io(path, e))
}
