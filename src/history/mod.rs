// Historical reads over the daily logs: per-date row lookup and a cached
// index of every date that has data.

mod scan;

use crate::daily_log::{DailyLog, LogLayout};
use crate::models::Sample;
use crate::schema::DATE_FORMAT;
use chrono::{Local, NaiveDate};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::instrument;

pub use scan::{dates_in_file, list_log_files, read_day};

/// Side artifact rewritten on every index rebuild.
pub const DATES_FILE: &str = "available_dates.json";
pub const DEFAULT_DATE_INDEX_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct DateCache {
    dates: Vec<NaiveDate>,
    refreshed_at: Option<Instant>,
}

pub struct HistoryIndex {
    log: Arc<DailyLog>,
    refresh_interval: Duration,
    cache: Mutex<DateCache>,
}

impl HistoryIndex {
    pub fn new(log: Arc<DailyLog>, refresh_interval: Duration) -> Self {
        Self {
            log,
            refresh_interval,
            cache: Mutex::new(DateCache::default()),
        }
    }

    fn layout(&self) -> &LogLayout {
        self.log.layout()
    }

    /// Sorted dates with at least one row, up to today. Blocking.
    pub fn list_dates(&self) -> Vec<NaiveDate> {
        self.list_dates_at(Instant::now(), Local::now().date_naive())
    }

    /// Returns the cached index when it was rebuilt less than the refresh
    /// interval before `now`; otherwise rescans every log file.
    pub fn list_dates_at(&self, now: Instant, today: NaiveDate) -> Vec<NaiveDate> {
        // Held across the rebuild so concurrent callers wait for one scan.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = cache
            .refreshed_at
            .is_some_and(|t| now.saturating_duration_since(t) < self.refresh_interval);
        if !fresh {
            cache.dates = self.rebuild(today);
            cache.refreshed_at = Some(now);
        }
        cache.dates.clone()
    }

    /// Forces the next [`HistoryIndex::list_dates`] call to rescan.
    pub fn invalidate(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshed_at = None;
    }

    #[instrument(skip(self), fields(operation = "rebuild_date_index"))]
    fn rebuild(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let mut all = BTreeSet::new();
        for path in list_log_files(self.layout()) {
            match dates_in_file(&path) {
                Ok(dates) => all.extend(dates.into_iter().filter(|d| *d <= today)),
                Err(e) => {
                    tracing::error!(error = %e, file = %path.display(), "reading dates from log file failed");
                }
            }
        }
        let dates: Vec<NaiveDate> = all.into_iter().collect();
        tracing::debug!(dates_count = dates.len(), "date index rebuilt");
        self.persist(&dates);
        dates
    }

    fn persist(&self, dates: &[NaiveDate]) {
        let path = self.layout().log_dir().join(DATES_FILE);
        let strings: Vec<String> = dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        let written = serde_json::to_vec(&strings)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(&path, bytes));
        if let Err(e) = written {
            tracing::error!(error = %e, file = %path.display(), "writing available dates failed");
        }
    }

    /// File holding `date`: the active-directory file for that day, then the
    /// archived one, then the current active file.
    pub fn resolve_file(&self, date: NaiveDate) -> Option<PathBuf> {
        let layout = self.layout();
        [
            layout.active_path(date),
            layout.archive_path(date),
            self.log.active_path(),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// Rows dated `date`, ascending by timestamp. Unreadable files give an
    /// empty result; use [`read_day`] for the error. Blocking.
    #[instrument(skip(self), fields(operation = "query"))]
    pub fn query(&self, date: NaiveDate) -> Vec<Sample> {
        let Some(path) = self.resolve_file(date) else {
            tracing::warn!(%date, "no log file found for date");
            return Vec::new();
        };
        read_day(&path, date).unwrap_or_else(|e| {
            tracing::error!(error = %e, %date, file = %path.display(), "reading log data failed");
            Vec::new()
        })
    }
}
