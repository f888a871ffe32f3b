// Read-only query surface over live windows and daily logs. Every call
// returns owned data, never a view into the live containers.

use crate::history::HistoryIndex;
use crate::models::Sample;
use crate::retention::{RetentionStore, Window};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct Monitor {
    store: Arc<RetentionStore>,
    history: Arc<HistoryIndex>,
}

impl Monitor {
    pub fn new(store: Arc<RetentionStore>, history: Arc<HistoryIndex>) -> Self {
        Self { store, history }
    }

    /// Most recently collected sample, if any.
    pub fn current_sample(&self) -> Option<Sample> {
        self.store.latest()
    }

    pub fn short_history_snapshot(&self) -> Vec<Sample> {
        self.store.snapshot(Window::Short)
    }

    pub fn long_history_snapshot(&self) -> Vec<Sample> {
        self.store.snapshot(Window::Long)
    }

    /// Blocking: may rescan every log file.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.history.list_dates()
    }

    /// Blocking: parses one daily file.
    pub fn log_data_for(&self, date: NaiveDate) -> Vec<Sample> {
        self.history.query(date)
    }
}
