// In-memory retention: a short fixed-capacity ring plus a long window bounded
// by age. Both sit behind one mutex, held only for a single append+prune.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::models::Sample;

pub const DEFAULT_SHORT_CAPACITY: usize = 240;
pub const DEFAULT_LONG_HOURS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Short,
    Long,
}

#[derive(Debug)]
struct Windows {
    short: VecDeque<Sample>,
    long: VecDeque<Sample>,
}

#[derive(Debug)]
pub struct RetentionStore {
    windows: Mutex<Windows>,
    short_capacity: usize,
    long_horizon: TimeDelta,
}

impl Default for RetentionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_CAPACITY, DEFAULT_LONG_HOURS)
    }
}

impl RetentionStore {
    pub fn new(short_capacity: usize, long_hours: u32) -> Self {
        let short_capacity = short_capacity.max(1);
        Self {
            windows: Mutex::new(Windows {
                short: VecDeque::with_capacity(short_capacity),
                long: VecDeque::new(),
            }),
            short_capacity,
            long_horizon: TimeDelta::hours(i64::from(long_hours)),
        }
    }

    // Samples are Copy and every mutation is a single push/pop, so a guard
    // recovered from a panicked holder still sees whole samples.
    fn lock(&self) -> MutexGuard<'_, Windows> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, sample: Sample) {
        self.record_at(sample, Local::now().naive_local());
    }

    /// Appends to both windows, then drops long-window samples older than the
    /// horizon relative to `now`.
    pub fn record_at(&self, sample: Sample, now: NaiveDateTime) {
        let mut w = self.lock();
        if w.short.len() == self.short_capacity {
            w.short.pop_front();
        }
        w.short.push_back(sample);
        w.long.push_back(sample);
        while w
            .long
            .front()
            .is_some_and(|oldest| now - oldest.timestamp > self.long_horizon)
        {
            w.long.pop_front();
        }
    }

    /// Owned copy of one window, oldest first.
    pub fn snapshot(&self, window: Window) -> Vec<Sample> {
        let w = self.lock();
        match window {
            Window::Short => w.short.iter().copied().collect(),
            Window::Long => w.long.iter().copied().collect(),
        }
    }

    pub fn latest(&self) -> Option<Sample> {
        self.lock().short.back().copied()
    }

    pub fn len(&self, window: Window) -> usize {
        let w = self.lock();
        match window {
            Window::Short => w.short.len(),
            Window::Long => w.long.len(),
        }
    }
}
