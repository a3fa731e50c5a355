//! # Clock
//!
//! Source of "now" for code that depends on the current date: order-number
//! years, delivery-date checks, default report windows.
//!
//! Repositories hold an `Arc<dyn Clock>` so tests can pin the date.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::fmt::Debug;

/// Supplies the current instant.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// The current UTC calendar year.
    fn year(&self) -> i32 {
        self.now().year()
    }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        FixedClock(at)
    }

    /// Noon UTC on the given date. Returns `None` for an invalid date.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
