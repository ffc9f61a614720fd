//! Exam calendar primitives.
//!
//! Defines the time-of-day interval an exam occupies, the lazy sequence of
//! eligible exam dates within a program, and the list of daily start slots.
//!
//! # Time Model
//! Dates are calendar dates (`NaiveDate`) and times are wall-clock times of
//! day (`NaiveTime`) in the institution's local time. An exam never crosses
//! midnight.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Weekdays excluded when no explicit list is given.
pub const DEFAULT_EXCLUDED_WEEKDAYS: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

/// A time-of-day interval [start, end).
///
/// Half-open interval: includes start, excludes end. Two exams where one
/// ends exactly when the other starts do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (exclusive).
    pub end: NaiveTime,
}

impl TimeRange {
    /// Creates a new range.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Creates the range `[start, start + length)`.
    ///
    /// Returns `None` if `length` is not positive or the range would run
    /// past midnight.
    pub fn starting_at(start: NaiveTime, length: Duration) -> Option<Self> {
        if length <= Duration::zero() {
            return None;
        }
        let (end, wrapped_secs) = start.overflowing_add_signed(length);
        if wrapped_secs != 0 || end <= start {
            return None;
        }
        Some(Self { start, end })
    }

    /// Length of this range.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether a time falls within this range.
    #[inline]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Lazy iterator over the dates of `[start, end]` not on an excluded weekday.
///
/// Finite and restartable: a clone taken before iteration replays the
/// whole sequence.
#[derive(Debug, Clone)]
pub struct EligibleDates {
    next: Option<NaiveDate>,
    end: NaiveDate,
    excluded: Vec<Weekday>,
}

impl EligibleDates {
    /// Creates the iterator. An inverted range yields nothing.
    pub fn new(start: NaiveDate, end: NaiveDate, excluded: &[Weekday]) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
            excluded: excluded.to_vec(),
        }
    }
}

impl Iterator for EligibleDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while let Some(date) = self.next {
            self.next = date.succ_opt().filter(|d| *d <= self.end);
            if !self.excluded.contains(&date.weekday()) {
                return Some(date);
            }
        }
        None
    }
}

/// Builders for the ordered list of daily exam start times.
pub struct SlotPlan;

impl SlotPlan {
    /// The four default daily slots: 09:00, 11:00, 13:30, 15:30.
    pub fn default_slots() -> Vec<NaiveTime> {
        [(9, 0), (11, 0), (13, 30), (15, 30)]
            .into_iter()
            .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect()
    }

    /// Derives slots from an exam length and the gap kept between exams.
    ///
    /// Starts at `first` and steps by `exam + gap` while the start time is
    /// at or before `last_start`. A non-positive step yields only `first`.
    ///
    /// # Example
    /// ```
    /// use chrono::{Duration, NaiveTime};
    /// use u_exam::models::SlotPlan;
    ///
    /// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    /// let slots = SlotPlan::from_day(t(9, 0), t(16, 0), Duration::minutes(75), Duration::minutes(15));
    /// assert_eq!(slots, vec![t(9, 0), t(10, 30), t(12, 0), t(13, 30), t(15, 0)]);
    /// ```
    pub fn from_day(
        first: NaiveTime,
        last_start: NaiveTime,
        exam: Duration,
        gap: Duration,
    ) -> Vec<NaiveTime> {
        let step = exam + gap;
        if first > last_start {
            return Vec::new();
        }
        if step <= Duration::zero() {
            return vec![first];
        }

        let mut slots = Vec::new();
        let mut current = first;
        loop {
            slots.push(current);
            let (next, wrapped_secs) = current.overflowing_add_signed(step);
            if wrapped_secs != 0 || next > last_start || next <= current {
                break;
            }
            current = next;
        }
        slots
    }
}
