//! Date/slot cursor.
//!
//! An [`ExamCalendar`] fixes the eligible dates and daily slots of a
//! program; a [`SlotCursor`] walks them one slot at a time, wrapping to
//! the next date when the day's slots are used up.

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};

use crate::error::{EngineError, EngineResult};
use crate::models::{EligibleDates, ExamProgram, TimeRange};

/// Eligible dates and daily slots of one program.
#[derive(Debug, Clone)]
pub struct ExamCalendar {
    dates: Vec<NaiveDate>,
    slots: Vec<NaiveTime>,
    exam_length: Duration,
}

impl ExamCalendar {
    /// Builds the calendar of `program`.
    ///
    /// # Errors
    /// - `NoTimeSlots` if `slots` is empty
    /// - `NoEligibleDates` if every date of the range is excluded
    /// - `InvalidProgram` if an exam starting in some slot would run past
    ///   midnight
    pub fn new(
        program: &ExamProgram,
        excluded: &[Weekday],
        slots: &[NaiveTime],
    ) -> EngineResult<Self> {
        if slots.is_empty() {
            return Err(EngineError::NoTimeSlots);
        }

        let exam_length = program.exam_duration();
        if let Some(slot) = slots
            .iter()
            .find(|s| TimeRange::starting_at(**s, exam_length).is_none())
        {
            return Err(EngineError::InvalidProgram(format!(
                "a {}-minute exam starting at {slot} does not end the same day",
                program.exam_minutes
            )));
        }

        let dates: Vec<NaiveDate> =
            EligibleDates::new(program.start_date, program.end_date, excluded).collect();
        if dates.is_empty() {
            return Err(EngineError::NoEligibleDates {
                start: program.start_date,
                end: program.end_date,
            });
        }

        Ok(Self {
            dates,
            slots: slots.to_vec(),
            exam_length,
        })
    }

    /// Eligible dates in calendar order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Daily slots in scheduling order.
    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    /// Total number of (date, slot) positions.
    pub fn capacity(&self) -> usize {
        self.dates.len() * self.slots.len()
    }

    /// Date and time range at a cursor position, or `None` once exhausted.
    pub fn at(&self, cursor: SlotCursor) -> Option<(NaiveDate, TimeRange)> {
        let date = *self.dates.get(cursor.date_index)?;
        let start = *self.slots.get(cursor.slot_index)?;
        let range = TimeRange::starting_at(start, self.exam_length)?;
        Some((date, range))
    }

    /// Position after `cursor`.
    pub fn advance(&self, cursor: SlotCursor) -> SlotCursor {
        if cursor.slot_index + 1 < self.slots.len() {
            SlotCursor {
                slot_index: cursor.slot_index + 1,
                ..cursor
            }
        } else {
            SlotCursor {
                date_index: cursor.date_index + 1,
                slot_index: 0,
            }
        }
    }
}

/// Position in an [`ExamCalendar`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotCursor {
    pub date_index: usize,
    pub slot_index: usize,
}
