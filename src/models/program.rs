//! Exam program model.
//!
//! A program is one exam campaign of a department (e.g., the fall finals):
//! a date range plus the default exam length and the rest period kept
//! between consecutive exams. A program owns its exams; deleting it
//! deletes them as well.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{DepartmentId, ProgramId, SlotPlan};

/// Default exam length (minutes).
pub const DEFAULT_EXAM_MINUTES: u32 = 75;

/// Default rest period between exams (minutes).
pub const DEFAULT_GAP_MINUTES: u32 = 15;

/// An exam campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamProgram {
    /// Unique program identifier.
    pub id: ProgramId,
    /// Department whose courses and rooms are scheduled.
    pub department_id: DepartmentId,
    /// Display name (e.g., "2025 Fall Finals").
    pub name: String,
    /// Kind of exam.
    pub exam_type: ExamType,
    /// First eligible date (inclusive).
    pub start_date: NaiveDate,
    /// Last eligible date (inclusive).
    pub end_date: NaiveDate,
    /// Length of every exam (minutes).
    pub exam_minutes: u32,
    /// Rest period between exams (minutes).
    pub gap_minutes: u32,
}

/// Exam classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    Midterm,
    #[default]
    Final,
    Makeup,
    Quiz,
}

/// Fields of an [`ExamProgram`] that may change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub exam_type: Option<ExamType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub exam_minutes: Option<u32>,
    pub gap_minutes: Option<u32>,
}

impl ExamProgram {
    /// Creates a program with default exam length and gap.
    pub fn new(
        id: ProgramId,
        department_id: DepartmentId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            department_id,
            name: name.into(),
            exam_type: ExamType::Final,
            start_date,
            end_date,
            exam_minutes: DEFAULT_EXAM_MINUTES,
            gap_minutes: DEFAULT_GAP_MINUTES,
        }
    }

    /// Sets the exam type.
    pub fn with_type(mut self, exam_type: ExamType) -> Self {
        self.exam_type = exam_type;
        self
    }

    /// Sets the exam length (minutes).
    pub fn with_exam_minutes(mut self, minutes: u32) -> Self {
        self.exam_minutes = minutes;
        self
    }

    /// Sets the rest period between exams (minutes).
    pub fn with_gap_minutes(mut self, minutes: u32) -> Self {
        self.gap_minutes = minutes;
        self
    }

    /// Exam length as a duration.
    pub fn exam_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.exam_minutes))
    }

    /// Rest period as a duration.
    pub fn gap(&self) -> Duration {
        Duration::minutes(i64::from(self.gap_minutes))
    }

    /// Daily slots spaced by this program's exam length plus gap, from
    /// `first` up to `last_start`.
    pub fn derived_slots(&self, first: NaiveTime, last_start: NaiveTime) -> Vec<NaiveTime> {
        SlotPlan::from_day(first, last_start, self.exam_duration(), self.gap())
    }

    /// Whether `date` lies within `[start_date, end_date]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &ProgramPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(exam_type) = patch.exam_type {
            self.exam_type = exam_type;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(minutes) = patch.exam_minutes {
            self.exam_minutes = minutes;
        }
        if let Some(minutes) = patch.gap_minutes {
            self.gap_minutes = minutes;
        }
    }
}
