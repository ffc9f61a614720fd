//! Exam (solution) model.
//!
//! An exam is one course's sitting inside a program: a date, a time range
//! and the rooms it is held in. Exams are created by the timetable
//! generator; room links are stored separately so one exam can span
//! several rooms.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{ClassroomId, CourseId, ExamId, ProgramId, TimeRange};

/// A scheduled exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique exam identifier (assigned by the store).
    pub id: ExamId,
    /// Owning program.
    pub program_id: ProgramId,
    /// Examined course.
    pub course_id: CourseId,
    /// Exam date.
    pub date: NaiveDate,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive).
    pub end: NaiveTime,
    /// Active students enrolled in the course when the exam was created.
    pub enrolled_count: u32,
}

/// Link between an exam and one room it is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExamRoomAssignment {
    pub exam_id: ExamId,
    pub classroom_id: ClassroomId,
}

/// Result of linking a room to an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomAssignOutcome {
    /// A new link was stored.
    Assigned,
    /// The link already existed; nothing changed.
    AlreadyAssigned,
}

impl Exam {
    /// Time range occupied by this exam.
    #[inline]
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Whether this exam overlaps `range` on `date`.
    pub fn overlaps(&self, date: NaiveDate, range: &TimeRange) -> bool {
        self.date == date && self.time_range().overlaps(range)
    }
}
