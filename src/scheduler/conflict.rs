//! Conflict and room availability checks.
//!
//! Two exams conflict for a student when both are in the same program,
//! the student is enrolled in both courses, and their time ranges overlap
//! on the same date. A room is free when no exam already held in it
//! overlaps the candidate range.
//!
//! Both checks fail safe: when the lookups behind them fail, the answer is
//! the one that prevents a double booking ("conflict", "busy").

use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

use crate::error::StoreResult;
use crate::models::{ClassroomId, CourseId, Exam, ProgramId, StudentId, TimeRange};
use crate::store::RecordStore;

/// Reads needed by [`ConflictDetector`].
pub trait ConflictSource {
    /// Exams of a program.
    fn exams_in_program(&self, program_id: ProgramId) -> StoreResult<Vec<Exam>>;

    /// Whether a student is enrolled in a course.
    fn student_takes(&self, student_id: &str, course_id: CourseId) -> StoreResult<bool>;
}

impl<S: RecordStore + ?Sized> ConflictSource for S {
    fn exams_in_program(&self, program_id: ProgramId) -> StoreResult<Vec<Exam>> {
        self.list_exams_by_program(program_id)
    }

    fn student_takes(&self, student_id: &str, course_id: CourseId) -> StoreResult<bool> {
        self.is_enrolled(student_id, course_id)
    }
}

/// Detects student double-bookings within a program.
#[derive(Debug)]
pub struct ConflictDetector<'a, C: ConflictSource + ?Sized> {
    source: &'a C,
}

impl<'a, C: ConflictSource + ?Sized> ConflictDetector<'a, C> {
    /// Creates a detector over a source.
    pub fn new(source: &'a C) -> Self {
        Self { source }
    }

    /// Whether `student_id` already sits an exam of `program_id` that
    /// overlaps `[start, end)` on `date`.
    ///
    /// Returns `true` if any lookup fails.
    pub fn has_conflict(
        &self,
        program_id: ProgramId,
        student_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> bool {
        match self.find_conflict(program_id, student_id, date, &TimeRange::new(start, end)) {
            Ok(found) => found,
            Err(e) => {
                warn!(program = program_id, student = student_id, error = %e, "conflict lookup failed, assuming conflict");
                true
            }
        }
    }

    /// Number of `students` for whom [`has_conflict`](Self::has_conflict)
    /// holds.
    pub fn count_conflicted(
        &self,
        program_id: ProgramId,
        students: &[StudentId],
        date: NaiveDate,
        range: &TimeRange,
    ) -> usize {
        students
            .iter()
            .filter(|s| self.has_conflict(program_id, s, date, range.start, range.end))
            .count()
    }

    fn find_conflict(
        &self,
        program_id: ProgramId,
        student_id: &str,
        date: NaiveDate,
        range: &TimeRange,
    ) -> StoreResult<bool> {
        for exam in self.source.exams_in_program(program_id)? {
            if !exam.overlaps(date, range) {
                continue;
            }
            if self.source.student_takes(student_id, exam.course_id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Checks whether a room is free for a time range.
#[derive(Debug)]
pub struct RoomAvailability<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> RoomAvailability<'a, S> {
    /// Creates a checker over a store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Whether no exam held in `classroom_id` overlaps `range` on `date`.
    ///
    /// Returns `false` if the lookup fails.
    pub fn is_free(&self, classroom_id: ClassroomId, date: NaiveDate, range: &TimeRange) -> bool {
        match self.store.list_exams_in_room(classroom_id) {
            Ok(exams) => !exams.iter().any(|e| e.overlaps(date, range)),
            Err(e) => {
                warn!(classroom = classroom_id, error = %e, "room lookup failed, assuming busy");
                false
            }
        }
    }
}
