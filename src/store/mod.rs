//! Record store contract.
//!
//! The engine never talks to a database directly. Everything it reads and
//! writes goes through [`RecordStore`], which the surrounding application
//! implements on top of its persistence layer. [`MemoryStore`] is the
//! in-process reference implementation used by tests and small tools.
//!
//! # Soft delete
//! Every list and count operation excludes inactive courses, classrooms
//! and students. `find_*` lookups return the record regardless of its
//! `active` flag so callers can tell "missing" from "deactivated".

#[cfg(test)]
pub(crate) mod fault;
mod memory;

pub use memory::MemoryStore;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{
    Classroom, ClassroomId, Course, CourseId, DepartmentId, Exam, ExamId, ExamProgram, ProgramId,
    RoomAssignOutcome, SeatAssignment, StudentId,
};

/// Counts from [`RecordStore::replace_seat_assignments`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatReplacement {
    /// Seats of the previous plan that were removed.
    pub removed: usize,
    /// Seats of the new plan that were stored.
    pub inserted: usize,
    /// Seats of the new plan that were refused.
    pub rejected: usize,
}

/// Persistence operations the engine depends on.
///
/// Implementations must be usable from a shared reference; writes use
/// interior mutability.
pub trait RecordStore: Send + Sync {
    // ---- programs ----

    /// Looks up an exam program.
    fn find_program(&self, id: ProgramId) -> StoreResult<Option<ExamProgram>>;

    /// Programs of a department, most recent start date first.
    fn list_programs_by_department(&self, department_id: DepartmentId)
        -> StoreResult<Vec<ExamProgram>>;

    // ---- catalog ----

    /// Looks up a course.
    fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>>;

    /// Looks up a classroom.
    fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>>;

    /// Number of active students enrolled in a course.
    fn count_enrolled(&self, course_id: CourseId) -> StoreResult<usize>;

    /// Active students enrolled in a course, ascending by student number.
    fn list_enrolled_students(&self, course_id: CourseId) -> StoreResult<Vec<StudentId>>;

    /// Whether a student is enrolled in a course.
    fn is_enrolled(&self, student_id: &str, course_id: CourseId) -> StoreResult<bool>;

    /// Active classrooms of a department with `capacity >= min_capacity`,
    /// ascending by capacity, ties by classroom id.
    fn list_rooms_by_department(
        &self,
        department_id: DepartmentId,
        min_capacity: u32,
    ) -> StoreResult<Vec<Classroom>>;

    // ---- exams ----

    /// Creates an exam and returns its identifier.
    fn create_exam(
        &self,
        program_id: ProgramId,
        course_id: CourseId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> StoreResult<ExamId>;

    /// Caches the enrolled-student count on an exam.
    fn set_enrolled_count(&self, exam_id: ExamId, count: u32) -> StoreResult<()>;

    /// Looks up an exam.
    fn find_exam(&self, id: ExamId) -> StoreResult<Option<Exam>>;

    /// Exams of a program ordered by date then start time.
    fn list_exams_by_program(&self, program_id: ProgramId) -> StoreResult<Vec<Exam>>;

    /// Exams held (at least partly) in a classroom, ordered by date then start.
    fn list_exams_in_room(&self, classroom_id: ClassroomId) -> StoreResult<Vec<Exam>>;

    // ---- room links ----

    /// Links a room to an exam. Linking twice is not an error.
    fn assign_room_to_exam(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<RoomAssignOutcome>;

    /// Rooms linked to an exam, ascending by capacity, ties by classroom id.
    fn list_exam_rooms(&self, exam_id: ExamId) -> StoreResult<Vec<Classroom>>;

    // ---- seats ----

    /// Removes every seat assignment of an exam. Returns how many were removed.
    fn delete_seat_assignments(&self, exam_id: ExamId) -> StoreResult<usize>;

    /// Inserts seat assignments one by one.
    ///
    /// Records violating a uniqueness, enrollment or grid rule are rejected
    /// individually. Returns `(inserted, rejected)`.
    fn insert_seat_assignments(&self, batch: &[SeatAssignment]) -> StoreResult<(usize, usize)>;

    /// Replaces the seating plan of one exam.
    ///
    /// Seats in `batch` that belong to another exam are refused. The
    /// default runs [`delete_seat_assignments`](Self::delete_seat_assignments)
    /// then [`insert_seat_assignments`](Self::insert_seat_assignments);
    /// stores shared between processes should override it with one
    /// transaction so concurrent replacements cannot interleave.
    fn replace_seat_assignments(
        &self,
        exam_id: ExamId,
        batch: &[SeatAssignment],
    ) -> StoreResult<SeatReplacement> {
        let removed = self.delete_seat_assignments(exam_id)?;
        let (own, foreign): (Vec<SeatAssignment>, Vec<SeatAssignment>) =
            batch.iter().cloned().partition(|s| s.exam_id == exam_id);
        let (inserted, rejected) = if own.is_empty() {
            (0, 0)
        } else {
            self.insert_seat_assignments(&own)?
        };
        Ok(SeatReplacement {
            removed,
            inserted,
            rejected: rejected + foreign.len(),
        })
    }

    /// Seats of an exam ordered by classroom, row, column.
    fn list_seat_assignments(&self, exam_id: ExamId) -> StoreResult<Vec<SeatAssignment>>;

    /// Seats of an exam in one classroom ordered by row, column.
    fn list_room_seats(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<Vec<SeatAssignment>>;

    /// A student's seat for an exam.
    fn find_student_seat(
        &self,
        exam_id: ExamId,
        student_id: &str,
    ) -> StoreResult<Option<SeatAssignment>>;
}
