//! Store wrapper with injectable faults, for tests.

use chrono::{NaiveDate, NaiveTime};

use super::{MemoryStore, RecordStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Classroom, ClassroomId, Course, CourseId, DepartmentId, Exam, ExamId, ExamProgram, ProgramId,
    RoomAssignOutcome, SeatAssignment, StudentId,
};

/// Delegates to a [`MemoryStore`], except where a fault is switched on.
///
/// Uses the trait's default `replace_seat_assignments`.
#[derive(Debug, Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    /// `list_enrolled_students` fails.
    pub fail_enrolled_list: bool,
    /// Appended to every `list_enrolled_students` result.
    pub extra_enrolled: Vec<StudentId>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }
}

impl RecordStore for FaultyStore {
    fn find_program(&self, id: ProgramId) -> StoreResult<Option<ExamProgram>> {
        self.inner.find_program(id)
    }

    fn list_programs_by_department(
        &self,
        department_id: DepartmentId,
    ) -> StoreResult<Vec<ExamProgram>> {
        self.inner.list_programs_by_department(department_id)
    }

    fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        self.inner.find_course(id)
    }

    fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>> {
        self.inner.find_classroom(id)
    }

    fn count_enrolled(&self, course_id: CourseId) -> StoreResult<usize> {
        self.inner.count_enrolled(course_id)
    }

    fn list_enrolled_students(&self, course_id: CourseId) -> StoreResult<Vec<StudentId>> {
        if self.fail_enrolled_list {
            return Err(StoreError::Poisoned);
        }
        let mut students = self.inner.list_enrolled_students(course_id)?;
        students.extend(self.extra_enrolled.iter().cloned());
        Ok(students)
    }

    fn is_enrolled(&self, student_id: &str, course_id: CourseId) -> StoreResult<bool> {
        self.inner.is_enrolled(student_id, course_id)
    }

    fn list_rooms_by_department(
        &self,
        department_id: DepartmentId,
        min_capacity: u32,
    ) -> StoreResult<Vec<Classroom>> {
        self.inner.list_rooms_by_department(department_id, min_capacity)
    }

    fn create_exam(
        &self,
        program_id: ProgramId,
        course_id: CourseId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> StoreResult<ExamId> {
        self.inner.create_exam(program_id, course_id, date, start, end)
    }

    fn set_enrolled_count(&self, exam_id: ExamId, count: u32) -> StoreResult<()> {
        self.inner.set_enrolled_count(exam_id, count)
    }

    fn find_exam(&self, id: ExamId) -> StoreResult<Option<Exam>> {
        self.inner.find_exam(id)
    }

    fn list_exams_by_program(&self, program_id: ProgramId) -> StoreResult<Vec<Exam>> {
        self.inner.list_exams_by_program(program_id)
    }

    fn list_exams_in_room(&self, classroom_id: ClassroomId) -> StoreResult<Vec<Exam>> {
        self.inner.list_exams_in_room(classroom_id)
    }

    fn assign_room_to_exam(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<RoomAssignOutcome> {
        self.inner.assign_room_to_exam(exam_id, classroom_id)
    }

    fn list_exam_rooms(&self, exam_id: ExamId) -> StoreResult<Vec<Classroom>> {
        self.inner.list_exam_rooms(exam_id)
    }

    fn delete_seat_assignments(&self, exam_id: ExamId) -> StoreResult<usize> {
        self.inner.delete_seat_assignments(exam_id)
    }

    fn insert_seat_assignments(&self, batch: &[SeatAssignment]) -> StoreResult<(usize, usize)> {
        self.inner.insert_seat_assignments(batch)
    }

    fn list_seat_assignments(&self, exam_id: ExamId) -> StoreResult<Vec<SeatAssignment>> {
        self.inner.list_seat_assignments(exam_id)
    }

    fn list_room_seats(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<Vec<SeatAssignment>> {
        self.inner.list_room_seats(exam_id, classroom_id)
    }

    fn find_student_seat(
        &self,
        exam_id: ExamId,
        student_id: &str,
    ) -> StoreResult<Option<SeatAssignment>> {
        self.inner.find_student_seat(exam_id, student_id)
    }
}
