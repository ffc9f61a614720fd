//! In-process record store.
//!
//! Keeps every table in ordered maps behind one `RwLock`, so iteration
//! order is deterministic and the store can be shared across threads.
//! Catalog maintenance (adding courses, rooms, students, programs and
//! applying patches) lives here as inherent methods; the engine itself
//! only uses the [`RecordStore`] surface.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use super::{RecordStore, SeatReplacement};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Classroom, ClassroomId, ClassroomPatch, Course, CourseId, CoursePatch, DepartmentId,
    Enrollment, Exam, ExamId, ExamProgram, ProgramId, ProgramPatch, RoomAssignOutcome,
    SeatAssignment, Student, StudentId, StudentPatch,
};
use crate::validation::{describe, validate_classroom, validate_program};

#[derive(Debug, Default)]
struct Tables {
    programs: BTreeMap<ProgramId, ExamProgram>,
    courses: BTreeMap<CourseId, Course>,
    classrooms: BTreeMap<ClassroomId, Classroom>,
    students: BTreeMap<StudentId, Student>,
    /// (course, student) so a course's students form one ordered range.
    enrollments: BTreeSet<(CourseId, StudentId)>,
    exams: BTreeMap<ExamId, Exam>,
    exam_rooms: BTreeSet<(ExamId, ClassroomId)>,
    seats: BTreeMap<ExamId, Vec<SeatAssignment>>,
    next_exam_id: ExamId,
}

impl Tables {
    fn enrolled<'a>(&'a self, course_id: CourseId) -> impl Iterator<Item = &'a Student> + 'a {
        self.enrollments
            .range((course_id, String::new())..)
            .take_while(move |(c, _)| *c == course_id)
            .filter_map(move |(_, s)| self.students.get(s))
            .filter(|s| s.active)
    }

    fn rooms_of_exam(&self, exam_id: ExamId) -> Vec<Classroom> {
        let mut rooms: Vec<Classroom> = self
            .exam_rooms
            .range((exam_id, ClassroomId::MIN)..=(exam_id, ClassroomId::MAX))
            .filter_map(|(_, r)| self.classrooms.get(r))
            .filter(|r| r.active)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.capacity, r.id));
        rooms
    }

    /// Why a seat cannot be stored, if it cannot.
    fn seat_rejection(&self, seat: &SeatAssignment, taken: &Taken) -> Option<String> {
        let Some(exam) = self.exams.get(&seat.exam_id) else {
            return Some(format!("exam {} does not exist", seat.exam_id));
        };
        if !self.exam_rooms.contains(&(seat.exam_id, seat.classroom_id)) {
            return Some(format!(
                "classroom {} is not assigned to exam {}",
                seat.classroom_id, seat.exam_id
            ));
        }
        let Some(room) = self.classrooms.get(&seat.classroom_id) else {
            return Some(format!("classroom {} does not exist", seat.classroom_id));
        };
        if !room.active {
            return Some(format!("classroom {} is inactive", room.code));
        }
        if seat.row == 0 || seat.row > room.rows || seat.column == 0 || seat.column > room.columns
        {
            return Some(format!(
                "desk ({}, {}) is outside classroom {}",
                seat.row, seat.column, room.code
            ));
        }
        if room.is_aisle(seat.column) {
            return Some(format!(
                "column {} is an aisle in classroom {}",
                seat.column, room.code
            ));
        }
        if !self
            .enrollments
            .contains(&(exam.course_id, seat.student_id.clone()))
        {
            return Some(format!(
                "student {} is not enrolled in course {}",
                seat.student_id, exam.course_id
            ));
        }
        if !self
            .students
            .get(&seat.student_id)
            .is_some_and(|s| s.active)
        {
            return Some(format!("student {} is inactive", seat.student_id));
        }
        if taken.desks.contains(&(seat.exam_id, seat.desk())) {
            return Some(format!(
                "desk ({}, {}) in classroom {} is already taken",
                seat.row, seat.column, room.code
            ));
        }
        if taken
            .students
            .contains(&(seat.exam_id, seat.student_id.clone()))
        {
            return Some(format!(
                "student {} already has a seat in exam {}",
                seat.student_id, seat.exam_id
            ));
        }
        None
    }

    /// Stores the valid seats of `batch`. Returns `(inserted, rejected)`.
    fn insert_seats(&mut self, batch: &[SeatAssignment]) -> (usize, usize) {
        let mut taken = Taken::default();
        for seat in self.seats.values().flatten() {
            taken.desks.insert((seat.exam_id, seat.desk()));
            taken.students.insert((seat.exam_id, seat.student_id.clone()));
        }

        let mut inserted = 0;
        let mut rejected = 0;
        for seat in batch {
            if let Some(reason) = self.seat_rejection(seat, &taken) {
                warn!(exam = seat.exam_id, student = %seat.student_id, %reason, "seat rejected");
                rejected += 1;
                continue;
            }
            taken.desks.insert((seat.exam_id, seat.desk()));
            taken.students.insert((seat.exam_id, seat.student_id.clone()));
            self.seats.entry(seat.exam_id).or_default().push(seat.clone());
            inserted += 1;
        }
        (inserted, rejected)
    }
}

/// Occupied keys for uniqueness checks during one insert batch.
#[derive(Default)]
struct Taken {
    desks: HashSet<(ExamId, (ClassroomId, u32, u32))>,
    students: HashSet<(ExamId, StudentId)>,
}

/// Thread-safe in-memory record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }

    // ---- catalog ----

    /// Adds a course. Codes are unique per department.
    pub fn add_course(&self, course: Course) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.courses.contains_key(&course.id) {
            return Err(StoreError::Duplicate(format!("course {}", course.id)));
        }
        if t
            .courses
            .values()
            .any(|c| c.department_id == course.department_id && c.code == course.code)
        {
            return Err(StoreError::Duplicate(format!("course code {}", course.code)));
        }
        debug!(course = course.id, code = %course.code, "course stored");
        t.courses.insert(course.id, course);
        Ok(())
    }

    /// Applies a patch to a course.
    pub fn update_course(&self, id: CourseId, patch: &CoursePatch) -> StoreResult<Course> {
        let mut t = self.write()?;
        let mut patched = t
            .courses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("course {id}")))?;
        patched.apply(patch);
        if t.courses.values().any(|c| {
            c.id != id && c.department_id == patched.department_id && c.code == patched.code
        }) {
            return Err(StoreError::Duplicate(format!("course code {}", patched.code)));
        }
        t.courses.insert(id, patched.clone());
        Ok(patched)
    }

    /// Adds a classroom after checking its geometry. Codes are unique per
    /// department.
    pub fn add_classroom(&self, room: Classroom) -> StoreResult<()> {
        validate_classroom(&room).map_err(|e| StoreError::Invalid(describe(&e)))?;
        let mut t = self.write()?;
        if t.classrooms.contains_key(&room.id) {
            return Err(StoreError::Duplicate(format!("classroom {}", room.id)));
        }
        if t
            .classrooms
            .values()
            .any(|r| r.department_id == room.department_id && r.code == room.code)
        {
            return Err(StoreError::Duplicate(format!("classroom code {}", room.code)));
        }
        debug!(classroom = room.id, code = %room.code, capacity = room.capacity, "classroom stored");
        t.classrooms.insert(room.id, room);
        Ok(())
    }

    /// Applies a patch to a classroom. The patched room must still be valid.
    pub fn update_classroom(
        &self,
        id: ClassroomId,
        patch: &ClassroomPatch,
    ) -> StoreResult<Classroom> {
        let mut t = self.write()?;
        let mut patched = t
            .classrooms
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("classroom {id}")))?;
        patched.apply(patch);
        validate_classroom(&patched).map_err(|e| StoreError::Invalid(describe(&e)))?;
        if t.classrooms.values().any(|r| {
            r.id != id && r.department_id == patched.department_id && r.code == patched.code
        }) {
            return Err(StoreError::Duplicate(format!("classroom code {}", patched.code)));
        }
        t.classrooms.insert(id, patched.clone());
        Ok(patched)
    }

    /// Adds a student.
    pub fn add_student(&self, student: Student) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.students.contains_key(&student.id) {
            return Err(StoreError::Duplicate(format!("student {}", student.id)));
        }
        t.students.insert(student.id.clone(), student);
        Ok(())
    }

    /// Applies a patch to a student.
    pub fn update_student(&self, id: &str, patch: &StudentPatch) -> StoreResult<Student> {
        let mut t = self.write()?;
        let student = t
            .students
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("student {id}")))?;
        student.apply(patch);
        Ok(student.clone())
    }

    /// Enrolls a student in a course. Returns `false` if already enrolled.
    pub fn enroll(&self, enrollment: Enrollment) -> StoreResult<bool> {
        let mut t = self.write()?;
        if !t.students.contains_key(&enrollment.student_id) {
            return Err(StoreError::NotFound(format!(
                "student {}",
                enrollment.student_id
            )));
        }
        if !t.courses.contains_key(&enrollment.course_id) {
            return Err(StoreError::NotFound(format!(
                "course {}",
                enrollment.course_id
            )));
        }
        Ok(t
            .enrollments
            .insert((enrollment.course_id, enrollment.student_id)))
    }

    // ---- programs ----

    /// Adds an exam program after checking its date range and exam length.
    pub fn add_program(&self, program: ExamProgram) -> StoreResult<()> {
        validate_program(&program).map_err(|e| StoreError::Invalid(describe(&e)))?;
        let mut t = self.write()?;
        if t.programs.contains_key(&program.id) {
            return Err(StoreError::Duplicate(format!("program {}", program.id)));
        }
        info!(program = program.id, name = %program.name, "exam program created");
        t.programs.insert(program.id, program);
        Ok(())
    }

    /// Applies a patch to a program. The patched program must still be valid.
    pub fn update_program(&self, id: ProgramId, patch: &ProgramPatch) -> StoreResult<ExamProgram> {
        let mut t = self.write()?;
        let program = t
            .programs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("program {id}")))?;
        let mut patched = program.clone();
        patched.apply(patch);
        validate_program(&patched).map_err(|e| StoreError::Invalid(describe(&e)))?;
        *program = patched.clone();
        Ok(patched)
    }

    /// Deletes a program together with its exams, room links and seats.
    ///
    /// Returns `false` if the program did not exist.
    pub fn delete_program(&self, id: ProgramId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.programs.remove(&id).is_none() {
            return Ok(false);
        }
        let exam_ids: Vec<ExamId> = t
            .exams
            .values()
            .filter(|e| e.program_id == id)
            .map(|e| e.id)
            .collect();
        for exam_id in &exam_ids {
            t.exams.remove(exam_id);
            t.seats.remove(exam_id);
        }
        t.exam_rooms.retain(|(e, _)| !exam_ids.contains(e));
        info!(program = id, exams = exam_ids.len(), "exam program deleted");
        Ok(true)
    }
}

impl RecordStore for MemoryStore {
    fn find_program(&self, id: ProgramId) -> StoreResult<Option<ExamProgram>> {
        Ok(self.read()?.programs.get(&id).cloned())
    }

    fn list_programs_by_department(
        &self,
        department_id: DepartmentId,
    ) -> StoreResult<Vec<ExamProgram>> {
        let t = self.read()?;
        let mut programs: Vec<ExamProgram> = t
            .programs
            .values()
            .filter(|p| p.department_id == department_id)
            .cloned()
            .collect();
        programs.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(programs)
    }

    fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        Ok(self.read()?.courses.get(&id).cloned())
    }

    fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>> {
        Ok(self.read()?.classrooms.get(&id).cloned())
    }

    fn count_enrolled(&self, course_id: CourseId) -> StoreResult<usize> {
        Ok(self.read()?.enrolled(course_id).count())
    }

    fn list_enrolled_students(&self, course_id: CourseId) -> StoreResult<Vec<StudentId>> {
        Ok(self
            .read()?
            .enrolled(course_id)
            .map(|s| s.id.clone())
            .collect())
    }

    fn is_enrolled(&self, student_id: &str, course_id: CourseId) -> StoreResult<bool> {
        Ok(self
            .read()?
            .enrollments
            .contains(&(course_id, student_id.to_string())))
    }

    fn list_rooms_by_department(
        &self,
        department_id: DepartmentId,
        min_capacity: u32,
    ) -> StoreResult<Vec<Classroom>> {
        let t = self.read()?;
        let mut rooms: Vec<Classroom> = t
            .classrooms
            .values()
            .filter(|r| r.active && r.department_id == department_id)
            .filter(|r| r.capacity >= min_capacity)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.capacity, r.id));
        Ok(rooms)
    }

    fn create_exam(
        &self,
        program_id: ProgramId,
        course_id: CourseId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> StoreResult<ExamId> {
        let mut t = self.write()?;
        let program = t
            .programs
            .get(&program_id)
            .ok_or_else(|| StoreError::NotFound(format!("program {program_id}")))?;
        if !program.contains(date) {
            return Err(StoreError::Invalid(format!(
                "date {date} is outside program {program_id}"
            )));
        }
        if end <= start {
            return Err(StoreError::Invalid(format!(
                "exam ends at {end} before it starts at {start}"
            )));
        }
        if !t.courses.contains_key(&course_id) {
            return Err(StoreError::NotFound(format!("course {course_id}")));
        }

        t.next_exam_id += 1;
        let id = t.next_exam_id;
        t.exams.insert(
            id,
            Exam {
                id,
                program_id,
                course_id,
                date,
                start,
                end,
                enrolled_count: 0,
            },
        );
        debug!(exam = id, program = program_id, course = course_id, %date, %start, "exam stored");
        Ok(id)
    }

    fn set_enrolled_count(&self, exam_id: ExamId, count: u32) -> StoreResult<()> {
        let mut t = self.write()?;
        let exam = t
            .exams
            .get_mut(&exam_id)
            .ok_or_else(|| StoreError::NotFound(format!("exam {exam_id}")))?;
        exam.enrolled_count = count;
        Ok(())
    }

    fn find_exam(&self, id: ExamId) -> StoreResult<Option<Exam>> {
        Ok(self.read()?.exams.get(&id).cloned())
    }

    fn list_exams_by_program(&self, program_id: ProgramId) -> StoreResult<Vec<Exam>> {
        let t = self.read()?;
        let mut exams: Vec<Exam> = t
            .exams
            .values()
            .filter(|e| e.program_id == program_id)
            .cloned()
            .collect();
        exams.sort_by_key(|e| (e.date, e.start, e.id));
        Ok(exams)
    }

    fn list_exams_in_room(&self, classroom_id: ClassroomId) -> StoreResult<Vec<Exam>> {
        let t = self.read()?;
        let mut exams: Vec<Exam> = t
            .exam_rooms
            .iter()
            .filter(|(_, r)| *r == classroom_id)
            .filter_map(|(e, _)| t.exams.get(e).cloned())
            .collect();
        exams.sort_by_key(|e| (e.date, e.start, e.id));
        Ok(exams)
    }

    fn assign_room_to_exam(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<RoomAssignOutcome> {
        let mut t = self.write()?;
        if !t.exams.contains_key(&exam_id) {
            return Err(StoreError::NotFound(format!("exam {exam_id}")));
        }
        if !t.classrooms.contains_key(&classroom_id) {
            return Err(StoreError::NotFound(format!("classroom {classroom_id}")));
        }
        if t.exam_rooms.insert((exam_id, classroom_id)) {
            Ok(RoomAssignOutcome::Assigned)
        } else {
            Ok(RoomAssignOutcome::AlreadyAssigned)
        }
    }

    fn list_exam_rooms(&self, exam_id: ExamId) -> StoreResult<Vec<Classroom>> {
        Ok(self.read()?.rooms_of_exam(exam_id))
    }

    fn delete_seat_assignments(&self, exam_id: ExamId) -> StoreResult<usize> {
        let removed = self
            .write()?
            .seats
            .remove(&exam_id)
            .map_or(0, |seats| seats.len());
        debug!(exam = exam_id, removed, "seat assignments deleted");
        Ok(removed)
    }

    fn insert_seat_assignments(&self, batch: &[SeatAssignment]) -> StoreResult<(usize, usize)> {
        Ok(self.write()?.insert_seats(batch))
    }

    fn replace_seat_assignments(
        &self,
        exam_id: ExamId,
        batch: &[SeatAssignment],
    ) -> StoreResult<SeatReplacement> {
        let mut t = self.write()?;
        let removed = t.seats.remove(&exam_id).map_or(0, |seats| seats.len());
        let foreign = batch.iter().filter(|s| s.exam_id != exam_id).count();
        let own: Vec<SeatAssignment> = batch
            .iter()
            .filter(|s| s.exam_id == exam_id)
            .cloned()
            .collect();
        let (inserted, rejected) = t.insert_seats(&own);
        if foreign > 0 {
            warn!(exam = exam_id, foreign, "seats of other exams ignored");
        }
        debug!(exam = exam_id, removed, inserted, "seat assignments replaced");
        Ok(SeatReplacement {
            removed,
            inserted,
            rejected: rejected + foreign,
        })
    }

    fn list_seat_assignments(&self, exam_id: ExamId) -> StoreResult<Vec<SeatAssignment>> {
        let t = self.read()?;
        let mut seats = t.seats.get(&exam_id).cloned().unwrap_or_default();
        seats.sort_by_key(|s| s.desk());
        Ok(seats)
    }

    fn list_room_seats(
        &self,
        exam_id: ExamId,
        classroom_id: ClassroomId,
    ) -> StoreResult<Vec<SeatAssignment>> {
        let mut seats = self.list_seat_assignments(exam_id)?;
        seats.retain(|s| s.classroom_id == classroom_id);
        Ok(seats)
    }

    fn find_student_seat(
        &self,
        exam_id: ExamId,
        student_id: &str,
    ) -> StoreResult<Option<SeatAssignment>> {
        let t = self.read()?;
        Ok(t.seats
            .get(&exam_id)
            .and_then(|seats| seats.iter().find(|s| s.student_id == student_id))
            .cloned())
    }
}
