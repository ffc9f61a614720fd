//! Seating plan generation.
//!
//! # Algorithm
//!
//! Students (ascending by student number) are poured into the exam's
//! rooms (ascending by capacity). Inside a room desks are filled row by
//! row, left to right, skipping every `(pitch + 1)`-th column, and never
//! more than the room's capacity. The next room is opened only when
//! students remain. Whoever is left after the last room is unseated.
//!
//! The layout is a pure function of its inputs, so regenerating an exam
//! reproduces the same plan. The store swaps the old plan for the new one
//! in a single replace; within one generator, regenerations of an exam
//! are also serialized.
//!
//! # Reference
//! Kahar & Kendall (2010), "The examination timetabling problem at
//! Universiti Malaysia Pahang", §4: seat allocation with spacing rules

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Classroom, ClassroomId, ExamId, ProgramId, SeatAssignment, StudentId};
use crate::store::RecordStore;

/// Seats taken in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFill {
    pub classroom_id: ClassroomId,
    /// Students placed in the room.
    pub seated: u32,
    /// Declared room capacity.
    pub capacity: u32,
}

impl RoomFill {
    /// Fraction of capacity in use (0.0..=1.0).
    pub fn fill_rate(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            f64::from(self.seated) / f64::from(self.capacity)
        }
    }
}

/// A computed seating plan, before it is stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatLayout {
    /// Planned desks in fill order.
    pub seats: Vec<SeatAssignment>,
    /// Per-room usage, in fill order. Rooms left empty are included.
    pub rooms: Vec<RoomFill>,
    /// Students that found no desk.
    pub unseated: usize,
}

/// Lays `students` out over `rooms` in the given orders.
///
/// # Example
/// ```
/// use u_exam::models::Classroom;
/// use u_exam::scheduler::layout_seats;
///
/// let room = Classroom::new(1, 1, "D-101", 6).with_grid(2, 4, 2);
/// let students: Vec<String> = (1..=5).map(|i| format!("200{i}")).collect();
/// let layout = layout_seats(7, &students, &[room]);
///
/// let desks: Vec<(u32, u32)> = layout.seats.iter().map(|s| (s.row, s.column)).collect();
/// assert_eq!(desks, vec![(1, 1), (1, 2), (1, 4), (2, 1), (2, 2)]);
/// assert_eq!(layout.unseated, 0);
/// ```
pub fn layout_seats(exam_id: ExamId, students: &[StudentId], rooms: &[Classroom]) -> SeatLayout {
    let mut layout = SeatLayout::default();
    let mut remaining = students.iter().peekable();

    for room in rooms {
        let mut seated = 0u32;
        if remaining.peek().is_some() {
            let desks = room.seat_positions().take(room.seat_limit() as usize);
            for ((row, column), student) in desks.zip(remaining.by_ref()) {
                layout
                    .seats
                    .push(SeatAssignment::new(exam_id, room.id, student.clone(), row, column));
                seated += 1;
            }
        }
        layout.rooms.push(RoomFill {
            classroom_id: room.id,
            seated,
            capacity: room.capacity,
        });
    }

    layout.unseated = remaining.count();
    layout
}

/// Outcome of seating one exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatingReport {
    pub exam_id: ExamId,
    /// Seats stored.
    pub placed: usize,
    /// Planned seats the store refused.
    pub rejected: usize,
    /// Students without a desk.
    pub unseated: usize,
    /// Per-room usage of the plan.
    pub rooms: Vec<RoomFill>,
}

impl SeatingReport {
    /// Whether every enrolled student got a stored seat.
    pub fn is_complete(&self) -> bool {
        self.rejected == 0 && self.unseated == 0
    }
}

impl fmt::Display for SeatingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exam {}: {} seated in {} rooms, {} rejected, {} unseated",
            self.exam_id,
            self.placed,
            self.rooms.iter().filter(|r| r.seated > 0).count(),
            self.rejected,
            self.unseated
        )
    }
}

/// Outcome of seating every exam of a program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSeatingReport {
    pub program_id: ProgramId,
    /// One report per seated exam.
    pub exams: Vec<SeatingReport>,
    /// Exams whose seating aborted, with the error.
    pub failed: Vec<(ExamId, String)>,
}

impl ProgramSeatingReport {
    /// Seats stored over all exams.
    pub fn placed(&self) -> usize {
        self.exams.iter().map(|r| r.placed).sum()
    }

    /// Students without a desk over all exams.
    pub fn unseated(&self) -> usize {
        self.exams.iter().map(|r| r.unseated).sum()
    }

    /// Planned seats the store refused over all exams.
    pub fn rejected(&self) -> usize {
        self.exams.iter().map(|r| r.rejected).sum()
    }
}

impl fmt::Display for ProgramSeatingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exams seated, {} failed: {} seated, {} unseated",
            self.exams.len(),
            self.failed.len(),
            self.placed(),
            self.unseated()
        )
    }
}

/// Generates and stores seating plans.
///
/// Safe to share between threads: two regenerations of the same exam run
/// one after the other, different exams run in parallel. Separate
/// generators over one store rely on the store's atomic
/// [`replace_seat_assignments`](RecordStore::replace_seat_assignments).
#[derive(Debug)]
pub struct SeatingGenerator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    locks: Mutex<HashMap<ExamId, Arc<Mutex<()>>>>,
}

impl<'a, S: RecordStore + ?Sized> SeatingGenerator<'a, S> {
    /// Creates a generator over a store.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn exam_lock(&self, exam_id: ExamId) -> Arc<Mutex<()>> {
        // The registry only holds unit mutexes; a poisoned map is still usable.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(exam_id).or_default())
    }

    /// Drops the registry entry of `exam_id` once no caller holds it.
    fn release_lock(&self, exam_id: ExamId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&exam_id);
        }
    }

    /// Number of exams with a live lock entry.
    pub fn active_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Replaces the seating plan of one exam.
    ///
    /// # Errors
    /// `ExamNotFound` if the exam does not exist, or any store failure
    /// while reading inputs or clearing the old plan. Individual seats the
    /// store refuses are counted in [`SeatingReport::rejected`].
    #[instrument(skip(self))]
    pub fn generate_seating(&self, exam_id: ExamId) -> EngineResult<SeatingReport> {
        let lock = self.exam_lock(exam_id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.seat_exam(exam_id)
        };
        self.release_lock(exam_id, lock);
        result
    }

    fn seat_exam(&self, exam_id: ExamId) -> EngineResult<SeatingReport> {
        let exam = self
            .store
            .find_exam(exam_id)?
            .ok_or(EngineError::ExamNotFound(exam_id))?;
        let students = self.store.list_enrolled_students(exam.course_id)?;
        let rooms = self.store.list_exam_rooms(exam_id)?;

        if rooms.is_empty() && !students.is_empty() {
            warn!(students = students.len(), "exam has no room");
        }

        let layout = layout_seats(exam_id, &students, &rooms);
        let replaced = self.store.replace_seat_assignments(exam_id, &layout.seats)?;
        if replaced.removed > 0 {
            debug!(removed = replaced.removed, "previous seating cleared");
        }
        let (placed, rejected) = (replaced.inserted, replaced.rejected);

        if layout.unseated > 0 {
            warn!(unseated = layout.unseated, "rooms cannot hold every student");
        }

        let report = SeatingReport {
            exam_id,
            placed,
            rejected,
            unseated: layout.unseated,
            rooms: layout.rooms,
        };
        info!(placed, rejected, unseated = report.unseated, "seating generated");
        Ok(report)
    }

    /// Seats every exam of a program.
    ///
    /// An exam whose seating fails is recorded in
    /// [`ProgramSeatingReport::failed`]; the other exams still run.
    #[instrument(skip(self))]
    pub fn generate_program_seating(&self, program_id: ProgramId) -> EngineResult<ProgramSeatingReport> {
        if self.store.find_program(program_id)?.is_none() {
            return Err(EngineError::ProgramNotFound(program_id));
        }

        let mut report = ProgramSeatingReport {
            program_id,
            ..Default::default()
        };
        for exam in self.store.list_exams_by_program(program_id)? {
            match self.generate_seating(exam.id) {
                Ok(seating) => report.exams.push(seating),
                Err(e) => {
                    warn!(exam = exam.id, error = %e, "exam seating failed");
                    report.failed.push((exam.id, e.to_string()));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassroomPatch, Course, Enrollment, ExamProgram, Student};
    use crate::store::fault::FaultyStore;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};

    fn ids(n: usize) -> Vec<StudentId> {
        (1..=n).map(|i| format!("{:04}", 2000 + i)).collect()
    }

    fn room(id: ClassroomId, capacity: u32, rows: u32, columns: u32) -> Classroom {
        Classroom::new(id, 1, format!("R{id}"), capacity).with_grid(rows, columns, 2)
    }

    #[test]
    fn test_layout_skips_aisle_column() {
        let layout = layout_seats(1, &ids(6), &[room(1, 6, 2, 4)]);
        assert!(layout.seats.iter().all(|s| s.column != 3));
        assert_eq!(layout.seats.len(), 6);
        assert_eq!(layout.unseated, 0);
    }

    #[test]
    fn test_layout_capacity_caps_grid() {
        // 3 rows × 3 usable columns = 9 desks, capacity 5.
        let layout = layout_seats(1, &ids(8), &[room(1, 5, 3, 4)]);
        assert_eq!(layout.seats.len(), 5);
        assert_eq!(layout.unseated, 3);
        assert_eq!(layout.rooms[0].seated, 5);
    }

    #[test]
    fn test_layout_grid_caps_capacity() {
        // capacity 40 but only 2 × 3 usable desks
        let layout = layout_seats(1, &ids(10), &[room(1, 40, 2, 4)]);
        assert_eq!(layout.seats.len(), 6);
        assert_eq!(layout.unseated, 4);
    }

    #[test]
    fn test_layout_overflows_into_next_room() {
        let rooms = [room(1, 3, 1, 4), room(2, 6, 2, 4)];
        let layout = layout_seats(1, &ids(5), &rooms);
        let per_room: Vec<u32> = layout.rooms.iter().map(|r| r.seated).collect();
        assert_eq!(per_room, vec![3, 2]);
        assert_eq!(layout.seats[3].classroom_id, 2);
        assert_eq!((layout.seats[3].row, layout.seats[3].column), (1, 1));
    }

    #[test]
    fn test_layout_later_rooms_stay_empty() {
        let rooms = [room(1, 6, 2, 4), room(2, 6, 2, 4)];
        let layout = layout_seats(1, &ids(2), &rooms);
        assert_eq!(layout.rooms[1].seated, 0);
        assert!((layout.rooms[0].fill_rate() - 2.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_layout_no_rooms() {
        let layout = layout_seats(1, &ids(4), &[]);
        assert!(layout.seats.is_empty());
        assert_eq!(layout.unseated, 4);
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// One exam of course 10 with `students` enrolled and the given rooms
    /// linked to it.
    fn exam_store(students: usize, rooms: &[Classroom]) -> (MemoryStore, ExamId) {
        let store = MemoryStore::new();
        store
            .add_program(ExamProgram::new(1, 1, "Finals", d(6), d(17)))
            .unwrap();
        store.add_course(Course::new(10, 1, "CS101")).unwrap();
        for id in ids(students) {
            store.add_student(Student::new(id.clone(), 1)).unwrap();
            store.enroll(Enrollment::new(id, 10)).unwrap();
        }
        let exam = store.create_exam(1, 10, d(6), t(9, 0), t(10, 15)).unwrap();
        for r in rooms {
            store.add_classroom(r.clone()).unwrap();
            store.assign_room_to_exam(exam, r.id).unwrap();
        }
        (store, exam)
    }

    #[test]
    fn test_generate_seating_stores_plan() {
        let (store, exam) = exam_store(5, &[room(1, 6, 2, 4)]);
        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 5);
        assert!(report.is_complete());

        let seat = store.find_student_seat(exam, "2005").unwrap().unwrap();
        assert_eq!((seat.row, seat.column), (2, 2));
        assert_eq!(report.to_string(), format!("exam {exam}: 5 seated in 1 rooms, 0 rejected, 0 unseated"));
    }

    #[test]
    fn test_regeneration_is_identical() {
        let (store, exam) = exam_store(9, &[room(1, 6, 2, 4), room(2, 20, 4, 6)]);
        let generator = SeatingGenerator::new(&store);

        generator.generate_seating(exam).unwrap();
        let first = store.list_seat_assignments(exam).unwrap();
        let again = generator.generate_seating(exam).unwrap();
        let second = store.list_seat_assignments(exam).unwrap();

        assert_eq!(again.placed, 9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_students() {
        let (store, exam) = exam_store(0, &[room(1, 6, 2, 4)]);
        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(report.unseated, 0);
    }

    #[test]
    fn test_exam_without_rooms() {
        let (store, exam) = exam_store(3, &[]);
        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(report.unseated, 3);
    }

    #[test]
    fn test_missing_exam() {
        let store = MemoryStore::new();
        let err = SeatingGenerator::new(&store).generate_seating(42).unwrap_err();
        assert!(matches!(err, EngineError::ExamNotFound(42)));
    }

    #[test]
    fn test_program_seating_aggregates() {
        let (store, exam) = exam_store(8, &[room(1, 6, 2, 4)]);
        let report = SeatingGenerator::new(&store)
            .generate_program_seating(1)
            .unwrap();
        assert_eq!(report.exams.len(), 1);
        assert_eq!(report.exams[0].exam_id, exam);
        assert_eq!(report.placed(), 6);
        assert_eq!(report.unseated(), 2);
        assert_eq!(report.to_string(), "1 exams seated, 0 failed: 6 seated, 2 unseated");

        let err = SeatingGenerator::new(&store)
            .generate_program_seating(9)
            .unwrap_err();
        assert!(matches!(err, EngineError::ProgramNotFound(9)));
    }

    #[test]
    fn test_deactivated_room_gets_no_students() {
        let (store, exam) = exam_store(3, &[room(1, 6, 2, 4)]);
        store
            .update_classroom(1, &ClassroomPatch {
                active: Some(false),
                ..Default::default()
            })
            .unwrap();

        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(report.unseated, 3);
        assert!(store.list_room_seats(exam, 1).unwrap().is_empty());
    }

    #[test]
    fn test_unbounded_pitch_seats_every_column() {
        let wide = Classroom::new(1, 1, "W", 8).with_grid(2, 4, u32::MAX);
        let (store, exam) = exam_store(8, &[wide]);
        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 8);
        assert!(store
            .list_seat_assignments(exam)
            .unwrap()
            .iter()
            .any(|s| s.column == 3));
    }

    #[test]
    fn test_huge_grid_capped_by_capacity() {
        let hall = Classroom::new(1, 1, "H", 10).with_grid(100_000, 100_000, 1);
        let (store, exam) = exam_store(12, &[hall]);
        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 10);
        assert_eq!(report.unseated, 2);
    }

    #[test]
    fn test_refused_seats_are_counted() {
        let (inner, exam) = exam_store(3, &[room(1, 6, 2, 4)]);
        let mut store = FaultyStore::new(inner);
        store.extra_enrolled = vec!["9999".to_string()];

        let report = SeatingGenerator::new(&store).generate_seating(exam).unwrap();
        assert_eq!(report.placed, 3);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.unseated, 0);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_separate_generators_do_not_collide() {
        let (store, exam) = exam_store(9, &[room(1, 6, 2, 4), room(2, 20, 4, 6)]);

        let reports: Vec<SeatingReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| SeatingGenerator::new(&store).generate_seating(exam).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for report in &reports {
            assert_eq!((report.placed, report.rejected), (9, 0));
        }
        assert_eq!(store.list_seat_assignments(exam).unwrap().len(), 9);
    }

    #[test]
    fn test_lock_entries_released() {
        let (store, exam) = exam_store(2, &[room(1, 6, 2, 4)]);
        let generator = SeatingGenerator::new(&store);
        generator.generate_seating(exam).unwrap();
        assert!(generator.generate_seating(exam + 1).is_err());
        assert_eq!(generator.active_locks(), 0);
    }

    #[test]
    fn test_concurrent_regeneration() {
        let (store, exam) = exam_store(9, &[room(1, 6, 2, 4), room(2, 20, 4, 6)]);
        let generator = SeatingGenerator::new(&store);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| generator.generate_seating(exam).unwrap());
            }
        });

        let seats = store.list_seat_assignments(exam).unwrap();
        assert_eq!(seats.len(), 9);
    }
}
