//! Timetable and seating generators.
//!
//! # Algorithm
//!
//! `TimetableGenerator` walks a program's (date, slot) grid with an
//! explicit cursor, one course per slot, and houses each exam in the
//! smallest room that fits. `SeatingGenerator` then lays each exam's
//! students out over its rooms, row by row, leaving aisle columns empty.
//! Both are greedy and single-pass; neither backtracks.
//!
//! # KPI
//!
//! `ProgramKpi` summarizes a stored program: unassigned exams, room fill
//! rate, seated and unseated students, dates used.
//!
//! # References
//!
//! - Carter & Laporte (1996), "Recent Developments in Practical
//!   Examination Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

mod capacity;
mod conflict;
mod cursor;
mod kpi;
mod seating;
mod timetable;

pub use capacity::{split_rooms, CapacityMatcher, RoomSelection};
pub use conflict::{ConflictDetector, ConflictSource, RoomAvailability};
pub use cursor::{ExamCalendar, SlotCursor};
pub use kpi::ProgramKpi;
pub use seating::{
    layout_seats, ProgramSeatingReport, RoomFill, SeatLayout, SeatingGenerator, SeatingReport,
};
pub use timetable::{CourseFailure, TimetableGenerator, TimetableReport};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Datelike, NaiveDate};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::config::{EngineConfig, RoomPolicy};
    use crate::models::{
        Classroom, Course, CourseId, Enrollment, ExamProgram, Student, DEFAULT_EXCLUDED_WEEKDAYS,
    };
    use crate::store::{MemoryStore, RecordStore};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Two-week program (Mon 2025-01-06 .. Sun 2025-01-19) with six
    /// courses of 12, 18, 24, 30, 36 and 60 students and three rooms.
    fn department() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .add_program(ExamProgram::new(1, 1, "Fall finals", d(2025, 1, 6), d(2025, 1, 19)))
            .unwrap();
        store
            .add_classroom(Classroom::new(1, 1, "A-101", 20).with_grid(4, 8, 2))
            .unwrap();
        store
            .add_classroom(Classroom::new(2, 1, "A-201", 40).with_grid(8, 8, 2))
            .unwrap();
        store
            .add_classroom(Classroom::new(3, 1, "AMFI", 50).with_grid(10, 9, 2))
            .unwrap();

        let mut next = 100_000;
        for (i, size) in [12, 18, 24, 30, 36, 60].into_iter().enumerate() {
            let course_id = 10 + i as CourseId;
            store
                .add_course(Course::new(course_id, 1, format!("CS{course_id}")))
                .unwrap();
            for _ in 0..size {
                next += 1;
                let id = next.to_string();
                store.add_student(Student::new(id.clone(), 1)).unwrap();
                store.enroll(Enrollment::new(id, course_id)).unwrap();
            }
        }
        store
    }

    fn courses() -> Vec<CourseId> {
        (10..16).collect()
    }

    #[test]
    fn test_six_courses_in_calendar_order() {
        let store = department();
        let report = TimetableGenerator::new(&store)
            .generate_timetable(1, &courses())
            .unwrap();

        assert_eq!(report.scheduled, 6);
        let positions: Vec<_> = report.exams.iter().map(|e| (e.date, e.start)).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert_eq!(positions.iter().collect::<HashSet<_>>().len(), 6);
        // four slots a day: the fifth exam opens the second day
        assert_eq!(report.exams[4].date, d(2025, 1, 7));
        assert_eq!(
            report.exams.iter().map(|e| e.course_id).collect::<Vec<_>>(),
            courses()
        );
        // the 60-student course fits no single room
        assert_eq!(report.unassigned, 1);
    }

    #[test]
    fn test_dates_stay_in_range_and_off_weekends() {
        let store = department();
        // 40 courses need 10 exam days, the whole two-week program.
        let ids: Vec<CourseId> = (100..140).collect();
        for &id in &ids {
            store.add_course(Course::new(id, 1, format!("X{id}"))).unwrap();
        }
        let report = TimetableGenerator::new(&store)
            .generate_timetable(1, &ids)
            .unwrap();

        assert_eq!(report.scheduled, 40);
        for exam in &report.exams {
            assert!(exam.date >= d(2025, 1, 6) && exam.date <= d(2025, 1, 19));
            assert!(!DEFAULT_EXCLUDED_WEEKDAYS.contains(&exam.date.weekday()));
        }

        // one more course has nowhere to go
        store.add_course(Course::new(999, 1, "LATE")).unwrap();
        let mut more = ids.clone();
        more.push(999);
        let report = TimetableGenerator::new(&store)
            .generate_timetable(1, &more)
            .unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0], (999, CourseFailure::NoSlotLeft));
    }

    #[test]
    fn test_assigned_room_holds_headcount() {
        let store = department();
        let mut rng = StdRng::seed_from_u64(7);
        let mut order = courses();
        order.shuffle(&mut rng);

        let report = TimetableGenerator::new(&store)
            .generate_timetable(1, &order)
            .unwrap();
        for exam in &report.exams {
            let rooms = store.list_exam_rooms(exam.id).unwrap();
            let fits: Vec<u32> = store
                .list_rooms_by_department(1, exam.enrolled_count)
                .unwrap()
                .iter()
                .map(|r| r.id)
                .collect();
            match fits.first() {
                Some(&smallest) => {
                    assert_eq!(rooms.len(), 1);
                    assert_eq!(rooms[0].id, smallest);
                    assert!(rooms[0].capacity >= exam.enrolled_count);
                }
                None => assert!(rooms.is_empty()),
            }
        }
    }

    #[test]
    fn test_full_pipeline_with_split_rooms() {
        let store = department();
        let config = EngineConfig::default().with_room_policy(RoomPolicy::SplitAcrossRooms);
        let timetable = TimetableGenerator::new(&store)
            .with_config(config)
            .generate_timetable(1, &courses())
            .unwrap();
        assert_eq!(timetable.unassigned, 0);

        let seating = SeatingGenerator::new(&store)
            .generate_program_seating(1)
            .unwrap();
        assert!(seating.failed.is_empty());
        assert_eq!(seating.rejected(), 0);
        assert_eq!(seating.placed(), 12 + 18 + 24 + 30 + 36 + 60);
        assert_eq!(seating.unseated(), 0);

        let kpi = ProgramKpi::from_store(&store, 1).unwrap();
        assert_eq!(kpi.exam_count, 6);
        assert_eq!(kpi.unassigned_exams, 0);
        assert_eq!(kpi.total_unseated, 0);
        assert_eq!(kpi.dates_used, 2);
    }

    #[test]
    fn test_seats_unique_and_off_aisles() {
        let store = department();
        let report = TimetableGenerator::new(&store)
            .with_config(EngineConfig::default().with_room_policy(RoomPolicy::SplitAcrossRooms))
            .generate_timetable(1, &courses())
            .unwrap();
        let generator = SeatingGenerator::new(&store);

        for exam in &report.exams {
            generator.generate_seating(exam.id).unwrap();
            let seats = store.list_seat_assignments(exam.id).unwrap();
            let desks: HashSet<_> = seats.iter().map(|s| s.desk()).collect();
            let students: HashSet<_> = seats.iter().map(|s| &s.student_id).collect();
            assert_eq!(desks.len(), seats.len());
            assert_eq!(students.len(), seats.len());
            for seat in &seats {
                let room = store.find_classroom(seat.classroom_id).unwrap().unwrap();
                assert_ne!(seat.column % (room.seat_pitch + 1), 0);
            }
        }
    }

    #[test]
    fn test_layout_ignores_enrollment_insert_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut students: Vec<String> = (0..30).map(|i| format!("{}", 3000 + i)).collect();
        let mut ordered = students.clone();
        ordered.sort();

        let rooms = [
            Classroom::new(1, 1, "S", 12).with_grid(4, 6, 2),
            Classroom::new(2, 1, "L", 30).with_grid(6, 9, 2),
        ];
        let expected = layout_seats(1, &ordered, &rooms);

        for _ in 0..5 {
            students.shuffle(&mut rng);
            let store = MemoryStore::new();
            store
                .add_program(ExamProgram::new(1, 1, "P", d(2025, 1, 6), d(2025, 1, 10)))
                .unwrap();
            store.add_course(Course::new(10, 1, "C")).unwrap();
            for s in &students {
                store.add_student(Student::new(s.clone(), 1)).unwrap();
                store.enroll(Enrollment::new(s.clone(), 10)).unwrap();
            }
            let start = chrono::NaiveTime::from_hms_opt(9, rng.random_range(0..30), 0).unwrap();
            let end = chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap();
            let exam = store.create_exam(1, 10, d(2025, 1, 6), start, end).unwrap();
            for room in &rooms {
                store.add_classroom(room.clone()).unwrap();
                store.assign_room_to_exam(exam, room.id).unwrap();
            }

            SeatingGenerator::new(&store).generate_seating(exam).unwrap();
            let stored: Vec<(u32, u32, u32, String)> = store
                .list_seat_assignments(exam)
                .unwrap()
                .into_iter()
                .map(|s| (s.classroom_id, s.row, s.column, s.student_id))
                .collect();
            let mut planned: Vec<(u32, u32, u32, String)> = expected
                .seats
                .iter()
                .map(|s| (s.classroom_id, s.row, s.column, s.student_id.clone()))
                .collect();
            planned.sort();
            assert_eq!(stored, planned);
        }
    }

    #[test]
    fn test_too_many_students_leaves_shortfall() {
        let store = department();
        // only the 60-student course, housed in the 50-seat hall by hand
        let timetable = TimetableGenerator::new(&store)
            .generate_timetable(1, &[15])
            .unwrap();
        let exam = &timetable.exams[0];
        store.assign_room_to_exam(exam.id, 3).unwrap();

        let report = SeatingGenerator::new(&store).generate_seating(exam.id).unwrap();
        // 10 rows × 6 usable columns = 60 desks, capped at 50 seats
        assert_eq!(report.placed, 50);
        assert_eq!(report.unseated, 10);
        assert!(!report.is_complete());
    }
}
