//! Exam timetabling and seating engine for the U-Engine ecosystem.
//!
//! Places a program's exams on dates, time slots and classrooms, then
//! seats each exam's students in its rooms under a spacing rule.
//! Persistence stays outside: the engine reads and writes through the
//! [`store::RecordStore`] contract.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Classroom`, `Student`,
//!   `ExamProgram`, `Exam`, `SeatAssignment`, calendar primitives
//! - **`scheduler`**: `TimetableGenerator`, `SeatingGenerator`, capacity
//!   matching, conflict detection, KPIs
//! - **`store`**: `RecordStore` contract and the in-memory `MemoryStore`
//! - **`config`**: `EngineConfig`, loadable from TOML
//! - **`validation`**: Input integrity checks (duplicate IDs and codes,
//!   room geometry, program dates, enrollment refs)
//! - **`error`**: `StoreError`, `EngineError`
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_exam::models::{Classroom, Course, Enrollment, ExamProgram, Student};
//! use u_exam::scheduler::{SeatingGenerator, TimetableGenerator};
//! use u_exam::store::MemoryStore;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
//! let store = MemoryStore::new();
//! store.add_program(ExamProgram::new(1, 1, "Finals", d(6), d(17))).unwrap();
//! store.add_course(Course::new(10, 1, "CS101")).unwrap();
//! store.add_classroom(Classroom::new(1, 1, "D-101", 6).with_grid(2, 4, 2)).unwrap();
//! for id in ["2001", "2002", "2003"] {
//!     store.add_student(Student::new(id, 1)).unwrap();
//!     store.enroll(Enrollment::new(id, 10)).unwrap();
//! }
//!
//! let timetable = TimetableGenerator::new(&store).generate_timetable(1, &[10]).unwrap();
//! let seating = SeatingGenerator::new(&store)
//!     .generate_seating(timetable.exams[0].id)
//!     .unwrap();
//! assert_eq!(seating.placed, 3);
//! ```
//!
//! # References
//!
//! - Carter & Laporte (1996), "Recent Developments in Practical
//!   Examination Timetabling"
//! - Qu et al. (2009), "A survey of search methodologies and automated
//!   system development for examination timetabling"

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod validation;
