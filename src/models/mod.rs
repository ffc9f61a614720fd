//! Exam scheduling domain models.
//!
//! Provides the record types the engine reads (courses, classrooms,
//! students, enrollments, programs) and the records it produces (exams,
//! room links, seat assignments).
//!
//! # Domain Mappings
//!
//! | u-exam | Scheduling notion |
//! |--------|-------------------|
//! | Course | Task to place |
//! | Classroom | Capacitated resource |
//! | ExamProgram | Planning horizon |
//! | Exam | Assignment (task → time × resource) |
//! | SeatAssignment | Unit placed inside a resource |

mod calendar;
mod classroom;
mod course;
mod exam;
mod program;
mod seat;
mod student;

pub use calendar::{EligibleDates, SlotPlan, TimeRange, DEFAULT_EXCLUDED_WEEKDAYS};
pub use classroom::{Classroom, ClassroomPatch};
pub use course::{Course, CourseCategory, CoursePatch};
pub use exam::{Exam, ExamRoomAssignment, RoomAssignOutcome};
pub use program::{ExamProgram, ExamType, ProgramPatch, DEFAULT_EXAM_MINUTES, DEFAULT_GAP_MINUTES};
pub use seat::SeatAssignment;
pub use student::{Enrollment, Student, StudentPatch};

/// Department identifier.
pub type DepartmentId = u32;
/// Course identifier.
pub type CourseId = u32;
/// Classroom identifier.
pub type ClassroomId = u32;
/// Exam program identifier.
pub type ProgramId = u32;
/// Exam identifier.
pub type ExamId = u32;
/// Student number. Ordered lexicographically.
pub type StudentId = String;
