//! Timetable generation.
//!
//! # Algorithm
//!
//! 1. Build the program's calendar (eligible dates × daily slots).
//! 2. For each course, in the caller's order, take the slot under the
//!    cursor and create the exam there.
//! 3. Assign rooms by headcount through the capacity matcher.
//! 4. Advance the cursor one slot, wrapping to the next date.
//!
//! Each course gets its own slot, so exams of one run never overlap.
//! A course that cannot be placed is counted as failed and the run moves
//! on; only problems with the program itself abort the run.
//!
//! # Complexity
//! O(n * r) store calls where n=courses, r=department rooms.
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated
//! timetabling", §2: sequential construction heuristics

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::capacity::{CapacityMatcher, RoomSelection};
use super::conflict::{ConflictDetector, RoomAvailability};
use super::cursor::{ExamCalendar, SlotCursor};
use crate::config::{ConflictCheck, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Course, CourseId, Exam, ExamProgram, ExamRoomAssignment, ProgramId, TimeRange,
};
use crate::store::RecordStore;

/// Why a course got no exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseFailure {
    /// The course does not exist or is inactive.
    UnknownCourse,
    /// Every (date, slot) position was already used.
    NoSlotLeft,
    /// The store rejected a read or write.
    Store(String),
}

impl fmt::Display for CourseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCourse => f.write_str("unknown or inactive course"),
            Self::NoSlotLeft => f.write_str("no exam slot left in the program"),
            Self::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

/// Outcome of one timetable run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableReport {
    /// Exams created.
    pub scheduled: usize,
    /// Courses that got no exam.
    pub failed: usize,
    /// Scheduled exams left without any room.
    pub unassigned: usize,
    /// Scheduled exams that double-book at least one student, or whose
    /// roster could not be read for the check (only counted with
    /// [`ConflictCheck::Report`]).
    pub conflicts: usize,
    /// Students not covered by the rooms of partially housed exams.
    pub shortfall: u32,
    /// Created exams in creation order.
    pub exams: Vec<Exam>,
    /// Room links made during the run.
    pub assignments: Vec<ExamRoomAssignment>,
    /// Failed courses with the reason.
    pub failures: Vec<(CourseId, CourseFailure)>,
}

impl TimetableReport {
    /// Whether every requested course got an exam.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    fn fail(&mut self, course_id: CourseId, reason: CourseFailure) {
        warn!(course = course_id, %reason, "course not scheduled");
        self.failed += 1;
        self.failures.push((course_id, reason));
    }
}

impl fmt::Display for TimetableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} exams scheduled, {} failed", self.scheduled, self.failed)?;
        if self.unassigned > 0 {
            write!(f, ", {} without a room", self.unassigned)?;
        }
        if self.conflicts > 0 {
            write!(f, ", {} with student conflicts", self.conflicts)?;
        }
        Ok(())
    }
}

/// Places a program's exams on dates, slots and rooms.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_exam::models::{Classroom, Course, ExamProgram};
/// use u_exam::scheduler::TimetableGenerator;
/// use u_exam::store::MemoryStore;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
/// let store = MemoryStore::new();
/// store.add_program(ExamProgram::new(1, 1, "Finals", d(1, 6), d(1, 10))).unwrap();
/// store.add_course(Course::new(10, 1, "CS101")).unwrap();
/// store.add_classroom(Classroom::new(1, 1, "D-101", 40).with_grid(5, 12, 2)).unwrap();
///
/// let report = TimetableGenerator::new(&store).generate_timetable(1, &[10]).unwrap();
/// assert_eq!(report.to_string(), "1 exams scheduled, 0 failed");
/// assert_eq!(report.exams[0].date, d(1, 6));
/// ```
#[derive(Debug)]
pub struct TimetableGenerator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    config: EngineConfig,
}

impl<'a, S: RecordStore + ?Sized> TimetableGenerator<'a, S> {
    /// Creates a generator with the default configuration.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates one exam per course of `course_ids`.
    ///
    /// # Errors
    /// Fails without creating anything if the program is missing, has no
    /// eligible date, no slot, or an exam length that runs past midnight.
    /// Per-course problems are reported in [`TimetableReport::failures`].
    #[instrument(skip(self, course_ids), fields(courses = course_ids.len()))]
    pub fn generate_timetable(
        &self,
        program_id: ProgramId,
        course_ids: &[CourseId],
    ) -> EngineResult<TimetableReport> {
        let program = self
            .store
            .find_program(program_id)?
            .ok_or(EngineError::ProgramNotFound(program_id))?;
        let slots = self.config.exam_slots()?;
        let calendar = ExamCalendar::new(&program, &self.config.excluded_weekdays, &slots)?;
        debug!(
            dates = calendar.dates().len(),
            slots = calendar.slots().len(),
            "calendar built"
        );

        let mut report = TimetableReport::default();
        let mut cursor = SlotCursor::default();

        for &course_id in course_ids {
            let course = match self.store.find_course(course_id) {
                Ok(Some(course)) if course.active => course,
                Ok(_) => {
                    report.fail(course_id, CourseFailure::UnknownCourse);
                    continue;
                }
                Err(e) => {
                    report.fail(course_id, CourseFailure::Store(e.to_string()));
                    continue;
                }
            };

            let Some((date, range)) = calendar.at(cursor) else {
                report.fail(course_id, CourseFailure::NoSlotLeft);
                continue;
            };

            match self.place(&program, &course, date, range, &mut report) {
                Ok(exam) => {
                    report.scheduled += 1;
                    report.exams.push(exam);
                    cursor = calendar.advance(cursor);
                }
                Err(e) => report.fail(course_id, CourseFailure::Store(e.to_string())),
            }
        }

        info!(
            scheduled = report.scheduled,
            failed = report.failed,
            unassigned = report.unassigned,
            "timetable generated"
        );
        Ok(report)
    }

    /// Creates the exam of one course at (date, range) and assigns rooms.
    ///
    /// Errors before the exam exists fail the course. Later errors are
    /// logged and leave the exam in place.
    fn place(
        &self,
        program: &ExamProgram,
        course: &Course,
        date: NaiveDate,
        range: TimeRange,
        report: &mut TimetableReport,
    ) -> EngineResult<Exam> {
        let headcount = u32::try_from(self.store.count_enrolled(course.id)?).unwrap_or(u32::MAX);

        if self.config.conflict_check == ConflictCheck::Report {
            match self.store.list_enrolled_students(course.id) {
                Ok(students) => {
                    let conflicted = ConflictDetector::new(self.store)
                        .count_conflicted(program.id, &students, date, &range);
                    if conflicted > 0 {
                        warn!(course = course.id, %date, start = %range.start, students = conflicted, "exam double-books students");
                        report.conflicts += 1;
                    }
                }
                Err(e) => {
                    // Unknown roster: assume a conflict, keep placing.
                    warn!(course = course.id, error = %e, "roster lookup failed, conflict assumed");
                    report.conflicts += 1;
                }
            }
        }

        let exam_id = self
            .store
            .create_exam(program.id, course.id, date, range.start, range.end)?;
        let exam = Exam {
            id: exam_id,
            program_id: program.id,
            course_id: course.id,
            date,
            start: range.start,
            end: range.end,
            enrolled_count: headcount,
        };
        if let Err(e) = self.store.set_enrolled_count(exam_id, headcount) {
            warn!(exam = exam_id, error = %e, "could not cache enrolled count");
        }

        let selection = match self.select_rooms(program, headcount, date, &range) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(exam = exam_id, error = %e, "room lookup failed");
                RoomSelection::none(headcount)
            }
        };

        let mut linked = 0;
        for room in &selection.rooms {
            match self.store.assign_room_to_exam(exam_id, room.id) {
                Ok(_) => {
                    linked += 1;
                    report.assignments.push(ExamRoomAssignment {
                        exam_id,
                        classroom_id: room.id,
                    });
                }
                Err(e) => warn!(exam = exam_id, classroom = room.id, error = %e, "room link failed"),
            }
        }

        if linked == 0 {
            warn!(exam = exam_id, course = %course.code, headcount, "no suitable room");
            report.unassigned += 1;
        } else if selection.shortfall > 0 {
            warn!(exam = exam_id, course = %course.code, shortfall = selection.shortfall, "rooms cannot hold every student");
            report.shortfall += selection.shortfall;
        }

        debug!(exam = exam_id, course = %course.code, %date, start = %range.start, rooms = linked, "exam placed");
        Ok(exam)
    }

    fn select_rooms(
        &self,
        program: &ExamProgram,
        headcount: u32,
        date: NaiveDate,
        range: &TimeRange,
    ) -> EngineResult<RoomSelection> {
        let matcher = CapacityMatcher::new(self.store);
        let policy = self.config.room_policy;
        let selection = if self.config.check_room_availability {
            let availability = RoomAvailability::new(self.store);
            matcher.select(program.department_id, headcount, policy, |room| {
                availability.is_free(room.id, date, range)
            })?
        } else {
            matcher.select(program.department_id, headcount, policy, |_| true)?
        };
        Ok(selection)
    }
}
