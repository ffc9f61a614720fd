//! Input validation for exam scheduling.
//!
//! Checks structural integrity of programs, classrooms and the course
//! catalog before scheduling. Detects:
//! - Inverted program date ranges and non-positive exam lengths
//! - Classrooms with zero capacity, rows, columns or seat pitch
//! - Duplicate IDs and duplicate codes within a department
//! - Enrollments referencing unknown students or courses

use std::collections::HashSet;
use std::fmt;

use crate::models::{Classroom, Course, Enrollment, ExamProgram, Student};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Two entities of one department share the same code.
    DuplicateCode,
    /// A record references an entity that doesn't exist.
    InvalidReference,
    /// Classroom capacity or grid dimension is zero.
    InvalidGeometry,
    /// Program start date is after its end date.
    InvalidDateRange,
    /// Exam length is zero.
    InvalidDuration,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Joins validation messages into one line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates an exam program.
pub fn validate_program(program: &ExamProgram) -> ValidationResult {
    let mut errors = Vec::new();

    if program.start_date > program.end_date {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            format!(
                "Program '{}' starts {} after it ends {}",
                program.name, program.start_date, program.end_date
            ),
        ));
    }

    if program.exam_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDuration,
            format!("Program '{}' has a zero exam length", program.name),
        ));
    }

    finish(errors)
}

/// Validates a classroom's capacity and seat grid.
pub fn validate_classroom(room: &Classroom) -> ValidationResult {
    let mut errors = Vec::new();
    let dims = [
        ("capacity", room.capacity),
        ("rows", room.rows),
        ("columns", room.columns),
        ("seat pitch", room.seat_pitch),
    ];
    for (field, value) in dims {
        if value == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidGeometry,
                format!("Classroom '{}' has zero {field}", room.code),
            ));
        }
    }
    finish(errors)
}

/// Validates a whole catalog before it is loaded into a store.
///
/// Checks:
/// 1. No duplicate course, classroom or student IDs
/// 2. No duplicate course or classroom codes within a department
/// 3. Every classroom has a usable geometry
/// 4. Every enrollment references a known student and course
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(
    courses: &[Course],
    classrooms: &[Classroom],
    students: &[Student],
    enrollments: &[Enrollment],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut course_ids = HashSet::new();
    let mut course_codes = HashSet::new();
    for c in courses {
        if !course_ids.insert(c.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", c.id),
            ));
        }
        if !course_codes.insert((c.department_id, c.code.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCode,
                format!("Duplicate course code: {}", c.code),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    let mut room_codes = HashSet::new();
    for r in classrooms {
        if !room_ids.insert(r.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate classroom ID: {}", r.id),
            ));
        }
        if !room_codes.insert((r.department_id, r.code.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCode,
                format!("Duplicate classroom code: {}", r.code),
            ));
        }
        if let Err(mut geometry) = validate_classroom(r) {
            errors.append(&mut geometry);
        }
    }

    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
    }

    for e in enrollments {
        if !student_ids.contains(e.student_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Enrollment references unknown student '{}'", e.student_id),
            ));
        }
        if !course_ids.contains(&e.course_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Enrollment references unknown course {}", e.course_id),
            ));
        }
    }

    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
