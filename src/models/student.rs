//! Student and enrollment models.

use serde::{Deserialize, Serialize};

use super::{CourseId, DepartmentId, StudentId};

/// An enrolled student.
///
/// Students are identified by their student number, which also defines
/// the seating order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student number.
    pub id: StudentId,
    /// Home department.
    pub department_id: DepartmentId,
    /// Full name.
    pub name: String,
    /// Current year level.
    pub year: u8,
    /// Soft-delete flag. Inactive students are never seated or counted.
    pub active: bool,
}

/// Fields of a [`Student`] that may change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub year: Option<u8>,
    pub active: Option<bool>,
}

/// A student's registration in a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

impl Student {
    /// Creates an active first-year student.
    pub fn new(id: impl Into<StudentId>, department_id: DepartmentId) -> Self {
        Self {
            id: id.into(),
            department_id,
            name: String::new(),
            year: 1,
            active: true,
        }
    }

    /// Sets the full name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the year level.
    pub fn with_year(mut self, year: u8) -> Self {
        self.year = year;
        self
    }

    /// Marks the student inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &StudentPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

impl Enrollment {
    /// Creates an enrollment link.
    pub fn new(student_id: impl Into<StudentId>, course_id: CourseId) -> Self {
        Self {
            student_id: student_id.into(),
            course_id,
        }
    }
}
