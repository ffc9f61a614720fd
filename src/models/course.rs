//! Course model.
//!
//! A course is the unit the timetable schedules: each requested course
//! receives at most one exam per program. Courses belong to a department
//! catalog and are read-only while a timetable is being generated.

use serde::{Deserialize, Serialize};

use super::{CourseId, DepartmentId};

/// A course offered by a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Owning department.
    pub department_id: DepartmentId,
    /// Catalog code (e.g., "CS101").
    pub code: String,
    /// Course title.
    pub title: String,
    /// Instructor name.
    pub instructor: String,
    /// Year level (1 = first year).
    pub year: u8,
    /// Mandatory or elective.
    pub category: CourseCategory,
    /// Soft-delete flag. Inactive courses are never scheduled.
    pub active: bool,
}

/// Course classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
    /// Required for every student of the program.
    #[default]
    Mandatory,
    /// Chosen by the student.
    Elective,
}

/// Fields of a [`Course`] that may change after creation.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoursePatch {
    pub code: Option<String>,
    pub title: Option<String>,
    pub instructor: Option<String>,
    pub year: Option<u8>,
    pub category: Option<CourseCategory>,
    pub active: Option<bool>,
}

impl Course {
    /// Creates an active mandatory course.
    pub fn new(id: CourseId, department_id: DepartmentId, code: impl Into<String>) -> Self {
        Self {
            id,
            department_id,
            code: code.into(),
            title: String::new(),
            instructor: String::new(),
            year: 1,
            category: CourseCategory::Mandatory,
            active: true,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Sets the year level.
    pub fn with_year(mut self, year: u8) -> Self {
        self.year = year;
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: CourseCategory) -> Self {
        self.category = category;
        self
    }

    /// Marks the course inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &CoursePatch) {
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(instructor) = &patch.instructor {
            self.instructor = instructor.clone();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}
