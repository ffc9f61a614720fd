//! Seat assignment model.

use serde::{Deserialize, Serialize};

use super::{ClassroomId, ExamId, StudentId};

/// One student's desk for one exam.
///
/// Rows and columns are 1-based. Unique per (exam, classroom, row, column)
/// and per (exam, student).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub exam_id: ExamId,
    pub classroom_id: ClassroomId,
    pub student_id: StudentId,
    pub row: u32,
    pub column: u32,
}

impl SeatAssignment {
    /// Creates a seat assignment.
    pub fn new(
        exam_id: ExamId,
        classroom_id: ClassroomId,
        student_id: impl Into<StudentId>,
        row: u32,
        column: u32,
    ) -> Self {
        Self {
            exam_id,
            classroom_id,
            student_id: student_id.into(),
            row,
            column,
        }
    }

    /// Desk key within the exam: (classroom, row, column).
    #[inline]
    pub fn desk(&self) -> (ClassroomId, u32, u32) {
        (self.classroom_id, self.row, self.column)
    }
}
