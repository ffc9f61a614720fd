//! Error types for the exam engine.
//!
//! Only batch-aborting failures surface as errors. Per-item problems
//! (an unknown course, a rejected seat) are counted in the reports
//! returned by the generators instead.

use thiserror::Error;

use crate::models::{ExamId, ProgramId};

/// Result type alias for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by a [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors that abort a whole timetable or seating run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("exam program {0} not found")]
    ProgramNotFound(ProgramId),

    #[error("exam {0} not found")]
    ExamNotFound(ExamId),

    #[error("no eligible exam dates between {start} and {end}")]
    NoEligibleDates {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("no exam time slots configured")]
    NoTimeSlots,

    #[error("invalid exam program: {0}")]
    InvalidProgram(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
