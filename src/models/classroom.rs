//! Classroom model.
//!
//! Classrooms are the rooms exams are held in. Each has an exam capacity
//! and a physical seat grid of `rows × columns` desks. The seat pitch
//! describes how many consecutive desks are used before an empty one is
//! left as an aisle: with pitch `p`, every `(p + 1)`-th column stays empty.
//!
//! ```text
//! pitch = 2, columns = 7
//! col:  1  2  3  4  5  6  7
//!       S  S  .  S  S  .  S
//! ```

use serde::{Deserialize, Serialize};

use super::{ClassroomId, DepartmentId};

/// A room that can host exams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: ClassroomId,
    /// Owning department.
    pub department_id: DepartmentId,
    /// Short code (e.g., "D-101").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Maximum number of examinees.
    pub capacity: u32,
    /// Number of desk rows (front to back).
    pub rows: u32,
    /// Number of desk columns (left to right).
    pub columns: u32,
    /// Desks used between two aisles.
    pub seat_pitch: u32,
    /// Soft-delete flag. Inactive rooms are never matched.
    pub active: bool,
}

/// Fields of a [`Classroom`] that may change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassroomPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub seat_pitch: Option<u32>,
    pub active: Option<bool>,
}

impl Classroom {
    /// Creates an active classroom with a single row of `capacity` desks
    /// and no aisle, so every seat of the capacity is usable.
    ///
    /// Use [`with_grid`](Self::with_grid) to describe the real layout.
    pub fn new(
        id: ClassroomId,
        department_id: DepartmentId,
        code: impl Into<String>,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            department_id,
            code: code.into(),
            name: String::new(),
            capacity,
            rows: 1,
            columns: capacity,
            seat_pitch: capacity.max(1),
            active: true,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seat grid.
    pub fn with_grid(mut self, rows: u32, columns: u32, seat_pitch: u32) -> Self {
        self.rows = rows;
        self.columns = columns;
        self.seat_pitch = seat_pitch;
        self
    }

    /// Marks the room inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether a 1-based column index is left empty as an aisle.
    #[inline]
    pub fn is_aisle(&self, column: u32) -> bool {
        self.aisle_period().is_some_and(|period| column % period == 0)
    }

    /// Column period of the aisle pattern; `None` if no column is an aisle.
    fn aisle_period(&self) -> Option<u32> {
        self.seat_pitch.checked_add(1)
    }

    /// Usable desks in one row.
    pub fn seats_per_row(&self) -> u32 {
        match self.aisle_period() {
            Some(period) => self.columns - self.columns / period,
            None => self.columns,
        }
    }

    /// Usable desks in the whole grid, ignoring capacity. Saturates at
    /// `u32::MAX`.
    pub fn grid_seat_count(&self) -> u32 {
        self.rows.saturating_mul(self.seats_per_row())
    }

    /// Number of examinees this room can actually seat.
    ///
    /// Bounded by both the declared capacity and the usable grid.
    pub fn seat_limit(&self) -> u32 {
        self.capacity.min(self.grid_seat_count())
    }

    /// Usable (row, column) positions in row-major order, 1-based.
    pub fn seat_positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..=self.rows).flat_map(move |row| {
            (1..=self.columns)
                .filter(move |&col| !self.is_aisle(col))
                .map(move |col| (row, col))
        })
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &ClassroomPatch) {
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(rows) = patch.rows {
            self.rows = rows;
        }
        if let Some(columns) = patch.columns {
            self.columns = columns;
        }
        if let Some(pitch) = patch.seat_pitch {
            self.seat_pitch = pitch;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}
