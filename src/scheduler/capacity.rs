//! Capacity matching.
//!
//! Finds the rooms of a department that can hold an exam's headcount.
//!
//! # Algorithm
//! Candidates are the department's active rooms with `capacity >= headcount`,
//! ascending by capacity, so the first candidate wastes the fewest seats.
//! Under [`RoomPolicy::SplitAcrossRooms`], when no single room qualifies,
//! the whole pool is taken largest first until the headcount is covered
//! (fewest rooms for the cohort). Coverage counts the seats a room can
//! really offer, [`Classroom::seat_limit`], not its declared capacity.
//!
//! # Reference
//! Carter & Laporte (1996), "Recent Developments in Practical Examination
//! Timetabling", §3: room assignment

use crate::config::RoomPolicy;
use crate::error::StoreResult;
use crate::models::{Classroom, DepartmentId};
use crate::store::RecordStore;

/// Rooms chosen for one exam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomSelection {
    /// Chosen rooms, in the order seating fills them (ascending capacity).
    pub rooms: Vec<Classroom>,
    /// Students the chosen rooms cannot hold.
    pub shortfall: u32,
}

impl RoomSelection {
    /// Selection with no room at all.
    pub fn none(headcount: u32) -> Self {
        Self {
            rooms: Vec::new(),
            shortfall: headcount,
        }
    }

    /// Whether no room was chosen.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Combined capacity of the chosen rooms.
    pub fn total_capacity(&self) -> u32 {
        self.rooms.iter().map(|r| r.capacity).sum()
    }

    /// Combined seat limit of the chosen rooms.
    pub fn total_seats(&self) -> u32 {
        self.rooms
            .iter()
            .fold(0u32, |acc, r| acc.saturating_add(r.seat_limit()))
    }
}

/// Room lookups by headcount.
#[derive(Debug)]
pub struct CapacityMatcher<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> CapacityMatcher<'a, S> {
    /// Creates a matcher over a store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Active rooms of the department that hold `headcount`, smallest first.
    pub fn candidates(
        &self,
        department_id: DepartmentId,
        headcount: u32,
    ) -> StoreResult<Vec<Classroom>> {
        self.store.list_rooms_by_department(department_id, headcount)
    }

    /// Chooses rooms for an exam under `policy`.
    ///
    /// Rooms rejected by `usable` are ignored.
    pub fn select<F>(
        &self,
        department_id: DepartmentId,
        headcount: u32,
        policy: RoomPolicy,
        usable: F,
    ) -> StoreResult<RoomSelection>
    where
        F: Fn(&Classroom) -> bool,
    {
        if let Some(room) = self
            .candidates(department_id, headcount)?
            .into_iter()
            .find(|r| usable(r))
        {
            return Ok(RoomSelection {
                rooms: vec![room],
                shortfall: 0,
            });
        }

        match policy {
            RoomPolicy::SmallestSufficient => Ok(RoomSelection::none(headcount)),
            RoomPolicy::SplitAcrossRooms => {
                let pool: Vec<Classroom> = self
                    .store
                    .list_rooms_by_department(department_id, 0)?
                    .into_iter()
                    .filter(|r| usable(r))
                    .collect();
                Ok(split_rooms(&pool, headcount))
            }
        }
    }
}

/// Covers `headcount` with rooms from `pool`, most seats first.
///
/// The result is ordered by ascending capacity (ties by id). If the whole
/// pool is too small, every room is used and the rest is reported as
/// shortfall.
pub fn split_rooms(pool: &[Classroom], headcount: u32) -> RoomSelection {
    let mut by_size: Vec<&Classroom> = pool.iter().collect();
    by_size.sort_by(|a, b| b.seat_limit().cmp(&a.seat_limit()).then(a.id.cmp(&b.id)));

    let mut rooms = Vec::new();
    let mut covered = 0u32;
    for room in by_size {
        if covered >= headcount {
            break;
        }
        covered = covered.saturating_add(room.seat_limit());
        rooms.push(room.clone());
    }
    rooms.sort_by_key(|r| (r.capacity, r.id));

    RoomSelection {
        rooms,
        shortfall: headcount.saturating_sub(covered),
    }
}
