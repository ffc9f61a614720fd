//! Program quality metrics (KPIs).
//!
//! Computes timetable and seating indicators from a program's stored
//! exams, room links and seats.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Exams | Exams in the program |
//! | Unassigned exams | Exams with no room |
//! | Avg fill rate | Mean of seated / room capacity over exams with rooms |
//! | Seated | Stored seat assignments |
//! | Unseated | Sum of max(0, enrolled - seated) |
//! | Dates used | Distinct exam dates |
//!
//! # Reference
//! McCollum et al. (2012), "A new model for automated examination
//! timetabling", §5: evaluation measures

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Classroom, Exam, ExamId, ProgramId};
use crate::store::RecordStore;

/// Program performance indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramKpi {
    /// Number of exams.
    pub exam_count: usize,
    /// Exams without any room.
    pub unassigned_exams: usize,
    /// Mean room fill rate over exams with rooms (0.0..=1.0).
    pub avg_fill_rate: f64,
    /// Per-exam fill rate, for exams with rooms.
    pub fill_rate_by_exam: HashMap<ExamId, f64>,
    /// Students with a stored seat.
    pub total_seated: usize,
    /// Enrolled students without a stored seat.
    pub total_unseated: usize,
    /// Distinct exam dates.
    pub dates_used: usize,
}

impl ProgramKpi {
    /// Computes KPIs from exams, their rooms and their seat counts.
    ///
    /// # Arguments
    /// * `exams` - The program's exams.
    /// * `rooms` - Rooms linked to each exam (missing key = no room).
    /// * `seated` - Stored seats per exam (missing key = none).
    pub fn calculate(
        exams: &[Exam],
        rooms: &HashMap<ExamId, Vec<Classroom>>,
        seated: &HashMap<ExamId, usize>,
    ) -> Self {
        let mut kpi = Self {
            exam_count: exams.len(),
            ..Default::default()
        };
        let mut dates = BTreeSet::new();

        for exam in exams {
            dates.insert(exam.date);
            let seats = seated.get(&exam.id).copied().unwrap_or(0);
            kpi.total_seated += seats;
            kpi.total_unseated += (exam.enrolled_count as usize).saturating_sub(seats);

            let capacity: u32 = rooms
                .get(&exam.id)
                .map(|rs| rs.iter().map(|r| r.capacity).sum())
                .unwrap_or(0);
            if capacity == 0 {
                kpi.unassigned_exams += 1;
            } else {
                let rate = (seats as f64 / f64::from(capacity)).min(1.0);
                kpi.fill_rate_by_exam.insert(exam.id, rate);
            }
        }

        kpi.dates_used = dates.len();
        kpi.avg_fill_rate = if kpi.fill_rate_by_exam.is_empty() {
            0.0
        } else {
            kpi.fill_rate_by_exam.values().sum::<f64>() / kpi.fill_rate_by_exam.len() as f64
        };
        kpi
    }

    /// Reads a program from a store and computes its KPIs.
    pub fn from_store<S: RecordStore + ?Sized>(store: &S, program_id: ProgramId) -> EngineResult<Self> {
        if store.find_program(program_id)?.is_none() {
            return Err(EngineError::ProgramNotFound(program_id));
        }
        let exams = store.list_exams_by_program(program_id)?;
        let mut rooms = HashMap::new();
        let mut seated = HashMap::new();
        for exam in &exams {
            rooms.insert(exam.id, store.list_exam_rooms(exam.id)?);
            seated.insert(exam.id, store.list_seat_assignments(exam.id)?.len());
        }
        Ok(Self::calculate(&exams, &rooms, &seated))
    }

    /// Whether the program meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_unassigned: usize, min_fill_rate: f64) -> bool {
        self.unassigned_exams <= max_unassigned && self.avg_fill_rate >= min_fill_rate
    }
}
