//! Engine configuration (`exam.toml`).
//!
//! Every field has a default, so an empty file is a valid configuration
//! and reproduces the reference behaviour: weekends excluded, four daily
//! slots, one smallest sufficient room per exam, no conflict reporting.
//!
//! ```toml
//! excluded_weekdays = ["Sat", "Sun"]
//! slots = ["09:00", "11:00", "13:30", "15:30"]
//! room_policy = "smallest_sufficient"
//! conflict_check = "off"
//! check_room_availability = false
//! ```

use std::path::Path;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{SlotPlan, DEFAULT_EXCLUDED_WEEKDAYS};

const SLOT_FORMAT: &str = "%H:%M";

/// How rooms are chosen for an exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPolicy {
    /// One room: the smallest whose capacity covers the headcount. Exams
    /// without such a room stay unassigned.
    #[default]
    SmallestSufficient,
    /// The smallest sufficient room if one exists; otherwise rooms are
    /// added largest first until the headcount is covered.
    SplitAcrossRooms,
}

/// Whether the timetable run looks for student double-bookings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCheck {
    #[default]
    Off,
    /// Count exams that double-book at least one student. Placement is
    /// unchanged.
    Report,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weekdays on which no exam is held.
    pub excluded_weekdays: Vec<Weekday>,
    /// Daily exam start times as `"HH:MM"`, in scheduling order.
    pub slots: Vec<String>,
    /// Room selection policy.
    pub room_policy: RoomPolicy,
    /// Double-booking report mode.
    pub conflict_check: ConflictCheck,
    /// Skip rooms already holding an overlapping exam.
    pub check_room_availability: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            excluded_weekdays: DEFAULT_EXCLUDED_WEEKDAYS.to_vec(),
            slots: format_slots(&SlotPlan::default_slots()),
            room_policy: RoomPolicy::default(),
            conflict_check: ConflictCheck::default(),
            check_room_availability: false,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.exam_slots()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Parsed daily slots.
    pub fn exam_slots(&self) -> EngineResult<Vec<NaiveTime>> {
        self.slots
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s.trim(), SLOT_FORMAT)
                    .map_err(|e| EngineError::Config(format!("invalid slot '{s}': {e}")))
            })
            .collect()
    }

    /// Sets the excluded weekdays.
    pub fn with_excluded_weekdays(mut self, weekdays: &[Weekday]) -> Self {
        self.excluded_weekdays = weekdays.to_vec();
        self
    }

    /// Sets the daily slots.
    pub fn with_slots(mut self, slots: &[NaiveTime]) -> Self {
        self.slots = format_slots(slots);
        self
    }

    /// Sets the room policy.
    pub fn with_room_policy(mut self, policy: RoomPolicy) -> Self {
        self.room_policy = policy;
        self
    }

    /// Sets the conflict check mode.
    pub fn with_conflict_check(mut self, mode: ConflictCheck) -> Self {
        self.conflict_check = mode;
        self
    }

    /// Enables or disables the room availability filter.
    pub fn with_room_availability_check(mut self, enabled: bool) -> Self {
        self.check_room_availability = enabled;
        self
    }
}

fn format_slots(slots: &[NaiveTime]) -> Vec<String> {
    slots
        .iter()
        .map(|t| t.format(SLOT_FORMAT).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.exam_slots().unwrap(), SlotPlan::default_slots());
        assert_eq!(config.excluded_weekdays, vec![Weekday::Sat, Weekday::Sun]);
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
excluded_weekdays = ["Sun"]
slots = ["08:30", "14:00"]
room_policy = "split_across_rooms"
conflict_check = "report"
check_room_availability = true
"#;
        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.excluded_weekdays, vec![Weekday::Sun]);
        assert_eq!(config.exam_slots().unwrap().len(), 2);
        assert_eq!(config.room_policy, RoomPolicy::SplitAcrossRooms);
        assert_eq!(config.conflict_check, ConflictCheck::Report);
        assert!(config.check_room_availability);
    }

    #[test]
    fn test_bad_slot_is_config_error() {
        let err = EngineConfig::from_toml_str(r#"slots = ["9 o'clock"]"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_unknown_policy_is_config_error() {
        let err = EngineConfig::from_toml_str(r#"room_policy = "largest""#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_builders_round_trip_through_toml() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let config = EngineConfig::default()
            .with_slots(&[t(10, 0)])
            .with_excluded_weekdays(&[])
            .with_room_policy(RoomPolicy::SplitAcrossRooms);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("10:00"));
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
