use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::check_cell;
use crate::error::{TeamError, TeamResult};
use crate::event::{Catalog, EventId};
use crate::roster::{Member, Roster};
use crate::time_slot::TimeSlot;

/// A practice date paired with a time slot id, stored as `YYYY-MM-DD_<slot>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    pub date: NaiveDate,
    pub slot: String,
}

impl SlotKey {
    pub fn new(date: NaiveDate, slot: &str) -> Self {
        SlotKey {
            date,
            slot: slot.to_string(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date.format("%Y-%m-%d"), self.slot)
    }
}

impl FromStr for SlotKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, slot) = s
            .split_once('_')
            .ok_or_else(|| format!("Invalid slot key '{s}'. Expected YYYY-MM-DD_<slot>"))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date in slot key '{s}'"))?;
        if slot.is_empty() {
            return Err(format!("Missing slot id in slot key '{s}'"));
        }
        Ok(SlotKey::new(date, slot))
    }
}

impl TryFrom<String> for SlotKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.to_string()
    }
}

pub type MemberSlots = BTreeMap<SlotKey, bool>;

/// Practice availability: event → member → slot → available.
///
/// Unlike RSVP data this matrix stays sparse; a missing slot reads as
/// unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeMatrix(BTreeMap<EventId, BTreeMap<Member, MemberSlots>>);

impl PracticeMatrix {
    pub fn new() -> Self {
        PracticeMatrix::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_available(&self, event_id: &str, member: &str, key: &SlotKey) -> bool {
        self.member_slots(event_id, member)
            .and_then(|slots| slots.get(key))
            .copied()
            .unwrap_or(false)
    }

    pub fn member_slots(&self, event_id: &str, member: &str) -> Option<&MemberSlots> {
        self.0.get(event_id).and_then(|members| members.get(member))
    }

    /// Set one slot for one member, keeping every other slot they have
    /// already filled in for the event.
    pub fn set_slot(
        &mut self,
        catalog: &Catalog,
        roster: &Roster,
        slots: &[TimeSlot],
        event_id: &str,
        member: &str,
        key: SlotKey,
        available: bool,
    ) -> TeamResult<&Self> {
        check_cell(catalog, roster, event_id, member)?;
        if !slots.iter().any(|s| s.id == key.slot) {
            return Err(TeamError::Validation(format!(
                "Unknown practice slot '{}'",
                key.slot
            )));
        }

        self.0
            .entry(event_id.to_string())
            .or_default()
            .entry(Member::new(member))
            .or_default()
            .insert(key, available);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::make_event;
    use crate::roster::tests::roster_of;
    use crate::time_slot::default_time_slots;
    use chrono::{TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn fixture() -> (Catalog, Roster, Vec<TimeSlot>) {
        let start = Utc.with_ymd_and_hms(2026, 6, 14, 18, 0, 0).unwrap();
        (
            Catalog::new(vec![make_event("e1", "Le Mans", start)]),
            roster_of(&["Alex", "Sarah"]),
            default_time_slots(),
        )
    }

    #[test]
    fn test_slot_key_format() {
        let key = SlotKey::new(date(3), "eu");
        assert_eq!(key.to_string(), "2026-06-03_eu");
        assert_eq!("2026-06-03_eu".parse::<SlotKey>().unwrap(), key);
        assert_eq!(
            "2026-06-03_late_night".parse::<SlotKey>().unwrap().slot,
            "late_night"
        );
        assert!("2026-06-03".parse::<SlotKey>().is_err());
        assert!("june_eu".parse::<SlotKey>().is_err());
        assert!("2026-06-03_".parse::<SlotKey>().is_err());
    }

    #[test]
    fn test_set_slot_preserves_other_slots() {
        let (catalog, roster, slots) = fixture();
        let mut matrix = PracticeMatrix::new();

        matrix
            .set_slot(&catalog, &roster, &slots, "e1", "Alex", SlotKey::new(date(3), "eu"), true)
            .unwrap();
        matrix
            .set_slot(&catalog, &roster, &slots, "e1", "Alex", SlotKey::new(date(4), "aussie"), true)
            .unwrap();
        matrix
            .set_slot(&catalog, &roster, &slots, "e1", "Alex", SlotKey::new(date(3), "eu"), false)
            .unwrap();

        let alex = matrix.member_slots("e1", "Alex").unwrap();
        assert_eq!(alex.len(), 2);
        assert!(!matrix.is_available("e1", "Alex", &SlotKey::new(date(3), "eu")));
        assert!(matrix.is_available("e1", "Alex", &SlotKey::new(date(4), "aussie")));
        assert!(!matrix.is_available("e1", "Sarah", &SlotKey::new(date(4), "aussie")));
    }

    #[test]
    fn test_set_slot_rejects_unknown_slot() {
        let (catalog, roster, slots) = fixture();
        let mut matrix = PracticeMatrix::new();

        let err = matrix
            .set_slot(&catalog, &roster, &slots, "e1", "Alex", SlotKey::new(date(3), "us"), true)
            .unwrap_err();

        assert!(matches!(err, TeamError::Validation(_)));
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let (catalog, roster, slots) = fixture();
        let mut matrix = PracticeMatrix::new();
        matrix
            .set_slot(&catalog, &roster, &slots, "e1", "Sarah", SlotKey::new(date(5), "aussie"), true)
            .unwrap();

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "e1": { "Sarah": { "2026-06-05_aussie": true } } })
        );

        let back: PracticeMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(back, matrix);
    }
}
