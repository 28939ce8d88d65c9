//! Recurring daily practice slots.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A named daily practice slot.
///
/// The reference time is expressed in UTC so every member agrees on when
/// the slot happens; `local_time` converts it for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub display_name: String,
    pub reference_time: NaiveTime,
    #[serde(default)]
    pub description: String,
}

impl TimeSlot {
    pub fn new(id: &str, display_name: &str, hour: u32, description: &str) -> Self {
        TimeSlot {
            id: id.to_string(),
            display_name: display_name.to_string(),
            reference_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN),
            description: description.to_string(),
        }
    }

    /// When this slot happens on `date`, expressed in `tz`.
    pub fn local_time(&self, date: NaiveDate, tz: Tz) -> DateTime<Tz> {
        date.and_time(self.reference_time)
            .and_utc()
            .with_timezone(&tz)
    }

    /// Slot start as UTC on `date`.
    pub fn starts_at(&self, date: NaiveDate) -> DateTime<chrono::Utc> {
        chrono::Utc.from_utc_datetime(&date.and_time(self.reference_time))
    }
}

pub fn default_time_slots() -> Vec<TimeSlot> {
    vec![
        TimeSlot::new(
            "aussie",
            "Aussie Friendly",
            11,
            "Morning AEDT / Late Evening Americas",
        ),
        TimeSlot::new("eu", "EU Friendly", 16, "Afternoon EU / Morning Americas"),
    ]
}
