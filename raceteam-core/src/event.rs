//! Racing events from the read-only catalog.
//!
//! Events are never mutated by raceteam. The catalog is loaded once at
//! startup and handed to the sync controller, which uses it to validate
//! updates and to densify the RSVP matrix.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TeamError, TeamResult};

pub type EventId = String;

/// A scheduled racing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub series: String,
    pub track: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Car classes in catalog order
    pub classes: Vec<String>,
    pub start_time: DateTime<Utc>,
    /// Length of the event in hours
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Special,
    Get,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Special => "Special",
            EventType::Get => "GET",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "special" => Ok(EventType::Special),
            "get" => Ok(EventType::Get),
            other => Err(format!("Unknown event type '{other}'. Expected 'special' or 'get'")),
        }
    }
}

impl Event {
    /// Calendar date (UTC) the event starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(class))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The ordered, read-only event catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog(Vec<Event>);

impl Catalog {
    pub fn new(events: Vec<Event>) -> Self {
        Catalog(events)
    }

    pub fn from_json(content: &str) -> TeamResult<Self> {
        let events: Vec<Event> =
            serde_json::from_str(content).map_err(|e| TeamError::Catalog(e.to_string()))?;
        Ok(Catalog(events))
    }

    pub fn load(path: &Path) -> TeamResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TeamError::Catalog(format!("Could not read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn events(&self) -> &[Event] {
        &self.0
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.0.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
