//! Per-(event, member) availability state.
//!
//! Two matrices share the same shape: the RSVP matrix maps every event and
//! member to an [`RsvpStatus`], and the practice matrix maps event, member
//! and practice slot to a yes/no flag. Both are plain serde structures so
//! they can be shipped to the remote store as whole documents.

mod practice;
mod rsvp;

pub use practice::{PracticeMatrix, SlotKey};
pub use rsvp::RsvpMatrix;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TeamError, TeamResult};
use crate::event::Catalog;
use crate::roster::Roster;

/// A member's declared attendance intent for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Available,
    Maybe,
    Unavailable,
    /// No response yet
    #[default]
    Absent,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::Available,
        RsvpStatus::Maybe,
        RsvpStatus::Unavailable,
        RsvpStatus::Absent,
    ];

    pub fn is_response(&self) -> bool {
        *self != RsvpStatus::Absent
    }

    pub fn label(&self) -> &'static str {
        match self {
            RsvpStatus::Available => "Available",
            RsvpStatus::Maybe => "Maybe",
            RsvpStatus::Unavailable => "Unavailable",
            RsvpStatus::Absent => "No Response",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" | "yes" => Ok(RsvpStatus::Available),
            "maybe" => Ok(RsvpStatus::Maybe),
            "unavailable" | "no" => Ok(RsvpStatus::Unavailable),
            "absent" | "none" => Ok(RsvpStatus::Absent),
            other => Err(format!(
                "Unknown RSVP status '{other}'. Expected available, maybe, unavailable or absent"
            )),
        }
    }
}

/// Reject updates that reference an event or member nobody knows about.
fn check_cell(catalog: &Catalog, roster: &Roster, event_id: &str, member: &str) -> TeamResult<()> {
    if member.trim().is_empty() {
        return Err(TeamError::Validation("Member name must not be empty".into()));
    }
    if !catalog.contains(event_id) {
        return Err(TeamError::EventNotFound(event_id.to_string()));
    }
    if !roster.contains(member) {
        return Err(TeamError::MemberNotFound(member.to_string()));
    }
    Ok(())
}
