//! The event filter pipeline.
//!
//! Stages always run in the same order: time range, event type, class,
//! duration, name search, member RSVP status, attendance bucket. Each
//! stage only narrows the candidates left by the previous one.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{available_count, fuzzy};
use crate::date_range::DateRange;
use crate::event::{Event, EventType};
use crate::matrix::{RsvpMatrix, RsvpStatus};
use crate::roster::{Member, Roster};

/// Attendance thresholds in percent of the roster.
const LOW_BELOW_PERCENT: usize = 30;
const HIGH_FROM_PERCENT: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceBucket {
    /// Under 30% of the roster available
    Low,
    /// 30% up to but excluding 70%
    Medium,
    /// 70% or more
    High,
}

impl AttendanceBucket {
    /// Classify with integer arithmetic so the 30% and 70% edges are exact.
    pub fn classify(available: usize, roster_len: usize) -> Self {
        let scaled = available * 100;
        if scaled < LOW_BELOW_PERCENT * roster_len || roster_len == 0 {
            AttendanceBucket::Low
        } else if scaled < HIGH_FROM_PERCENT * roster_len {
            AttendanceBucket::Medium
        } else {
            AttendanceBucket::High
        }
    }
}

impl fmt::Display for AttendanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceBucket::Low => "low",
            AttendanceBucket::Medium => "medium",
            AttendanceBucket::High => "high",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for AttendanceBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(AttendanceBucket::Low),
            "medium" => Ok(AttendanceBucket::Medium),
            "high" => Ok(AttendanceBucket::High),
            other => Err(format!("Unknown attendance level '{other}'. Expected low, medium or high")),
        }
    }
}

/// Inclusive bounds on event length in hours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DurationRange {
    pub fn contains(&self, hours: f64) -> bool {
        self.min.is_none_or(|min| hours >= min) && self.max.is_none_or(|max| hours <= max)
    }
}

#[derive(Debug, Clone)]
pub struct EventFilter {
    pub range: DateRange,
    pub event_type: Option<EventType>,
    /// Keep events running any of these classes; empty keeps all
    pub classes: Vec<String>,
    pub duration: DurationRange,
    pub search: Option<String>,
    pub member_status: Option<(Member, RsvpStatus)>,
    pub attendance: Option<AttendanceBucket>,
}

impl EventFilter {
    /// No restrictions beyond hiding events that already started.
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        EventFilter {
            range: DateRange::upcoming(now),
            ..EventFilter::all()
        }
    }

    /// No restrictions at all.
    pub fn all() -> Self {
        EventFilter {
            range: DateRange::all(),
            event_type: None,
            classes: Vec::new(),
            duration: DurationRange::default(),
            search: None,
            member_status: None,
            attendance: None,
        }
    }

    /// Run the pipeline, preserving catalog order.
    pub fn apply<'a>(
        &self,
        events: &'a [Event],
        roster: &Roster,
        rsvp: &RsvpMatrix,
    ) -> Vec<&'a Event> {
        let mut remaining: Vec<&Event> = events.iter().collect();

        remaining.retain(|e| self.range.contains(e.start_time));

        if let Some(event_type) = self.event_type {
            remaining.retain(|e| e.event_type == event_type);
        }

        if !self.classes.is_empty() {
            remaining.retain(|e| self.classes.iter().any(|c| e.has_class(c)));
        }

        remaining.retain(|e| self.duration.contains(e.duration));

        if let Some(query) = &self.search {
            remaining.retain(|e| fuzzy::matches(query, &e.name));
        }

        if let Some((member, status)) = &self.member_status {
            remaining.retain(|e| rsvp.status(&e.id, member.name()) == *status);
        }

        if let Some(bucket) = self.attendance {
            remaining.retain(|e| {
                AttendanceBucket::classify(available_count(rsvp, roster, &e.id), roster.len())
                    == bucket
            });
        }

        debug!("Event filter kept {} of {} events", remaining.len(), events.len());
        remaining
    }
}
