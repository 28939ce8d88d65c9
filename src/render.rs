//! Colored terminal rendering for raceteam types.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use raceteam_core::aggregate::{AttendanceBucket, EventView, SlotAvailability};
use raceteam_core::{RsvpStatus, TeamError};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for RsvpStatus {
    fn render(&self) -> String {
        let label = self.label();
        match self {
            RsvpStatus::Available => label.green().to_string(),
            RsvpStatus::Maybe => label.yellow().to_string(),
            RsvpStatus::Unavailable => label.red().to_string(),
            RsvpStatus::Absent => label.dimmed().to_string(),
        }
    }
}

fn colorize_attendance(bucket: AttendanceBucket, text: &str) -> String {
    match bucket {
        AttendanceBucket::High => text.green().to_string(),
        AttendanceBucket::Medium => text.yellow().to_string(),
        AttendanceBucket::Low => text.red().to_string(),
    }
}

/// e.g. "Sat Jun 14 15:00"
pub fn format_start(at: &DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%a %b %-d %H:%M").to_string()
}

pub fn render_event_row(view: &EventView<'_>, roster_len: usize, tz: Tz) -> String {
    let event = view.event;
    let bucket = AttendanceBucket::classify(view.available, roster_len);
    let attendance = colorize_attendance(
        bucket,
        &format!("{}/{} available", view.available, roster_len),
    );

    let mut row = format!(
        "  {} {} {} {}",
        format_start(&event.start_time, tz).dimmed(),
        event.name.bold(),
        format!("[{}]", event.id).dimmed(),
        attendance
    );
    if let Some(total) = view.total_sessions {
        row.push_str(&format!(" {}", format!("(best of {total} sessions)").dimmed()));
    }
    row
}

pub fn render_slot_row(slot: &SlotAvailability<'_>, tz: Tz) -> String {
    let local = slot.slot.local_time(slot.date(), tz);
    let members: Vec<&str> = slot.available_members.iter().map(|m| m.name()).collect();

    format!(
        "  {} {:<18} {} {:>3}%  {}",
        slot.date().format("%a %b %-d"),
        slot.slot.display_name,
        local.format("%H:%M %Z").dimmed(),
        slot.percentage,
        members.join(", ")
    )
}

pub fn render_warning(error: &TeamError) -> String {
    format!("{} {}", "warning:".yellow().bold(), error)
}
