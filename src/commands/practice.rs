use anyhow::Result;
use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;
use raceteam_core::SlotKey;
use raceteam_core::aggregate;

use super::Team;
use crate::render::{format_start, render_slot_row};

pub fn candidates(team: &Team, member: Option<&str>) -> Result<()> {
    let member = team.member(member)?;
    let state = team.sync.state();
    let events =
        aggregate::practice_candidates(state.catalog.events(), &state.rsvp, member.name(), Utc::now());

    if events.is_empty() {
        println!(
            "{}",
            format!("{member} is not marked available for any upcoming event").dimmed()
        );
        return Ok(());
    }

    let tz = team.timezone();
    for event in events {
        println!(
            "  {} {} {}",
            format_start(&event.start_time, tz).dimmed(),
            event.name.bold(),
            format!("[{}]", event.id).dimmed()
        );
    }
    Ok(())
}

pub fn show(team: &Team, event_id: &str, top: usize) -> Result<()> {
    let state = team.sync.state();
    let Some(event) = state.catalog.get(event_id) else {
        anyhow::bail!("Event '{event_id}' not found");
    };

    let slots = aggregate::aggregate_practice(
        event,
        &state.roster,
        &state.practice,
        team.sync.time_slots(),
    );

    println!("{} {}", "Practice for".dimmed(), event.name.bold());
    if slots.first().is_none_or(|s| s.available_count() == 0) {
        println!("{}", "  Nobody has marked practice availability yet".dimmed());
        return Ok(());
    }

    let tz = team.timezone();
    for slot in slots.iter().take(top) {
        println!("{}", render_slot_row(slot, tz));
    }
    Ok(())
}

pub fn set(
    team: &mut Team,
    event_id: &str,
    date: NaiveDate,
    slot: &str,
    available: bool,
    member: Option<&str>,
) -> Result<()> {
    let member = team.member(member)?;
    team.sync
        .set_practice_availability(event_id, member.name(), SlotKey::new(date, slot), available)?;

    if let Some(event) = team.sync.catalog().get(event_id)
        && !aggregate::practice_window(event.start_date()).contains(&date)
    {
        println!(
            "{}",
            format!("Note: {date} is outside the practice window for {}", event.name).dimmed()
        );
    }

    let answer = if available {
        "can".green().to_string()
    } else {
        "can't".red().to_string()
    };
    println!(
        "{} {} {answer} practice on {date} ({slot})",
        "✓".green(),
        member.name().bold()
    );
    Ok(())
}
