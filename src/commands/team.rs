use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use raceteam_core::aggregate;
use raceteam_core::{IdentityProvider, RsvpStatus};

use super::Team;
use crate::utils::tui::create_spinner;

pub fn run(team: &Team) -> Result<()> {
    let state = team.sync.state();
    let stats = aggregate::team_stats(state.catalog.events(), &state.roster, &state.rsvp);

    println!("{}", "Team".bold());
    println!("  Members:       {}", state.roster.len());
    println!("  Events:        {}", stats.total_events);
    println!("  Availability:  {}%", stats.average_availability);
    if let Some(member) = team.identity.current() {
        println!("  Signed in as:  {}", member.name().bold());
    }

    if state.roster.is_empty() {
        println!();
        println!("{}", "Nobody has registered yet".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    let upcoming: Vec<_> = state
        .catalog
        .events()
        .iter()
        .filter(|e| e.is_upcoming(now))
        .collect();

    println!();
    for member in &state.roster {
        let available = upcoming
            .iter()
            .filter(|e| state.rsvp.status(&e.id, member.name()) == RsvpStatus::Available)
            .count();
        println!(
            "  {:<24} {}",
            member.name(),
            format!("available for {available}/{} upcoming", upcoming.len()).dimmed()
        );
    }

    Ok(())
}

pub async fn refresh(team: &mut Team) -> Result<()> {
    let spinner = create_spinner("Refreshing team data".into());
    let result = team.sync.refresh().await;
    spinner.finish_and_clear();
    result?;

    let state = team.sync.state();
    println!(
        "{} {} members, {} events",
        "Up to date:".green(),
        state.roster.len(),
        state.catalog.len()
    );
    Ok(())
}
