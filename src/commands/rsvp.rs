use anyhow::Result;
use owo_colors::OwoColorize;
use raceteam_core::RsvpStatus;

use super::Team;
use crate::render::Render;

pub fn run(team: &mut Team, event_id: &str, status: RsvpStatus, member: Option<&str>) -> Result<()> {
    let member = team.member(member)?;
    team.sync.set_rsvp(event_id, member.name(), status)?;

    let event_name = team
        .sync
        .catalog()
        .get(event_id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| event_id.to_string());

    println!(
        "{} {} is {} for {}",
        "✓".green(),
        member.name().bold(),
        status.render(),
        event_name
    );
    Ok(())
}
