use anyhow::Result;
use owo_colors::OwoColorize;
use raceteam_core::IdentityProvider;

use super::Team;

pub fn register(team: &mut Team, username: &str) -> Result<()> {
    let member = team.sync.register(&mut team.identity, username)?;

    println!("{} Welcome to the team, {}", "✓".green(), member.name().bold());
    println!(
        "{}",
        "Answer for an event with: raceteam rsvp <event-id> available".dimmed()
    );
    Ok(())
}

pub fn sign_in(team: &mut Team, username: &str) -> Result<()> {
    let member = team.sync.sign_in(&mut team.identity, username)?;
    println!("{} Signed in as {}", "✓".green(), member.name().bold());
    Ok(())
}

pub fn sign_out(team: &mut Team) -> Result<()> {
    match team.identity.current().cloned() {
        Some(member) => {
            team.identity.sign_out();
            println!("Signed out {}", member.name());
        }
        None => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}
