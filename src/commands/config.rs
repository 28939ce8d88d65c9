use anyhow::Result;
use owo_colors::OwoColorize;
use raceteam_core::TeamConfig;

pub fn run() -> Result<()> {
    let config_path = TeamConfig::config_path()?;
    let config = TeamConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Team data:  {}", config.data_path().display());
    println!("  Catalog:    {}", config.catalog_path().display());
    println!("  Cache:      {}", config.cache_path().display());

    println!();
    println!("{}", "Practice slots".bold());
    let tz = config.timezone();
    for slot in &config.time_slots {
        println!(
            "  {:<8} {:<18} {} UTC {}",
            slot.id,
            slot.display_name,
            slot.reference_time.format("%H:%M"),
            slot.description.dimmed()
        );
    }
    println!("  Times shown in {tz}");

    let overrides = config.to_toml()?;
    if !overrides.trim().is_empty() {
        println!();
        println!("{}", "Overrides".bold());
        for line in overrides.lines() {
            println!("  {line}");
        }
    }

    Ok(())
}
