use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use raceteam_core::Member;
use raceteam_core::aggregate::{
    self, DurationRange, EventFilter, EventView, aggregate_sessions, sort_views,
};
use raceteam_core::date_range::DateRange;

use super::Team;
use crate::EventsArgs;
use crate::render::{Render, format_start, render_event_row};

pub fn run(team: &Team, args: EventsArgs) -> Result<()> {
    let range = DateRange::from_args(args.from.as_deref(), args.to.as_deref(), Utc::now())
        .map_err(|e| anyhow::anyhow!(e))?;

    let filter = EventFilter {
        range,
        event_type: args.event_type,
        classes: args.classes,
        duration: DurationRange {
            min: args.min_hours,
            max: args.max_hours,
        },
        search: args.search,
        member_status: args.member.map(|m| Member::new(m.trim())).zip(args.status),
        attendance: args.attendance,
    };

    let state = team.sync.state();
    let events = filter.apply(state.catalog.events(), &state.roster, &state.rsvp);

    let mut views = EventView::from_events(&events, &state.rsvp, &state.roster);
    if args.sessions {
        views = aggregate_sessions(views);
    }
    sort_views(&mut views, args.sort);

    if views.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let tz = team.timezone();
    for view in &views {
        println!("{}", render_event_row(view, state.roster.len(), tz));
    }

    Ok(())
}

pub fn show(team: &Team, id: &str) -> Result<()> {
    let state = team.sync.state();
    let Some(event) = state.catalog.get(id) else {
        anyhow::bail!("Event '{id}' not found. List event ids with `raceteam events --from all`");
    };

    println!("{}", event.name.bold());
    println!("  {} at {}", event.series, event.track);
    println!(
        "  {}, {}h, {}",
        event.event_type.label(),
        event.duration,
        event.classes.join(", ")
    );
    println!("  {}", format_start(&event.start_time, team.timezone()));
    println!(
        "  {}",
        aggregate::availability_label(&state.rsvp, &state.roster, &event.id).bold()
    );
    println!();

    for (member, status) in aggregate::event_responses(&state.rsvp, &state.roster, &event.id) {
        println!("  {:<24} {}", member.name(), status.render());
    }

    Ok(())
}
