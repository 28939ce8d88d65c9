//! Read-only team views derived from the catalog, roster and matrices.
//!
//! Everything here is a pure function of its inputs; nothing touches the
//! sync controller or the stores.

pub mod filter;
pub mod fuzzy;
pub mod practice;
pub mod sessions;
pub mod sort;

pub use filter::{AttendanceBucket, DurationRange, EventFilter};
pub use practice::{PRACTICE_WINDOW_DAYS, SlotAvailability, aggregate_practice, practice_window};
pub use sessions::{EventView, aggregate_sessions};
pub use sort::{SortOrder, sort_views};

use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::matrix::{RsvpMatrix, RsvpStatus};
use crate::roster::{Member, Roster};

/// At most this many events are offered for practice scheduling.
pub const PRACTICE_CANDIDATE_LIMIT: usize = 10;

/// Roster members who answered `available` for the event.
pub fn available_count(rsvp: &RsvpMatrix, roster: &Roster, event_id: &str) -> usize {
    roster
        .iter()
        .filter(|m| rsvp.status(event_id, m.name()) == RsvpStatus::Available)
        .count()
}

/// Share of the roster available for the event, in `[0, 1]`.
pub fn attendance_ratio(rsvp: &RsvpMatrix, roster: &Roster, event_id: &str) -> f64 {
    if roster.is_empty() {
        return 0.0;
    }
    available_count(rsvp, roster, event_id) as f64 / roster.len() as f64
}

/// `count / total` as a rounded percentage, 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Available answers divided by all answers across every catalog event
/// and roster member. `Absent` cells are not answers.
pub fn global_average_availability(events: &[Event], roster: &Roster, rsvp: &RsvpMatrix) -> f64 {
    let mut available = 0usize;
    let mut responded = 0usize;

    for event in events {
        for member in roster {
            let status = rsvp.status(&event.id, member.name());
            if status == RsvpStatus::Available {
                available += 1;
            }
            if status.is_response() {
                responded += 1;
            }
        }
    }

    if responded == 0 {
        return 0.0;
    }
    available as f64 / responded as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStats {
    pub total_events: usize,
    /// Rounded percentage
    pub average_availability: u32,
}

pub fn team_stats(events: &[Event], roster: &Roster, rsvp: &RsvpMatrix) -> TeamStats {
    let ratio = global_average_availability(events, roster, rsvp);
    TeamStats {
        total_events: events.len(),
        average_availability: (ratio * 100.0).round() as u32,
    }
}

/// Short summary such as `"3/10 available"`.
pub fn availability_label(rsvp: &RsvpMatrix, roster: &Roster, event_id: &str) -> String {
    format!(
        "{}/{} available",
        available_count(rsvp, roster, event_id),
        roster.len()
    )
}

/// Every roster member's answer for one event, in roster order.
pub fn event_responses<'a>(
    rsvp: &RsvpMatrix,
    roster: &'a Roster,
    event_id: &str,
) -> Vec<(&'a Member, RsvpStatus)> {
    roster
        .iter()
        .map(|m| (m, rsvp.status(event_id, m.name())))
        .collect()
}

/// Upcoming events the member said they are available for, soonest first.
/// These are the events worth scheduling practice for.
pub fn practice_candidates<'a>(
    events: &'a [Event],
    rsvp: &RsvpMatrix,
    member: &str,
    now: DateTime<Utc>,
) -> Vec<&'a Event> {
    let mut candidates: Vec<&Event> = events
        .iter()
        .filter(|e| e.is_upcoming(now))
        .filter(|e| rsvp.status(&e.id, member) == RsvpStatus::Available)
        .collect();
    candidates.sort_by_key(|e| e.start_time);
    candidates.truncate(PRACTICE_CANDIDATE_LIMIT);
    candidates
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::Catalog;
    use crate::event::tests::make_event;
    use crate::roster::tests::roster_of;
    use chrono::{Duration, TimeZone};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
    }

    /// Build an RSVP matrix from `(event, member, status)` triples.
    pub fn rsvp_of(
        catalog: &Catalog,
        roster: &Roster,
        cells: &[(&str, &str, RsvpStatus)],
    ) -> RsvpMatrix {
        let mut matrix = RsvpMatrix::new().densify(catalog.events(), roster);
        for (event, member, status) in cells {
            matrix
                .set_status(catalog, roster, event, member, *status)
                .unwrap();
        }
        matrix
    }

    /// Mark the first `available` roster members available for the event
    /// and everyone else unavailable.
    pub fn with_available(
        catalog: &Catalog,
        roster: &Roster,
        matrix: &mut RsvpMatrix,
        event_id: &str,
        available: usize,
    ) {
        for (i, member) in roster.iter().enumerate() {
            let status = if i < available {
                RsvpStatus::Available
            } else {
                RsvpStatus::Unavailable
            };
            matrix
                .set_status(catalog, roster, event_id, member.name(), status)
                .unwrap();
        }
    }

    #[test]
    fn test_end_to_end_two_members() {
        let catalog = Catalog::new(vec![make_event("E1", "Race", now() + Duration::days(3))]);
        let roster = roster_of(&["A", "B"]);
        let rsvp = rsvp_of(
            &catalog,
            &roster,
            &[
                ("E1", "A", RsvpStatus::Available),
                ("E1", "B", RsvpStatus::Maybe),
            ],
        );

        assert_eq!(global_average_availability(catalog.events(), &roster, &rsvp), 0.5);
        assert_eq!(attendance_ratio(&rsvp, &roster, "E1"), 0.5);
        assert_eq!(
            team_stats(catalog.events(), &roster, &rsvp),
            TeamStats {
                total_events: 1,
                average_availability: 50
            }
        );
        assert_eq!(availability_label(&rsvp, &roster, "E1"), "1/2 available");
    }

    #[test]
    fn test_attendance_ratio_empty_roster_is_zero() {
        let rsvp = RsvpMatrix::new();
        let ratio = attendance_ratio(&rsvp, &Roster::new(), "E1");
        assert_eq!(ratio, 0.0);
        assert!(ratio.is_finite());
    }

    #[test]
    fn test_attendance_ratio_stays_in_unit_interval() {
        let catalog = Catalog::new(vec![make_event("E1", "Race", now())]);
        for n in 0..8usize {
            let names: Vec<String> = (0..n).map(|i| format!("m{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let roster = roster_of(&refs);
            for available in 0..=n {
                let mut rsvp = RsvpMatrix::new();
                with_available(&catalog, &roster, &mut rsvp, "E1", available);
                let ratio = attendance_ratio(&rsvp, &roster, "E1");
                assert!((0.0..=1.0).contains(&ratio), "n={n} available={available}");
            }
        }
    }

    #[test]
    fn test_non_roster_cells_do_not_count() {
        let catalog = Catalog::new(vec![make_event("E1", "Race", now())]);
        let old_roster = roster_of(&["A", "B", "C"]);
        let rsvp = rsvp_of(
            &catalog,
            &old_roster,
            &[
                ("E1", "A", RsvpStatus::Available),
                ("E1", "C", RsvpStatus::Available),
            ],
        );

        let roster = roster_of(&["A"]);
        assert_eq!(available_count(&rsvp, &roster, "E1"), 1);
        assert_eq!(attendance_ratio(&rsvp, &roster, "E1"), 1.0);
    }

    #[test]
    fn test_global_average_ignores_absent_and_orphans() {
        let catalog = Catalog::new(vec![
            make_event("E1", "Race 1", now()),
            make_event("E2", "Race 2", now()),
        ]);
        let roster = roster_of(&["A", "B"]);
        let mut rsvp = rsvp_of(
            &catalog,
            &roster,
            &[
                ("E1", "A", RsvpStatus::Available),
                ("E2", "A", RsvpStatus::Unavailable),
                ("E2", "B", RsvpStatus::Available),
            ],
        );
        let orphan_catalog = Catalog::new(vec![make_event("gone", "Old", now())]);
        rsvp.set_status(&orphan_catalog, &roster, "gone", "B", RsvpStatus::Unavailable)
            .unwrap();

        let average = global_average_availability(catalog.events(), &roster, &rsvp);
        assert!((average - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(team_stats(catalog.events(), &roster, &rsvp).average_availability, 67);
    }

    #[test]
    fn test_global_average_without_responses_is_zero() {
        let catalog = Catalog::new(vec![make_event("E1", "Race", now())]);
        let roster = roster_of(&["A", "B"]);
        let rsvp = RsvpMatrix::new().densify(catalog.events(), &roster);
        assert_eq!(global_average_availability(catalog.events(), &roster, &rsvp), 0.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_event_responses_in_roster_order() {
        let catalog = Catalog::new(vec![make_event("E1", "Race", now())]);
        let roster = roster_of(&["Zoe", "Adam"]);
        let rsvp = rsvp_of(&catalog, &roster, &[("E1", "Adam", RsvpStatus::Maybe)]);

        let responses: Vec<_> = event_responses(&rsvp, &roster, "E1")
            .into_iter()
            .map(|(m, s)| (m.name().to_string(), s))
            .collect();
        assert_eq!(
            responses,
            vec![
                ("Zoe".to_string(), RsvpStatus::Absent),
                ("Adam".to_string(), RsvpStatus::Maybe)
            ]
        );
    }

    #[test]
    fn test_practice_candidates() {
        let mut events = vec![make_event("past", "Past", now() - Duration::days(1))];
        for i in (0..12).rev() {
            events.push(make_event(&format!("e{i}"), "Race", now() + Duration::days(i + 1)));
        }
        events.push(make_event("maybe", "Maybe", now() + Duration::hours(1)));
        let catalog = Catalog::new(events);
        let roster = roster_of(&["A"]);

        let mut cells: Vec<(String, RsvpStatus)> = catalog
            .events()
            .iter()
            .map(|e| (e.id.clone(), RsvpStatus::Available))
            .collect();
        cells.last_mut().unwrap().1 = RsvpStatus::Maybe;
        let mut rsvp = RsvpMatrix::new();
        for (id, status) in &cells {
            rsvp.set_status(&catalog, &roster, id, "A", *status).unwrap();
        }

        let candidates = practice_candidates(catalog.events(), &rsvp, "A", now());
        let ids: Vec<_> = candidates.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), PRACTICE_CANDIDATE_LIMIT);
        assert_eq!(ids[0], "e0");
        assert_eq!(ids[9], "e9");
    }
}
