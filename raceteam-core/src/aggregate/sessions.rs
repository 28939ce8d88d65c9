//! Best-of-N session grouping.
//!
//! Events named `<base> - Session <n>` are timed instances of the same
//! race. Each group collapses to its best-attended session.

use std::collections::HashMap;

use super::available_count;
use crate::event::Event;
use crate::matrix::RsvpMatrix;
use crate::roster::Roster;

const SESSION_MARKER: &str = " - Session ";

/// One row of an event listing: the event plus derived attendance.
#[derive(Debug, Clone, PartialEq)]
pub struct EventView<'a> {
    pub event: &'a Event,
    /// Roster members available for this event
    pub available: usize,
    /// Set only on the representative of a multi-session group
    pub aggregated_attendance: Option<usize>,
    /// Set only on the representative of a multi-session group
    pub total_sessions: Option<usize>,
}

impl<'a> EventView<'a> {
    pub fn new(event: &'a Event, rsvp: &RsvpMatrix, roster: &Roster) -> Self {
        EventView {
            event,
            available: available_count(rsvp, roster, &event.id),
            aggregated_attendance: None,
            total_sessions: None,
        }
    }

    pub fn from_events(events: &[&'a Event], rsvp: &RsvpMatrix, roster: &Roster) -> Vec<Self> {
        events
            .iter()
            .map(|e| EventView::new(e, rsvp, roster))
            .collect()
    }
}

/// Base name of a numbered session, e.g. `"Race A"` for
/// `"Race A - Session 2"`.
pub fn session_base(name: &str) -> Option<&str> {
    let (base, number) = name.rsplit_once(SESSION_MARKER)?;
    let numbered = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    (numbered && !base.is_empty()).then_some(base)
}

/// Collapse every session group to the session with the strictly highest
/// availability; ties keep the earliest one in input order. The
/// representative takes the position of the group's first session.
/// Single-session groups and non-session events pass through untouched.
pub fn aggregate_sessions<'a>(views: Vec<EventView<'a>>) -> Vec<EventView<'a>> {
    let mut groups: Vec<Vec<EventView<'a>>> = Vec::new();
    let mut group_of_base: HashMap<&'a str, usize> = HashMap::new();

    for view in views {
        let event: &'a Event = view.event;
        match session_base(&event.name) {
            Some(base) => match group_of_base.get(base) {
                Some(&idx) => groups[idx].push(view),
                None => {
                    group_of_base.insert(base, groups.len());
                    groups.push(vec![view]);
                }
            },
            None => groups.push(vec![view]),
        }
    }

    groups.into_iter().filter_map(collapse).collect()
}

fn collapse(group: Vec<EventView<'_>>) -> Option<EventView<'_>> {
    let total = group.len();
    let mut sessions = group.into_iter();
    let mut best = sessions.next()?;
    if total == 1 {
        return Some(best);
    }

    for session in sessions {
        if session.available > best.available {
            best = session;
        }
    }
    best.aggregated_attendance = Some(best.available);
    best.total_sessions = Some(total);
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{now, with_available};
    use crate::event::Catalog;
    use crate::event::tests::make_event;
    use crate::roster::tests::roster_of;
    use chrono::Duration;

    fn roster() -> Roster {
        roster_of(&["m0", "m1", "m2", "m3", "m4", "m5"])
    }

    fn views_for<'a>(catalog: &'a Catalog, rsvp: &RsvpMatrix) -> Vec<EventView<'a>> {
        let events: Vec<&Event> = catalog.events().iter().collect();
        EventView::from_events(&events, rsvp, &roster())
    }

    #[test]
    fn test_session_base() {
        assert_eq!(session_base("Race A - Session 2"), Some("Race A"));
        assert_eq!(session_base("Race A - Session 12"), Some("Race A"));
        assert_eq!(session_base("Race A - Session Two"), None);
        assert_eq!(session_base("Race A - Session "), None);
        assert_eq!(session_base("Race A Session 2"), None);
        assert_eq!(session_base(" - Session 1"), None);
    }

    #[test]
    fn test_best_session_wins() {
        let catalog = Catalog::new(vec![
            make_event("s1", "Race A - Session 1", now() + Duration::days(1)),
            make_event("s2", "Race A - Session 2", now() + Duration::days(2)),
        ]);
        let roster = roster();
        let mut rsvp = RsvpMatrix::new();
        with_available(&catalog, &roster, &mut rsvp, "s1", 3);
        with_available(&catalog, &roster, &mut rsvp, "s2", 5);

        let result = aggregate_sessions(views_for(&catalog, &rsvp));

        assert_eq!(result.len(), 1);
        let rep = &result[0];
        assert_eq!(rep.event.id, "s2");
        assert_eq!(rep.event.name, "Race A - Session 2");
        assert_eq!(rep.aggregated_attendance, Some(5));
        assert_eq!(rep.total_sessions, Some(2));
    }

    #[test]
    fn test_ties_keep_first_session() {
        let catalog = Catalog::new(vec![
            make_event("s1", "Race A - Session 1", now() + Duration::days(1)),
            make_event("s2", "Race A - Session 2", now() + Duration::days(2)),
            make_event("s3", "Race A - Session 3", now() + Duration::days(3)),
        ]);
        let roster = roster();
        let mut rsvp = RsvpMatrix::new();
        with_available(&catalog, &roster, &mut rsvp, "s1", 2);
        with_available(&catalog, &roster, &mut rsvp, "s2", 4);
        with_available(&catalog, &roster, &mut rsvp, "s3", 4);

        let result = aggregate_sessions(views_for(&catalog, &rsvp));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].event.id, "s2");
        assert_eq!(result[0].total_sessions, Some(3));
    }

    #[test]
    fn test_single_sessions_and_plain_events_pass_through() {
        let catalog = Catalog::new(vec![
            make_event("plain", "Spa 6 Hours", now() + Duration::days(1)),
            make_event("b1", "Race B - Session 1", now() + Duration::days(2)),
            make_event("a1", "Race A - Session 1", now() + Duration::days(3)),
            make_event("a2", "Race A - Session 2", now() + Duration::days(4)),
        ]);
        let roster = roster();
        let mut rsvp = RsvpMatrix::new();
        with_available(&catalog, &roster, &mut rsvp, "b1", 6);
        with_available(&catalog, &roster, &mut rsvp, "a2", 1);

        let input = views_for(&catalog, &rsvp);
        let plain = input[0].clone();
        let single = input[1].clone();
        let result = aggregate_sessions(input);

        let ids: Vec<_> = result.iter().map(|v| v.event.id.as_str()).collect();
        assert_eq!(ids, vec!["plain", "b1", "a2"]);
        assert_eq!(result[0], plain);
        assert_eq!(result[1], single);
        assert_eq!(result[1].total_sessions, None);
        assert_eq!(result[1].aggregated_attendance, None);
        assert_eq!(result[2].aggregated_attendance, Some(1));
    }
}
