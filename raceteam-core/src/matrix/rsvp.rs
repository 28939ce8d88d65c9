use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{RsvpStatus, check_cell};
use crate::error::TeamResult;
use crate::event::{Catalog, Event, EventId};
use crate::roster::{Member, Roster};

/// Stored form of the RSVP document. Older clients wrote `null` for
/// "no response", so cells are decoded leniently and mapped to `Absent`.
type RawRsvpMatrix = BTreeMap<EventId, BTreeMap<Member, Option<RsvpStatus>>>;

/// RSVP status for every (event, member) pair.
///
/// Missing cells read as [`RsvpStatus::Absent`]. [`RsvpMatrix::densify`]
/// makes them explicit so sparse data survives the next write-back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRsvpMatrix")]
pub struct RsvpMatrix(BTreeMap<EventId, BTreeMap<Member, RsvpStatus>>);

impl From<RawRsvpMatrix> for RsvpMatrix {
    fn from(raw: RawRsvpMatrix) -> Self {
        RsvpMatrix(
            raw.into_iter()
                .map(|(event_id, cells)| {
                    let cells = cells
                        .into_iter()
                        .map(|(member, status)| (member, status.unwrap_or_default()))
                        .collect();
                    (event_id, cells)
                })
                .collect(),
        )
    }
}

impl RsvpMatrix {
    pub fn new() -> Self {
        RsvpMatrix::default()
    }

    /// True when no event has any entry at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn status(&self, event_id: &str, member: &str) -> RsvpStatus {
        self.0
            .get(event_id)
            .and_then(|cells| cells.get(member))
            .copied()
            .unwrap_or_default()
    }

    /// Explicitly stored cells for one event.
    pub fn event(&self, event_id: &str) -> Option<&BTreeMap<Member, RsvpStatus>> {
        self.0.get(event_id)
    }

    pub fn event_ids(&self) -> impl Iterator<Item = &EventId> {
        self.0.keys()
    }

    /// Number of explicitly stored cells.
    pub fn cell_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Overwrite a single cell after checking the event and member exist.
    /// Returns the updated matrix.
    pub fn set_status(
        &mut self,
        catalog: &Catalog,
        roster: &Roster,
        event_id: &str,
        member: &str,
        status: RsvpStatus,
    ) -> TeamResult<&Self> {
        check_cell(catalog, roster, event_id, member)?;
        self.0
            .entry(event_id.to_string())
            .or_default()
            .insert(Member::new(member), status);
        Ok(self)
    }

    /// Fill in `Absent` for every (event, member) pair that has no entry.
    /// Existing cells, including orphans for events no longer in the
    /// catalog, are left untouched.
    pub fn densify(&self, events: &[Event], roster: &Roster) -> Self {
        let mut dense = self.clone();
        for event in events {
            let cells = dense.0.entry(event.id.clone()).or_default();
            for member in roster {
                cells.entry(member.clone()).or_default();
            }
        }
        dense
    }

    /// Plausible prior data for a brand new team: every cell drawn
    /// uniformly from the four statuses.
    pub fn seeded<R: Rng + ?Sized>(events: &[Event], roster: &Roster, rng: &mut R) -> Self {
        let mut matrix = RsvpMatrix::new();
        for event in events {
            let cells = matrix.0.entry(event.id.clone()).or_default();
            for member in roster {
                let status = RsvpStatus::ALL
                    .choose(rng)
                    .copied()
                    .unwrap_or_default();
                cells.insert(member.clone(), status);
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeamError;
    use crate::event::tests::make_event;
    use crate::roster::tests::roster_of;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog_of(ids: &[&str]) -> Catalog {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap();
        Catalog::new(ids.iter().map(|id| make_event(id, id, start)).collect())
    }

    #[test]
    fn test_densify_empty_matrix_fills_every_cell_with_absent() {
        let catalog = catalog_of(&["e1", "e2", "e3"]);
        let roster = roster_of(&["Alex", "Sarah"]);

        let dense = RsvpMatrix::new().densify(catalog.events(), &roster);

        assert_eq!(dense.cell_count(), 6);
        for event in catalog.events() {
            let cells = dense.event(&event.id).unwrap();
            assert_eq!(cells.len(), 2);
            assert!(cells.values().all(|s| *s == RsvpStatus::Absent));
        }
    }

    #[test]
    fn test_densify_is_idempotent() {
        let catalog = catalog_of(&["e1", "e2"]);
        let roster = roster_of(&["Alex", "Sarah", "Mike"]);
        let mut matrix = RsvpMatrix::new();
        matrix
            .set_status(&catalog, &roster, "e1", "Sarah", RsvpStatus::Maybe)
            .unwrap();

        let once = matrix.densify(catalog.events(), &roster);
        let twice = once.densify(catalog.events(), &roster);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_densify_keeps_existing_and_orphan_cells() {
        let roster = roster_of(&["Alex"]);
        let old_catalog = catalog_of(&["gone", "e1"]);
        let mut matrix = RsvpMatrix::new();
        matrix
            .set_status(&old_catalog, &roster, "gone", "Alex", RsvpStatus::Available)
            .unwrap();
        matrix
            .set_status(&old_catalog, &roster, "e1", "Alex", RsvpStatus::Unavailable)
            .unwrap();

        let new_catalog = catalog_of(&["e1", "e2"]);
        let dense = matrix.densify(new_catalog.events(), &roster_of(&["Alex", "Sarah"]));

        assert_eq!(dense.status("gone", "Alex"), RsvpStatus::Available);
        assert_eq!(dense.status("e1", "Alex"), RsvpStatus::Unavailable);
        assert_eq!(dense.event("e1").unwrap().get("Sarah"), Some(&RsvpStatus::Absent));
        assert_eq!(dense.event("e2").unwrap().len(), 2);
    }

    #[test]
    fn test_set_status_overwrites_single_cell() {
        let catalog = catalog_of(&["e1"]);
        let roster = roster_of(&["Alex", "Sarah"]);
        let mut matrix = RsvpMatrix::new().densify(catalog.events(), &roster);

        matrix
            .set_status(&catalog, &roster, "e1", "Alex", RsvpStatus::Available)
            .unwrap();
        let snapshot = matrix
            .set_status(&catalog, &roster, "e1", "Alex", RsvpStatus::Maybe)
            .unwrap();

        assert_eq!(snapshot.status("e1", "Alex"), RsvpStatus::Maybe);
        assert_eq!(snapshot.status("e1", "Sarah"), RsvpStatus::Absent);
    }

    #[test]
    fn test_set_status_rejects_unknown_member_and_event() {
        let catalog = catalog_of(&["e1"]);
        let roster = roster_of(&["Alex"]);
        let mut matrix = RsvpMatrix::new();

        let err = matrix
            .set_status(&catalog, &roster, "e1", "Nobody", RsvpStatus::Maybe)
            .unwrap_err();
        assert!(matches!(err, TeamError::MemberNotFound(_)));

        let err = matrix
            .set_status(&catalog, &roster, "nope", "Alex", RsvpStatus::Maybe)
            .unwrap_err();
        assert!(matches!(err, TeamError::EventNotFound(_)));

        let err = matrix
            .set_status(&catalog, &roster, "e1", "  ", RsvpStatus::Maybe)
            .unwrap_err();
        assert!(matches!(err, TeamError::Validation(_)));

        assert!(matrix.is_empty());
    }

    #[test]
    fn test_missing_cells_read_as_absent() {
        let matrix = RsvpMatrix::new();
        assert_eq!(matrix.status("e1", "Alex"), RsvpStatus::Absent);
    }

    #[test]
    fn test_null_cells_decode_as_absent() {
        let json = serde_json::json!({
            "e1": { "Alex": "available", "Sarah": null }
        });
        let matrix: RsvpMatrix = serde_json::from_value(json).unwrap();

        assert_eq!(matrix.status("e1", "Alex"), RsvpStatus::Available);
        assert_eq!(matrix.event("e1").unwrap().get("Sarah"), Some(&RsvpStatus::Absent));

        let written = serde_json::to_value(&matrix).unwrap();
        assert_eq!(written["e1"]["Sarah"], serde_json::json!("absent"));
    }

    #[test]
    fn test_free_form_status_rejected_at_boundary() {
        let json = serde_json::json!({ "e1": { "Alex": "probably" } });
        assert!(serde_json::from_value::<RsvpMatrix>(json).is_err());
    }

    #[test]
    fn test_seeded_covers_every_cell() {
        let catalog = catalog_of(&["e1", "e2"]);
        let roster = roster_of(&["Alex", "Sarah", "Mike"]);
        let mut rng = StdRng::seed_from_u64(7);

        let matrix = RsvpMatrix::seeded(catalog.events(), &roster, &mut rng);

        assert_eq!(matrix.cell_count(), 6);
        assert_eq!(matrix, matrix.densify(catalog.events(), &roster));
    }

    #[test]
    fn test_seeded_draws_every_status_eventually() {
        let events: Vec<_> = (0..50)
            .map(|i| {
                make_event(
                    &format!("e{i}"),
                    "Race",
                    Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap(),
                )
            })
            .collect();
        let roster = roster_of(&["Alex", "Sarah", "Mike", "Emma"]);
        let mut rng = StdRng::seed_from_u64(42);

        let matrix = RsvpMatrix::seeded(&events, &roster, &mut rng);

        for status in RsvpStatus::ALL {
            let seen = events
                .iter()
                .flat_map(|e| roster.iter().map(|m| matrix.status(&e.id, m.name())))
                .any(|s| s == status);
            assert!(seen, "{status:?} never drawn");
        }
    }
}
