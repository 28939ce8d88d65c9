//! Team practice availability for the two weeks before an event.

use chrono::{Days, NaiveDate};

use super::percentage;
use crate::event::Event;
use crate::matrix::{PracticeMatrix, SlotKey};
use crate::roster::{Member, Roster};
use crate::time_slot::TimeSlot;

/// Days in the practice window, ending on the event day.
pub const PRACTICE_WINDOW_DAYS: u64 = 14;

/// The practice dates for an event on `event_date`: 13 days before it
/// through the event day itself, oldest first.
pub fn practice_window(event_date: NaiveDate) -> Vec<NaiveDate> {
    (0..PRACTICE_WINDOW_DAYS)
        .rev()
        .filter_map(|back| event_date.checked_sub_days(Days::new(back)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotAvailability<'a> {
    pub key: SlotKey,
    pub slot: &'a TimeSlot,
    pub available_members: Vec<Member>,
    /// Rounded share of the roster
    pub percentage: u32,
}

impl SlotAvailability<'_> {
    pub fn date(&self) -> NaiveDate {
        self.key.date
    }

    pub fn available_count(&self) -> usize {
        self.available_members.len()
    }
}

/// Every (date, slot) in the event's practice window with the members who
/// can make it, best-attended first. Ties go to the earlier date, then to
/// slot order. The grid is always complete, even without any data.
pub fn aggregate_practice<'a>(
    event: &Event,
    roster: &Roster,
    practice: &PracticeMatrix,
    slots: &'a [TimeSlot],
) -> Vec<SlotAvailability<'a>> {
    let mut results = Vec::with_capacity(PRACTICE_WINDOW_DAYS as usize * slots.len());

    for date in practice_window(event.start_date()) {
        for slot in slots {
            let key = SlotKey::new(date, &slot.id);
            let available_members: Vec<Member> = roster
                .iter()
                .filter(|m| practice.is_available(&event.id, m.name(), &key))
                .cloned()
                .collect();
            let percentage = percentage(available_members.len(), roster.len());

            results.push(SlotAvailability {
                key,
                slot,
                available_members,
                percentage,
            });
        }
    }

    results.sort_by(|a, b| {
        b.available_count()
            .cmp(&a.available_count())
            .then_with(|| a.date().cmp(&b.date()))
    });
    results
}
