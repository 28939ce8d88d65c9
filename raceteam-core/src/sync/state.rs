//! In-memory team state owned by the sync controller.

use serde::de::DeserializeOwned;

use crate::error::{TeamError, TeamResult};
use crate::event::Catalog;
use crate::matrix::{PracticeMatrix, RsvpMatrix};
use crate::roster::Roster;
use crate::store::{DocKey, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Idle,
    /// At least one document write is in flight
    Writing,
    /// A write failed and the failure has not been drained yet
    WriteFailed,
}

/// Everything the team views are computed from.
#[derive(Debug, Clone, Default)]
pub struct TeamState {
    pub catalog: Catalog,
    pub roster: Roster,
    pub rsvp: RsvpMatrix,
    pub practice: PracticeMatrix,
}

impl TeamState {
    pub fn new(catalog: Catalog) -> Self {
        TeamState {
            catalog,
            ..TeamState::default()
        }
    }

    /// Give every catalog event and roster member an explicit RSVP cell.
    pub fn densify(&mut self) {
        self.rsvp = self.rsvp.densify(self.catalog.events(), &self.roster);
    }

    /// The whole document for `key` as it is written to the stores.
    pub fn document(&self, key: DocKey) -> TeamResult<Document> {
        let value = match key {
            DocKey::Roster => serde_json::to_value(&self.roster),
            DocKey::Rsvp => serde_json::to_value(&self.rsvp),
            DocKey::Practice => serde_json::to_value(&self.practice),
        };
        value.map_err(|e| TeamError::Serialization(format!("{key}: {e}")))
    }

    /// Replace one document with a snapshot if it differs from what is held.
    /// RSVP snapshots are densified first so a sparse copy of the same data
    /// does not count as a change. Returns whether anything was replaced.
    pub fn adopt(&mut self, key: DocKey, doc: Document) -> TeamResult<bool> {
        match key {
            DocKey::Roster => {
                let roster: Roster = decode(key, doc)?;
                if roster == self.roster {
                    return Ok(false);
                }
                self.roster = roster;
                self.densify();
            }
            DocKey::Rsvp => {
                let rsvp = decode::<RsvpMatrix>(key, doc)?
                    .densify(self.catalog.events(), &self.roster);
                if rsvp == self.rsvp {
                    return Ok(false);
                }
                self.rsvp = rsvp;
            }
            DocKey::Practice => {
                let practice: PracticeMatrix = decode(key, doc)?;
                if practice == self.practice {
                    return Ok(false);
                }
                self.practice = practice;
            }
        }
        Ok(true)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(key: DocKey, doc: Document) -> TeamResult<T> {
    serde_json::from_value(doc).map_err(|e| TeamError::Serialization(format!("{key}: {e}")))
}
