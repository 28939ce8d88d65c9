//! Core of raceteam: event RSVP and practice availability for a sim-racing
//! team, kept in sync across a shared document store.
//!
//! - `matrix` holds per-(event, member) RSVP and practice state
//! - `aggregate` derives team views from it
//! - `sync` owns the state and keeps it in step with the `store` backends

pub mod aggregate;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod identity;
pub mod matrix;
pub mod roster;
pub mod store;
pub mod sync;
pub mod time_slot;

pub use config::TeamConfig;
pub use error::{TeamError, TeamResult};
pub use event::{Catalog, Event, EventId, EventType};
pub use identity::{IdentityError, IdentityProvider, LocalIdentity};
pub use matrix::{PracticeMatrix, RsvpMatrix, RsvpStatus, SlotKey};
pub use roster::{Member, Roster};
pub use store::{DocKey, Document, FallbackCache, RemoteStore};
pub use sync::{SyncController, SyncEvent, SyncOptions};
pub use time_slot::TimeSlot;
