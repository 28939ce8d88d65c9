//! Keeps the in-memory team state in step with the stores.
//!
//! The controller is the single owner of [`TeamState`]. Mutations apply
//! locally and return at once; the whole affected document is then queued
//! to a background writer. Write outcomes, remote change notifications and
//! refresh results all arrive as messages on one inbox and only touch the
//! state when the owner drains it with [`SyncController::next_event`],
//! [`SyncController::poll_events`] or [`SyncController::flush`].
//!
//! A remote snapshot that arrives while a local edit is still unflushed
//! replaces the edit in memory; whichever message is applied last wins.

mod state;

pub use state::{LoadState, TeamState, WriteState};

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{TeamError, TeamResult};
use crate::event::Catalog;
use crate::identity::IdentityProvider;
use crate::matrix::{PracticeMatrix, RsvpMatrix, RsvpStatus, SlotKey};
use crate::roster::Member;
use crate::store::{DocKey, Document, FallbackCache, RemoteStore, StoreResult, Subscription};
use crate::time_slot::{TimeSlot, default_time_slots};
use state::decode;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Fill an RSVP matrix that is completely empty on load with random answers
    pub seed_empty_rsvp: bool,
    pub time_slots: Vec<TimeSlot>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            seed_empty_rsvp: true,
            time_slots: default_time_slots(),
        }
    }
}

/// Something that happened to the team state in the background.
#[derive(Debug)]
pub enum SyncEvent {
    /// A remote snapshot differed from the local copy and replaced it
    RemoteAdopted(DocKey),
    /// A remote snapshot was empty or matched the local copy
    RemoteIgnored(DocKey),
    RemoteRejected { key: DocKey, reason: String },
    WriteSucceeded(DocKey),
    /// Always a [`TeamError::SyncLost`]; the local change is kept
    WriteFailed(TeamError),
    RefreshCompleted,
    /// Always a [`TeamError::Refresh`]; the local state is kept
    RefreshFailed(TeamError),
}

type Fetched = Vec<(DocKey, Option<Document>)>;

enum Inbound {
    Remote {
        key: DocKey,
        doc: Document,
    },
    WriteFinished {
        key: DocKey,
        result: Result<(), String>,
    },
    Refreshed(Result<Fetched, String>),
}

pub struct SyncController<R: RemoteStore, C: FallbackCache> {
    state: TeamState,
    options: SyncOptions,
    remote: Arc<R>,
    cache: Arc<C>,
    load_state: LoadState,
    write_state: WriteState,
    pending_writes: usize,
    refreshing: bool,
    subscriptions: Vec<Subscription>,
    writer: Option<mpsc::UnboundedSender<(DocKey, Document)>>,
    inbox_tx: mpsc::UnboundedSender<Inbound>,
    inbox: mpsc::UnboundedReceiver<Inbound>,
    backlog: VecDeque<SyncEvent>,
}

impl<R: RemoteStore, C: FallbackCache> SyncController<R, C> {
    pub fn new(catalog: Catalog, remote: Arc<R>, cache: Arc<C>, options: SyncOptions) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        SyncController {
            state: TeamState::new(catalog),
            options,
            remote,
            cache,
            load_state: LoadState::Uninitialized,
            write_state: WriteState::Idle,
            pending_writes: 0,
            refreshing: false,
            subscriptions: Vec::new(),
            writer: None,
            inbox_tx,
            inbox,
            backlog: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &TeamState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn rsvp(&self) -> &RsvpMatrix {
        &self.state.rsvp
    }

    pub fn practice(&self) -> &PracticeMatrix {
        &self.state.practice
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.options.time_slots
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn write_state(&self) -> WriteState {
        self.write_state
    }

    pub fn pending_writes(&self) -> usize {
        self.pending_writes
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Fetch all three documents, fall back to the local cache for any the
    /// remote cannot provide, densify, then start listening for changes.
    ///
    /// Never fails: every degradation is logged and returned as a warning.
    /// Must run inside a Tokio runtime. Calling it again is a no-op.
    pub async fn load(&mut self) -> Vec<TeamError> {
        if self.load_state != LoadState::Uninitialized {
            return Vec::new();
        }
        self.load_state = LoadState::Loading;
        self.spawn_writer();
        info!("Loading team data");

        let fetched = fetch_all(self.remote.as_ref()).await;

        let mut warnings = Vec::new();
        let mut write_back = Vec::new();
        // Only an RSVP document that is confirmed absent everywhere may be
        // seeded; unreadable or undecodable data still counts as data.
        let mut rsvp_blank = true;
        for (key, result) in DocKey::ALL.into_iter().zip(fetched) {
            let degraded = result.is_err();
            let doc = self.resolve(key, result, &mut warnings, &mut write_back);
            if key == DocKey::Rsvp && (degraded || doc.is_some()) {
                rsvp_blank = false;
            }
            let Some(doc) = doc else {
                continue;
            };
            if let Err(e) = self.install(key, doc) {
                warn!("Ignoring unreadable {key} document: {e}");
                warnings.push(e);
                write_back.retain(|k| *k != key);
            }
        }

        if rsvp_blank && self.should_seed() {
            info!(
                "RSVP matrix is empty, seeding {} events for {} members",
                self.state.catalog.len(),
                self.state.roster.len()
            );
            self.state.rsvp = RsvpMatrix::seeded(
                self.state.catalog.events(),
                &self.state.roster,
                &mut rand::thread_rng(),
            );
            if !write_back.contains(&DocKey::Rsvp) {
                write_back.push(DocKey::Rsvp);
            }
        }

        self.state.densify();
        self.subscribe_all();
        self.load_state = LoadState::Ready;
        info!(
            "Team data ready: {} members, {} events",
            self.state.roster.len(),
            self.state.catalog.len()
        );

        for key in write_back {
            self.schedule_write(key);
        }
        warnings
    }

    /// Pick the document to start from: the remote copy when it has one,
    /// otherwise the cached copy.
    fn resolve(
        &self,
        key: DocKey,
        result: StoreResult<Option<Document>>,
        warnings: &mut Vec<TeamError>,
        write_back: &mut Vec<DocKey>,
    ) -> Option<Document> {
        match result {
            Ok(doc) => {
                if let Some(doc) = doc.filter(|d| !is_empty_document(d)) {
                    self.cache.set(key, &doc);
                    return Some(doc);
                }
                let cached = self.cache.get(key).filter(|d| !is_empty_document(d))?;
                info!("Remote {key} is empty, restoring it from the local copy");
                write_back.push(key);
                Some(cached)
            }
            Err(e) => {
                warn!("Could not load {key} from the remote store, using the local copy: {e}");
                warnings.push(TeamError::SyncDegraded {
                    key,
                    reason: e.to_string(),
                });
                self.cache.get(key)
            }
        }
    }

    fn install(&mut self, key: DocKey, doc: Document) -> TeamResult<()> {
        match key {
            DocKey::Roster => self.state.roster = decode(key, doc)?,
            DocKey::Rsvp => self.state.rsvp = decode(key, doc)?,
            DocKey::Practice => self.state.practice = decode(key, doc)?,
        }
        Ok(())
    }

    fn should_seed(&self) -> bool {
        self.options.seed_empty_rsvp
            && self.state.rsvp.is_empty()
            && !self.state.catalog.is_empty()
            && !self.state.roster.is_empty()
    }

    fn subscribe_all(&mut self) {
        for key in DocKey::ALL {
            let inbox = self.inbox_tx.clone();
            let subscription = self.remote.subscribe(
                key,
                Box::new(move |doc| {
                    let _ = inbox.send(Inbound::Remote { key, doc });
                }),
            );
            self.subscriptions.push(subscription);
        }
    }

    /// Writes run one at a time, in the order they were queued.
    fn spawn_writer(&mut self) {
        if self.writer.is_some() {
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(DocKey, Document)>();
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);
        let inbox = self.inbox_tx.clone();

        tokio::spawn(async move {
            while let Some((key, doc)) = rx.recv().await {
                let result = remote.set(key, doc.clone()).await.map_err(|e| e.to_string());
                let cache = Arc::clone(&cache);
                if let Err(e) = tokio::task::spawn_blocking(move || cache.set(key, &doc)).await {
                    warn!("Could not update the local copy of {key}: {e}");
                }
                if inbox.send(Inbound::WriteFinished { key, result }).is_err() {
                    break;
                }
            }
        });

        self.writer = Some(tx);
    }

    fn ensure_ready(&self) -> TeamResult<()> {
        if self.load_state == LoadState::Ready {
            Ok(())
        } else {
            Err(TeamError::NotReady)
        }
    }

    /// Record one member's answer for one event. The change is visible
    /// immediately; the RSVP document is written in the background.
    pub fn set_rsvp(
        &mut self,
        event_id: &str,
        member: &str,
        status: RsvpStatus,
    ) -> TeamResult<&RsvpMatrix> {
        self.ensure_ready()?;
        let state = &mut self.state;
        state
            .rsvp
            .set_status(&state.catalog, &state.roster, event_id, member, status)?;
        debug!("{member} is {status} for {event_id}");

        self.schedule_write(DocKey::Rsvp);
        Ok(&self.state.rsvp)
    }

    /// Mark one practice slot for one member, keeping their other slots.
    pub fn set_practice_availability(
        &mut self,
        event_id: &str,
        member: &str,
        slot: SlotKey,
        available: bool,
    ) -> TeamResult<&PracticeMatrix> {
        self.ensure_ready()?;
        let state = &mut self.state;
        state.practice.set_slot(
            &state.catalog,
            &state.roster,
            &self.options.time_slots,
            event_id,
            member,
            slot,
            available,
        )?;

        self.schedule_write(DocKey::Practice);
        Ok(&self.state.practice)
    }

    /// Add a new member through the identity provider and give them an
    /// empty answer for every event.
    pub fn register<I: IdentityProvider + ?Sized>(
        &mut self,
        identity: &mut I,
        username: &str,
    ) -> TeamResult<Member> {
        self.ensure_ready()?;
        let member = identity.register(&self.state.roster, username)?;

        self.state.roster.push(member.clone());
        self.state.densify();
        info!("Registered {member}");

        self.schedule_write(DocKey::Roster);
        self.schedule_write(DocKey::Rsvp);
        Ok(member)
    }

    pub fn sign_in<I: IdentityProvider + ?Sized>(
        &self,
        identity: &mut I,
        username: &str,
    ) -> TeamResult<Member> {
        self.ensure_ready()?;
        Ok(identity.sign_in(&self.state.roster, username)?)
    }

    fn schedule_write(&mut self, key: DocKey) {
        let doc = match self.state.document(key) {
            Ok(doc) => doc,
            Err(e) => {
                let event = self.write_lost(key, e.to_string());
                self.backlog.push_back(event);
                return;
            }
        };

        let queued = match &self.writer {
            Some(writer) => writer.send((key, doc.clone())).is_ok(),
            None => false,
        };
        if !queued {
            self.cache.set(key, &doc);
            let event = self.write_lost(key, "background writer is not running".into());
            self.backlog.push_back(event);
            return;
        }

        self.pending_writes += 1;
        self.write_state = WriteState::Writing;
        debug!("Queued write of {key} ({} pending)", self.pending_writes);
    }

    fn write_lost(&mut self, key: DocKey, reason: String) -> SyncEvent {
        warn!("Changes to {key} were saved locally but could not be synchronized: {reason}");
        self.write_state = WriteState::WriteFailed;
        SyncEvent::WriteFailed(TeamError::SyncLost { key, reason })
    }

    /// Re-fetch all three documents from the remote store in the
    /// background. The result arrives as a [`SyncEvent`].
    pub fn begin_refresh(&mut self) -> TeamResult<()> {
        self.ensure_ready()?;
        if self.refreshing {
            return Err(TeamError::RefreshInProgress);
        }
        self.refreshing = true;
        debug!("Refreshing team data");

        let remote = Arc::clone(&self.remote);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let fetched = fetch_all(remote.as_ref()).await;
            let result = DocKey::ALL
                .into_iter()
                .zip(fetched)
                .map(|(key, result)| {
                    result
                        .map(|doc| (key, doc))
                        .map_err(|e| format!("{key}: {e}"))
                })
                .collect();
            let _ = inbox.send(Inbound::Refreshed(result));
        });
        Ok(())
    }

    /// Refresh and wait for the outcome. Other background events that
    /// arrive meanwhile are kept for the next drain.
    pub async fn refresh(&mut self) -> TeamResult<()> {
        self.begin_refresh()?;

        while let Some(inbound) = self.inbox.recv().await {
            let finished = matches!(inbound, Inbound::Refreshed(_));
            let event = self.handle(inbound);
            if finished {
                return match event {
                    SyncEvent::RefreshFailed(e) => Err(e),
                    _ => Ok(()),
                };
            }
            self.backlog.push_back(event);
        }
        Err(TeamError::Refresh("sync inbox closed".into()))
    }

    /// Wait for the next background event and apply it.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        if let Some(event) = self.backlog.pop_front() {
            self.delivered(std::slice::from_ref(&event));
            return Some(event);
        }
        let inbound = self.inbox.recv().await?;
        let event = self.handle(inbound);
        self.delivered(std::slice::from_ref(&event));
        Some(event)
    }

    /// Apply every background event that has already arrived.
    pub fn poll_events(&mut self) -> Vec<SyncEvent> {
        let mut events: Vec<SyncEvent> = self.backlog.drain(..).collect();
        while let Ok(inbound) = self.inbox.try_recv() {
            events.push(self.handle(inbound));
        }
        self.delivered(&events);
        events
    }

    /// Wait until every queued write has finished.
    pub async fn flush(&mut self) -> Vec<SyncEvent> {
        let mut events: Vec<SyncEvent> = self.backlog.drain(..).collect();
        while self.pending_writes > 0 {
            match self.inbox.recv().await {
                Some(inbound) => events.push(self.handle(inbound)),
                None => break,
            }
        }
        events.extend(self.poll_events());
        self.delivered(&events);
        events
    }

    /// A write failure stays visible in [`WriteState::WriteFailed`] until
    /// it has been handed to the owner.
    fn delivered(&mut self, events: &[SyncEvent]) {
        if self.write_state == WriteState::WriteFailed
            && events.iter().any(|e| matches!(e, SyncEvent::WriteFailed(_)))
        {
            self.write_state = if self.pending_writes > 0 {
                WriteState::Writing
            } else {
                WriteState::Idle
            };
        }
    }

    /// Stop listening for remote changes.
    pub fn close(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.remote.unsubscribe(&subscription);
        }
    }

    fn handle(&mut self, inbound: Inbound) -> SyncEvent {
        match inbound {
            Inbound::Remote { key, doc } => self.adopt_remote(key, doc),
            Inbound::WriteFinished { key, result } => self.finish_write(key, result),
            Inbound::Refreshed(result) => self.finish_refresh(result),
        }
    }

    fn adopt_remote(&mut self, key: DocKey, doc: Document) -> SyncEvent {
        if is_empty_document(&doc) {
            return SyncEvent::RemoteIgnored(key);
        }

        match self.state.adopt(key, doc.clone()) {
            Ok(true) => {
                info!("Adopted remote change to {key}");
                self.cache.set(key, &doc);
                SyncEvent::RemoteAdopted(key)
            }
            Ok(false) => SyncEvent::RemoteIgnored(key),
            Err(e) => {
                warn!("Ignoring remote {key} change: {e}");
                SyncEvent::RemoteRejected {
                    key,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn finish_write(&mut self, key: DocKey, result: Result<(), String>) -> SyncEvent {
        self.pending_writes = self.pending_writes.saturating_sub(1);
        match result {
            Ok(()) => {
                debug!("Wrote {key}");
                if self.pending_writes == 0 && self.write_state == WriteState::Writing {
                    self.write_state = WriteState::Idle;
                }
                SyncEvent::WriteSucceeded(key)
            }
            Err(reason) => self.write_lost(key, reason),
        }
    }

    fn finish_refresh(&mut self, result: Result<Fetched, String>) -> SyncEvent {
        self.refreshing = false;
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(reason) => return refresh_failed(reason),
        };

        // Decode everything before touching the live state so a bad
        // document leaves it unchanged.
        let mut next = self.state.clone();
        let mut received = Vec::new();
        for (key, doc) in fetched {
            let Some(doc) = doc.filter(|d| !is_empty_document(d)) else {
                continue;
            };
            if let Err(e) = next.adopt(key, doc.clone()) {
                return refresh_failed(e.to_string());
            }
            received.push((key, doc));
        }

        for (key, doc) in &received {
            self.cache.set(*key, doc);
        }
        self.state = next;
        info!("Refreshed team data");
        SyncEvent::RefreshCompleted
    }
}

impl<R: RemoteStore, C: FallbackCache> Drop for SyncController<R, C> {
    fn drop(&mut self) {
        self.close();
    }
}

fn refresh_failed(reason: String) -> SyncEvent {
    warn!("Refresh failed, keeping current data: {reason}");
    SyncEvent::RefreshFailed(TeamError::Refresh(reason))
}

async fn fetch_all<R: RemoteStore>(remote: &R) -> [StoreResult<Option<Document>>; 3] {
    let (roster, rsvp, practice) = tokio::join!(
        remote.get(DocKey::Roster),
        remote.get(DocKey::Rsvp),
        remote.get(DocKey::Practice),
    );
    [roster, rsvp, practice]
}

/// Null, `{}` and `[]` all mean "nothing stored yet".
fn is_empty_document(doc: &Document) -> bool {
    match doc {
        Document::Null => true,
        Document::Object(map) => map.is_empty(),
        Document::Array(items) => items.is_empty(),
        _ => false,
    }
}
