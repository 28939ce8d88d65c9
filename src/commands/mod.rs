pub mod auth;
pub mod config;
pub mod events;
pub mod practice;
pub mod rsvp;
pub mod team;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use raceteam_core::store::{DirStore, FileCache};
use raceteam_core::{
    Catalog, IdentityProvider, LocalIdentity, Member, SyncController, SyncEvent, SyncOptions,
    TeamConfig,
};

use tracing::debug;

use crate::render::render_warning;
use crate::utils::tui::create_spinner;

/// Everything a command needs: loaded team data and who is signed in.
pub struct Team {
    pub config: TeamConfig,
    pub sync: SyncController<DirStore, FileCache>,
    pub identity: LocalIdentity,
}

impl Team {
    pub async fn open() -> Result<Team> {
        let config = TeamConfig::load()?;

        let catalog_path = config.catalog_path();
        let catalog = Catalog::load(&catalog_path).with_context(|| {
            format!(
                "No event catalog. Put the team's events.json at {} or set `catalog` in {}",
                catalog_path.display(),
                TeamConfig::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".into())
            )
        })?;

        let remote = Arc::new(DirStore::new(config.data_path()));
        let cache = Arc::new(FileCache::new(config.cache_path()));
        let options = SyncOptions {
            seed_empty_rsvp: config.seed_empty_rsvp,
            time_slots: config.time_slots.clone(),
        };
        let mut sync = SyncController::new(catalog, remote, cache, options);

        let spinner = create_spinner("Loading team data".into());
        let warnings = sync.load().await;
        spinner.finish_and_clear();

        for warning in &warnings {
            eprintln!("{}", render_warning(warning));
        }

        let identity = LocalIdentity::load(&config.session_path());
        debug!(
            "Opened team data at {} ({} events)",
            config.data_path().display(),
            sync.catalog().len()
        );

        Ok(Team {
            config,
            sync,
            identity,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.config.timezone()
    }

    /// The member to act as: the one named on the command line, else the
    /// signed-in member.
    pub fn member(&self, explicit: Option<&str>) -> Result<Member> {
        if let Some(name) = explicit {
            return Ok(Member::new(name.trim()));
        }

        match self.identity.current() {
            Some(member) => Ok(member.clone()),
            None => anyhow::bail!(
                "Not signed in.\n\n\
                Sign in with:\n  \
                raceteam sign-in <name>\n\n\
                Or join the team with:\n  \
                raceteam register <name>"
            ),
        }
    }

    /// Wait for queued writes and report any that did not reach the
    /// shared store.
    pub async fn finish(&mut self) {
        let spinner = (self.sync.pending_writes() > 0).then(|| create_spinner("Saving".into()));
        let events = self.sync.flush().await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        for event in &events {
            if let SyncEvent::WriteFailed(e) = event {
                eprintln!("{}", render_warning(e));
            }
        }
        self.sync.close();
    }
}
