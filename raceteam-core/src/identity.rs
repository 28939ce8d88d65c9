//! Who is using this machine.
//!
//! Passwords and credential storage live elsewhere; an identity provider
//! only decides whether a name may join or sign in, and remembers the
//! signed-in member.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::roster::{Member, Roster};

/// Sessions older than this are discarded.
pub const SESSION_DAYS: i64 = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("'{0}' is already on the team. Sign in instead")]
    DuplicateName(String),

    #[error("Invalid username: '{0}'")]
    InvalidName(String),

    #[error("'{0}' is not on the team. Register first")]
    NotFound(String),
}

pub trait IdentityProvider {
    /// Validate a new name against the roster and sign it in.
    /// The caller adds the returned member to the roster.
    fn register(&mut self, roster: &Roster, username: &str) -> Result<Member, IdentityError>;

    fn sign_in(&mut self, roster: &Roster, username: &str) -> Result<Member, IdentityError>;

    fn sign_out(&mut self);

    /// The signed-in member, if the session is still valid.
    fn current(&self) -> Option<&Member>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub member: Member,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.signed_in_at + Duration::days(SESSION_DAYS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// Identity provider that keeps the session on this machine, optionally
/// persisted to a JSON file so it outlives the process.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    session: Option<Session>,
    session_file: Option<PathBuf>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        LocalIdentity::default()
    }

    /// Restore the session stored at `path`. A missing, unreadable or
    /// expired session starts signed out.
    pub fn load(path: &Path) -> Self {
        let mut identity = LocalIdentity {
            session: None,
            session_file: Some(path.to_path_buf()),
        };

        if let Some(session) = read_session(path) {
            if session.is_expired(Utc::now()) {
                debug!("Session for {} expired", session.member);
                identity.clear_file();
            } else {
                identity.session = Some(session);
            }
        }
        identity
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The signed-in member as of `now`.
    pub fn current_at(&self, now: DateTime<Utc>) -> Option<&Member> {
        self.session
            .as_ref()
            .filter(|s| !s.is_expired(now))
            .map(|s| &s.member)
    }

    fn start_session(&mut self, member: Member, now: DateTime<Utc>) {
        let session = Session {
            member,
            signed_in_at: now,
        };
        self.save(&session);
        self.session = Some(session);
    }

    fn save(&self, session: &Session) {
        let Some(path) = &self.session_file else {
            return;
        };

        let result = serde_json::to_string_pretty(session)
            .map_err(std::io::Error::from)
            .and_then(|content| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, content)
            });

        if let Err(e) = result {
            warn!("Could not save session to {}: {e}", path.display());
        }
    }

    fn clear_file(&self) {
        if let Some(path) = &self.session_file
            && path.exists()
            && let Err(e) = std::fs::remove_file(path)
        {
            warn!("Could not remove session file {}: {e}", path.display());
        }
    }
}

fn read_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {e}", path.display());
            None
        }
    }
}

impl IdentityProvider for LocalIdentity {
    fn register(&mut self, roster: &Roster, username: &str) -> Result<Member, IdentityError> {
        let member =
            Member::sanitize(username).ok_or_else(|| IdentityError::InvalidName(username.into()))?;

        if roster.contains(member.name()) {
            return Err(IdentityError::DuplicateName(member.name().to_string()));
        }

        self.start_session(member.clone(), Utc::now());
        Ok(member)
    }

    fn sign_in(&mut self, roster: &Roster, username: &str) -> Result<Member, IdentityError> {
        let member =
            Member::sanitize(username).ok_or_else(|| IdentityError::InvalidName(username.into()))?;

        if !roster.contains(member.name()) {
            return Err(IdentityError::NotFound(member.name().to_string()));
        }

        self.start_session(member.clone(), Utc::now());
        Ok(member)
    }

    fn sign_out(&mut self) {
        self.session = None;
        self.clear_file();
    }

    fn current(&self) -> Option<&Member> {
        self.current_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::tests::roster_of;

    #[test]
    fn test_register_sanitizes_and_signs_in() {
        let mut identity = LocalIdentity::new();
        let roster = roster_of(&["Alex"]);

        let member = identity.register(&roster, "  Sarah  ").unwrap();
        assert_eq!(member, Member::new("Sarah"));
        assert_eq!(identity.current(), Some(&member));
    }

    #[test]
    fn test_register_rejects_duplicates_and_blank_names() {
        let mut identity = LocalIdentity::new();
        let roster = roster_of(&["Alex"]);

        assert_eq!(
            identity.register(&roster, " Alex "),
            Err(IdentityError::DuplicateName("Alex".into()))
        );
        assert_eq!(
            identity.register(&roster, "   "),
            Err(IdentityError::InvalidName("   ".into()))
        );
        assert!(identity.current().is_none());
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut identity = LocalIdentity::new();
        let long = "x".repeat(80);

        let member = identity.register(&Roster::new(), &long).unwrap();
        assert_eq!(member.name().chars().count(), crate::roster::MAX_NAME_LEN);
    }

    #[test]
    fn test_sign_in_requires_roster_membership() {
        let mut identity = LocalIdentity::new();
        let roster = roster_of(&["Alex"]);

        assert_eq!(
            identity.sign_in(&roster, "Jordan"),
            Err(IdentityError::NotFound("Jordan".into()))
        );
        assert_eq!(identity.sign_in(&roster, "Alex").unwrap(), Member::new("Alex"));

        identity.sign_out();
        assert!(identity.current().is_none());
    }

    #[test]
    fn test_session_expires_after_seven_days() {
        let mut identity = LocalIdentity::new();
        identity.sign_in(&roster_of(&["Alex"]), "Alex").unwrap();
        let signed_in_at = identity.session().unwrap().signed_in_at;

        assert!(identity.current_at(signed_in_at + Duration::days(7)).is_some());
        assert!(identity.current_at(signed_in_at + Duration::days(8)).is_none());
    }

    #[test]
    fn test_session_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/session.json");

        let mut identity = LocalIdentity::load(&path);
        assert!(identity.current().is_none());
        identity.sign_in(&roster_of(&["Alex"]), "Alex").unwrap();

        let restored = LocalIdentity::load(&path);
        assert_eq!(restored.current(), Some(&Member::new("Alex")));

        let mut restored = restored;
        restored.sign_out();
        assert!(!path.exists());
        assert!(LocalIdentity::load(&path).current().is_none());
    }

    #[test]
    fn test_expired_session_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let stale = Session {
            member: Member::new("Alex"),
            signed_in_at: Utc::now() - Duration::days(30),
        };
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let identity = LocalIdentity::load(&path);
        assert!(identity.current().is_none());
        assert!(!path.exists());
    }
}
