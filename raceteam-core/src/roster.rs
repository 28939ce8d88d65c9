//! Team members and the roster.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a member's display name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// A team member, identified by their unique display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Member(String);

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Member(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Trim surrounding whitespace and cap the length.
    /// Returns None if nothing usable is left.
    pub fn sanitize(raw: &str) -> Option<Member> {
        let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
        let name = name.trim_end();
        if name.is_empty() {
            None
        } else {
            Some(Member(name.to_string()))
        }
    }
}

impl Borrow<str> for Member {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered members in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<Member>);

impl Roster {
    pub fn new() -> Self {
        Roster(Vec::new())
    }

    pub fn members(&self) -> &[Member] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a member. Returns false (and leaves the roster alone) if the
    /// name is already taken.
    pub fn push(&mut self, member: Member) -> bool {
        if self.contains(member.name()) {
            return false;
        }
        self.0.push(member);
        true
    }
}

impl FromIterator<Member> for Roster {
    /// Builds a roster keeping the first occurrence of each name.
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for member in iter {
            roster.push(member);
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
