//! Expense-sharing groups and membership.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splitledger_shared::types::{GroupId, UserId};

/// An expense-sharing group.
///
/// A group starts with its creator as the only member. Membership only
/// grows; removal is an external-service concern, not a ledger event.
/// Users themselves are owned by an external identity service - the core
/// stores member ids only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier for this group.
    pub id: GroupId,
    /// Human-readable group name.
    pub name: String,
    /// Member user ids, order-irrelevant.
    pub members: BTreeSet<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a new group with the creator as its sole member.
    #[must_use]
    pub fn new(name: impl Into<String>, creator: UserId) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            members: BTreeSet::from([creator]),
            created_at: Utc::now(),
        }
    }

    /// Returns true if the user is a member of this group.
    #[must_use]
    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Adds a member. Returns false if the user was already a member.
    pub fn add_member(&mut self, user: UserId) -> bool {
        self.members.insert(user)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
