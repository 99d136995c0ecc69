//! Shared state behind the mock platform.
//!
//! # Module Structure
//!
//! - `message`: posted messages and their update signal
//! - `user`: the workspace user directory
//!
//! [`PlatformState`] bundles these with the rendezvous registries. It is
//! cheap to clone; every clone sees the same data.

mod message;
mod user;

// Re-export public API
pub use message::{MessageContent, MessageRecord, MessageStore};
pub use user::{User, UserDirectory, UserProfile};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::rendezvous::{HomeChannels, PendingViews};

#[derive(Debug, Clone)]
pub struct PlatformState {
    pub team_id: String,
    pub users: UserDirectory,
    pub messages: MessageStore,
    pub pending_views: PendingViews,
    pub home: HomeChannels,
    view_seq: Arc<AtomicU64>,
}

impl PlatformState {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            users: UserDirectory::new(),
            messages: MessageStore::new(),
            pending_views: PendingViews::new(),
            home: HomeChannels::new(),
            view_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Adds a user to the directory under this team.
    pub fn register_user(&self, user: User) {
        self.users.register(user, &self.team_id);
    }

    /// Mints a view id in the platform's `V…` form.
    pub fn next_view_id(&self) -> String {
        let n = self.view_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("V{n:08}")
    }
}
