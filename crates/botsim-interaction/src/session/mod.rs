//! Synthetic user sessions.
//!
//! # Module Structure
//!
//! - `user`: [`UserSession`], one user's home tab, modal stack and messages
//! - `message`: [`MessageView`] and [`Messages`], per-message pages
//! - `actions`: [`SessionActions`], the `ActionHandler` that dispatches
//!   clicks and submissions and applies their effect on the modal stack
//!
//! Sessions are not cached. Every session built for a user id shares that
//! user's messages and home queue through the [`PlatformState`] but owns its
//! own modal stack and current page.

mod actions;
mod message;
mod user;

// Re-export public API
pub use actions::{MessageOrigin, SessionActions};
pub use message::{MessageView, Messages};
pub use user::UserSession;

use botsim_core::block::Block;
use botsim_core::config::HarnessConfig;
use botsim_core::store::{PlatformState, User};
use botsim_core::view::View;
use std::fmt;
use std::sync::Arc;

use crate::app_client::AppTransport;

/// Everything a session needs from the harness.
#[derive(Clone)]
pub struct SessionContext {
    pub platform: PlatformState,
    pub transport: Arc<dyn AppTransport>,
    pub config: HarnessConfig,
    /// `http://<addr>/api` of the mock server.
    pub api_base_url: String,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("team_id", &self.platform.team_id)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// The directory record for `user_id`, or a default one if unregistered.
    pub fn user(&self, user_id: &str) -> User {
        self.platform.users.get(user_id).unwrap_or_else(|| User {
            team_id: self.platform.team_id.clone(),
            ..User::new(user_id)
        })
    }

    pub fn response_url(&self, channel: &str, ts: &str) -> String {
        format!("{}/response_url/{channel}/{ts}", self.api_base_url)
    }
}

/// A session's home view and open modals, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ViewStack {
    pub home: Option<View>,
    pub modals: Vec<View>,
}

impl ViewStack {
    pub fn depth(&self) -> usize {
        self.modals.len()
    }

    pub fn top(&self) -> Option<&View> {
        self.modals.last()
    }

    pub fn push(&mut self, view: View) {
        self.modals.push(view);
    }

    pub fn pop(&mut self) -> Option<View> {
        self.modals.pop()
    }

    /// Replaces the top modal, or opens one if none is open.
    pub fn replace_top(&mut self, view: View) {
        match self.modals.last_mut() {
            Some(top) => *top = view,
            None => self.modals.push(view),
        }
    }

    pub fn clear(&mut self) {
        self.modals.clear();
    }

    /// The tree the user currently sees: the top modal, else the home tab.
    pub fn active_blocks(&self) -> Option<Vec<Block>> {
        self.top()
            .or(self.home.as_ref())
            .map(|view| view.blocks.clone())
    }
}
