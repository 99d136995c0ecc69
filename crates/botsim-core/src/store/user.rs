//! Workspace user directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// A member of the emulated workspace, shaped like a `users.info` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub tz: String,
    #[serde(default)]
    pub profile: UserProfile,
}

impl User {
    /// A user whose handle and display names all equal `id`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            real_name: id.clone(),
            tz: "UTC".to_string(),
            profile: UserProfile {
                display_name: id.clone(),
                real_name: id.clone(),
                email: String::new(),
            },
            id,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = name.clone();
        self.profile.display_name = name;
        self
    }

    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        let real_name = real_name.into();
        self.real_name = real_name.clone();
        self.profile.real_name = real_name;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.profile.email = email.into();
        self
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

/// Registered users by id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Arc<Mutex<BTreeMap<String, User>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user; an empty `team_id` is filled with `team_id`.
    pub fn register(&self, mut user: User, team_id: &str) {
        if user.team_id.is_empty() {
            user.team_id = team_id.to_string();
        }
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id.clone(), user);
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn list(&self) -> Vec<User> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
