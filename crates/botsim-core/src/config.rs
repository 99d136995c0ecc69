//! Harness configuration.
//!
//! Loaded from TOML (`~/.config/botsim/config.toml` by default) and/or
//! `BOTSIM_*` environment variables, then adjusted with `with_*` overrides:
//!
//! ```toml
//! events_url = "http://127.0.0.1:3000/slack/events"
//! actions_url = "http://127.0.0.1:3000/slack/actions"
//! signing_secret = "test-secret"
//! team_id = "test_team_id"
//! modal_timeout_ms = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BotsimError, Result};

pub const DEFAULT_TEAM_ID: &str = "test_team_id";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:0";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

const ENV_PREFIX: &str = "BOTSIM_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Where lifecycle events (`app_home_opened`, ...) are POSTed.
    pub events_url: String,
    /// Where interaction callbacks are POSTed.
    pub actions_url: String,
    pub signing_secret: String,
    pub team_id: String,
    /// Mock server listen address; port 0 picks a free port.
    pub bind_address: String,
    pub home_timeout_ms: u64,
    pub modal_timeout_ms: u64,
    pub message_timeout_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            events_url: String::new(),
            actions_url: String::new(),
            signing_secret: String::new(),
            team_id: DEFAULT_TEAM_ID.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            home_timeout_ms: DEFAULT_TIMEOUT_MS,
            modal_timeout_ms: DEFAULT_TIMEOUT_MS,
            message_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HarnessConfig {
    pub fn new(
        events_url: impl Into<String>,
        actions_url: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        Self {
            events_url: events_url.into(),
            actions_url: actions_url.into(),
            signing_secret: signing_secret.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BotsimError::Io {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overlaid with `BOTSIM_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::default().overlay_env(lookup)
    }

    /// The default config file if it exists, then environment overrides.
    pub fn load() -> Result<Self> {
        let path = default_config_file()?;
        let base = if path.exists() {
            tracing::debug!(path = %path.display(), "loading harness config");
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.overlay_env(|key| std::env::var(key).ok())
    }

    fn overlay_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let millis = |name: &str| -> Result<Option<u64>> {
            var(name)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|e| {
                        BotsimError::config(format!("{ENV_PREFIX}{name}={raw:?}: {e}"))
                    })
                })
                .transpose()
        };

        if let Some(v) = var("EVENTS_URL") {
            self.events_url = v;
        }
        if let Some(v) = var("ACTIONS_URL") {
            self.actions_url = v;
        }
        if let Some(v) = var("SIGNING_SECRET") {
            self.signing_secret = v;
        }
        if let Some(v) = var("TEAM_ID") {
            self.team_id = v;
        }
        if let Some(v) = var("BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = millis("HOME_TIMEOUT_MS")? {
            self.home_timeout_ms = v;
        }
        if let Some(v) = millis("MODAL_TIMEOUT_MS")? {
            self.modal_timeout_ms = v;
        }
        if let Some(v) = millis("MESSAGE_TIMEOUT_MS")? {
            self.message_timeout_ms = v;
        }
        Ok(self)
    }

    pub fn with_team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = team_id.into();
        self
    }

    pub fn with_bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.bind_address = bind_address.into();
        self
    }

    /// Sets the home, modal and message timeouts at once.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let ms = timeout.as_millis() as u64;
        self.home_timeout_ms = ms;
        self.modal_timeout_ms = ms;
        self.message_timeout_ms = ms;
        self
    }

    pub fn with_home_timeout(mut self, timeout: Duration) -> Self {
        self.home_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_modal_timeout(mut self, timeout: Duration) -> Self {
        self.modal_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn home_timeout(&self) -> Duration {
        Duration::from_millis(self.home_timeout_ms)
    }

    pub fn modal_timeout(&self) -> Duration {
        Duration::from_millis(self.modal_timeout_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .map_err(|e| BotsimError::config(format!("bind_address {:?}: {e}", self.bind_address)))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("events_url", &self.events_url),
            ("actions_url", &self.actions_url),
            ("signing_secret", &self.signing_secret),
            ("team_id", &self.team_id),
        ] {
            if value.trim().is_empty() {
                return Err(BotsimError::config(format!("{name} must not be empty")));
            }
        }
        for (name, value) in [("events_url", &self.events_url), ("actions_url", &self.actions_url)] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(BotsimError::config(format!(
                    "{name} must be an http(s) URL, got {value:?}"
                )));
            }
        }
        self.bind_addr()?;
        Ok(())
    }
}

/// `<config dir>/botsim/config.toml`.
pub fn default_config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("botsim").join("config.toml"))
        .ok_or_else(|| BotsimError::config("cannot determine config directory"))
}
