//! Entry point tying the mock server and synthetic users together.

use botsim_core::config::HarnessConfig;
use botsim_core::store::{MessageRecord, PlatformState, User};
use botsim_core::Result;
use botsim_server::{MockServer, MockServerHandle};
use std::sync::Arc;
use tracing::info;

use crate::app_client::{AppTransport, HttpAppClient};
use crate::session::{SessionContext, UserSession};

/// A running mock platform plus the means to act as its users.
///
/// ```ignore
/// let harness = Harness::start(HarnessConfig::from_env()?).await?;
/// harness.register_user(User::new("u1"));
/// // point the application's API base URL at harness.api_base_url()
/// let mut alice = harness.user("u1");
/// alice.open_home_tab().await?;
/// ```
#[derive(Debug)]
pub struct Harness {
    ctx: Arc<SessionContext>,
    server: MockServerHandle,
}

impl Harness {
    /// Validates `config`, starts the mock server and signs outbound
    /// requests with the configured secret.
    pub async fn start(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpAppClient::from_config(&config));
        Self::start_with_transport(config, transport).await
    }

    /// Like [`start`](Self::start), delivering to the application through
    /// `transport` instead of HTTP.
    pub async fn start_with_transport(
        config: HarnessConfig,
        transport: Arc<dyn AppTransport>,
    ) -> Result<Self> {
        let platform = PlatformState::new(config.team_id.clone());
        let server = MockServer::start(platform.clone(), config.bind_addr()?).await?;
        info!(api = %server.api_base_url(), team_id = %platform.team_id, "harness started");

        let ctx = Arc::new(SessionContext {
            platform,
            transport,
            api_base_url: server.api_base_url(),
            config,
        });
        Ok(Self { ctx, server })
    }

    /// `http://<addr>/api`, the Web API root the application should call.
    pub fn api_base_url(&self) -> String {
        self.server.api_base_url()
    }

    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.ctx.config
    }

    pub fn platform(&self) -> &PlatformState {
        &self.ctx.platform
    }

    pub fn register_user(&self, user: User) {
        self.ctx.platform.register_user(user);
    }

    /// A fresh session for `user_id`.
    ///
    /// Sessions are not cached; each call starts with an empty modal stack
    /// and no home view.
    pub fn user(&self, user_id: &str) -> UserSession {
        UserSession::new(self.ctx.clone(), user_id)
    }

    /// Messages posted to `channel`, in posting order.
    pub fn messages_in(&self, channel: &str) -> Vec<Arc<MessageRecord>> {
        self.ctx.platform.messages.list(channel)
    }

    pub async fn shutdown(self) -> Result<()> {
        self.server.shutdown().await
    }
}
