//! Outbound delivery of events and interactions to the application.

use async_trait::async_trait;
use botsim_core::config::HarnessConfig;
use botsim_core::signature::{SIGNATURE_HEADER, Signer, TIMESTAMP_HEADER};
use botsim_core::{BotsimError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::payload::{EventEnvelope, InteractionPayload};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the application answered synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppResponse {
    pub status: u16,
    pub body: String,
}

/// Delivers signed requests to the application under test.
#[async_trait]
pub trait AppTransport: Send + Sync {
    async fn push_event(&self, envelope: &EventEnvelope) -> Result<AppResponse>;

    async fn send_interaction(&self, payload: &InteractionPayload) -> Result<AppResponse>;
}

/// Maps a client-side failure to a transport error.
pub fn transport_error(err: reqwest::Error) -> BotsimError {
    BotsimError::transport(err.status().map(|s| s.as_u16()), err.to_string())
}

/// `AppTransport` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAppClient {
    client: Client,
    events_url: String,
    actions_url: String,
    signer: Signer,
}

impl HttpAppClient {
    pub fn new(
        events_url: impl Into<String>,
        actions_url: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            events_url: events_url.into(),
            actions_url: actions_url.into(),
            signer: Signer::new(signing_secret),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            config.events_url.clone(),
            config.actions_url.clone(),
            config.signing_secret.clone(),
        )
    }

    async fn post_signed(&self, url: &str, content_type: &str, body: String) -> Result<AppResponse> {
        let signed = self.signer.sign_now(body.as_bytes())?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header(TIMESTAMP_HEADER, &signed.timestamp)
            .header(SIGNATURE_HEADER, &signed.signature)
            .body(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(BotsimError::transport(
                Some(status.as_u16()),
                format!("{url} answered {status}: {detail}"),
            ));
        }
        let body = response.text().await.map_err(transport_error)?;
        debug!(%url, status = status.as_u16(), "application answered");
        Ok(AppResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AppTransport for HttpAppClient {
    #[instrument(skip_all, fields(url = %self.events_url))]
    async fn push_event(&self, envelope: &EventEnvelope) -> Result<AppResponse> {
        let body = serde_json::to_string(envelope)?;
        self.post_signed(&self.events_url, "application/json", body)
            .await
    }

    #[instrument(skip_all, fields(url = %self.actions_url, trigger_id = %payload.trigger_id))]
    async fn send_interaction(&self, payload: &InteractionPayload) -> Result<AppResponse> {
        let json = serde_json::to_string(payload)?;
        let body = serde_urlencoded::to_string([("payload", json.as_str())]).map_err(|e| {
            BotsimError::Serialization {
                format: "form".to_string(),
                message: e.to_string(),
            }
        })?;
        self.post_signed(
            &self.actions_url,
            "application/x-www-form-urlencoded",
            body,
        )
        .await
    }
}
