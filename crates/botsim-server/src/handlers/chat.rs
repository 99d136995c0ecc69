//! `chat.*` methods and message response URLs.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use botsim_core::block::Block;
use botsim_core::store::{MessageContent, MessageRecord};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::params::RequestParams;
use crate::response::{ApiResult, ok};
use crate::server::ServerState;

fn content(params: &RequestParams) -> Result<MessageContent, crate::response::ApiError> {
    Ok(MessageContent {
        blocks: params.json::<Vec<Block>>("blocks")?.unwrap_or_default(),
        text: params.string("text").unwrap_or_default(),
    })
}

fn message_json(record: &MessageRecord) -> Value {
    let content = record.content();
    json!({
        "type": "message",
        "ts": record.ts(),
        "text": content.text,
        "blocks": content.blocks,
    })
}

#[instrument(skip_all)]
pub async fn post_message(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let params = RequestParams::decode(&headers, &body)?;
    let channel = params.required("channel")?;
    let record = state.platform.messages.post(&channel, content(&params)?);
    debug!(%channel, ts = record.ts(), "message posted");

    Ok(ok(json!({
        "channel": channel,
        "ts": record.ts(),
        "message": message_json(&record),
    })))
}

#[instrument(skip_all)]
pub async fn update_message(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let params = RequestParams::decode(&headers, &body)?;
    let channel = params.required("channel")?;
    let ts = params.required("ts")?;
    apply_update(&state, &channel, &ts, content(&params)?)
}

/// The `response_url` handed out with message-originated interactions.
#[instrument(skip(state, body))]
pub async fn response_url(
    State(state): State<ServerState>,
    Path((channel, ts)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let params = RequestParams::from_json(&body)?;
    apply_update(&state, &channel, &ts, content(&params)?)
}

fn apply_update(
    state: &ServerState,
    channel: &str,
    ts: &str,
    content: MessageContent,
) -> ApiResult {
    match state.platform.messages.update(channel, ts, content) {
        Some(record) => {
            debug!(%channel, %ts, "message updated");
            Ok(ok(json!({
                "channel": channel,
                "ts": ts,
                "text": record.content().text,
            })))
        }
        None => {
            warn!(%channel, %ts, "update for unknown message");
            Ok(ok(json!({ "channel": channel, "ts": ts })))
        }
    }
}
