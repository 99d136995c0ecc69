//! `users.info` and `auth.test`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::json;
use tracing::instrument;

use crate::params::RequestParams;
use crate::response::{ApiError, ApiResult, ok};
use crate::server::ServerState;

/// Identity reported to the application by `auth.test`.
pub const BOT_USER_ID: &str = "UBOTSIM";
pub const BOT_ID: &str = "BBOTSIM";

#[instrument(skip_all)]
pub async fn info(State(state): State<ServerState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let params = RequestParams::decode(&headers, &body)?;
    let id = params.required("user")?;
    let user = state
        .platform
        .users
        .get(&id)
        .ok_or(ApiError::UserNotFound(id))?;
    Ok(ok(json!({ "user": user })))
}

#[instrument(skip_all)]
pub async fn auth_test(State(state): State<ServerState>) -> ApiResult {
    Ok(ok(json!({
        "url": format!("{}/", state.base_url),
        "team": "botsim",
        "team_id": state.platform.team_id,
        "user": "botsim",
        "user_id": BOT_USER_ID,
        "bot_id": BOT_ID,
    })))
}
