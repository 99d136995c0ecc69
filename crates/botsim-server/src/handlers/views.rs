//! `views.*` methods.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use botsim_core::view::{View, ViewKind};
use serde_json::json;
use tracing::{debug, instrument};

use crate::params::RequestParams;
use crate::response::{ApiError, ApiResult, ok};
use crate::server::ServerState;

fn view_arg(state: &ServerState, params: &RequestParams) -> Result<View, ApiError> {
    let mut view: View = params
        .json("view")?
        .ok_or_else(|| ApiError::invalid("missing argument view"))?;
    if view.id.is_none() {
        view.id = Some(state.platform.next_view_id());
    }
    Ok(view)
}

/// Answers the trigger with a modal. Used for both `views.open` and `views.push`.
///
/// A trigger nobody waits on any more gets the same `ok` reply.
async fn resolve_trigger(state: ServerState, headers: HeaderMap, body: Bytes) -> ApiResult {
    let params = RequestParams::decode(&headers, &body)?;
    let trigger_id = params.required("trigger_id")?;
    let view = view_arg(&state, &params)?;

    if state.platform.pending_views.resolve(&trigger_id, view.clone()) {
        debug!(%trigger_id, view_id = ?view.id, "modal delivered");
    }
    Ok(ok(json!({ "view": view })))
}

#[instrument(skip_all)]
pub async fn open(State(state): State<ServerState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    resolve_trigger(state, headers, body).await
}

#[instrument(skip_all)]
pub async fn push(State(state): State<ServerState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    resolve_trigger(state, headers, body).await
}

#[instrument(skip_all)]
pub async fn publish(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let params = RequestParams::decode(&headers, &body)?;
    let user_id = params.required("user_id")?;
    let mut view = view_arg(&state, &params)?;
    view.kind = ViewKind::Home;

    state.platform.home.publish(&user_id, view.clone());
    debug!(%user_id, "home view published");
    Ok(ok(json!({ "view": view })))
}
