//! Mock platform HTTP server.
//!
//! Serves the Web API subset an application calls, under `/api`, backed by
//! a shared [`PlatformState`].

use axum::Router;
use axum::routing::post;
use botsim_core::store::PlatformState;
use botsim_core::{BotsimError, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::handlers::{chat, users, views};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub platform: PlatformState,
    /// `http://<addr>` the server is reachable at.
    pub base_url: String,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/chat.postMessage", post(chat::post_message))
        .route("/api/chat.update", post(chat::update_message))
        .route("/api/response_url/:channel/:ts", post(chat::response_url))
        .route("/api/views.open", post(views::open))
        .route("/api/views.push", post(views::push))
        .route("/api/views.publish", post(views::publish))
        .route("/api/users.info", post(users::info))
        .route("/api/auth.test", post(users::auth_test))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct MockServer;

impl MockServer {
    /// Binds `addr` and serves in a background task until the handle is
    /// shut down or dropped.
    pub async fn start(platform: PlatformState, addr: SocketAddr) -> Result<MockServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let state = ServerState {
            platform,
            base_url: format!("http://{local_addr}"),
        };
        let app = router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("mock server stopped: {}", e);
            }
        });

        info!("mock platform server listening on {}", local_addr);
        Ok(MockServerHandle {
            addr: local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// A running mock server.
#[derive(Debug)]
pub struct MockServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MockServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL the application should use as its Web API root.
    pub fn api_base_url(&self) -> String {
        format!("{}/api", self.base_url())
    }

    /// Stops accepting connections and waits for the server task.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| BotsimError::internal(format!("mock server task: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for MockServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botsim_core::store::User;
    use botsim_core::view::View;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;

    async fn start() -> (PlatformState, MockServerHandle) {
        let platform = PlatformState::new("T1");
        let handle = MockServer::start(platform.clone(), "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        (platform, handle)
    }

    async fn call_form(handle: &MockServerHandle, method: &str, form: &[(&str, &str)]) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/{method}", handle.api_base_url()))
            .form(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn call_json(handle: &MockServerHandle, path: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/{path}", handle.api_base_url()))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_post_then_update_addresses_that_message() {
        let (platform, handle) = start().await;
        let blocks = r#"[{"type":"header","text":{"type":"plain_text","text":"Fill form"}}]"#;

        let (_, first) = call_form(&handle, "chat.postMessage", &[("channel", "u2"), ("blocks", blocks)]).await;
        let (status, second) =
            call_form(&handle, "chat.postMessage", &[("channel", "u2"), ("text", "second")]).await;
        assert_eq!(status, 200);
        assert_eq!(second["ok"], true);

        let ts = first["ts"].as_str().unwrap().to_string();
        let (_, updated) = call_form(
            &handle,
            "chat.update",
            &[("channel", "u2"), ("ts", &ts), ("blocks", "[]"), ("text", "done")],
        )
        .await;
        assert_eq!(updated, json!({"ok": true, "channel": "u2", "ts": ts, "text": "done"}));

        let messages = platform.messages.list("u2");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].blocks().is_empty());
        assert_eq!(messages[1].content().text, "second");
        messages[0].wait_update(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_unknown_message_is_acknowledged() {
        let (platform, handle) = start().await;
        let (status, body) = call_form(
            &handle,
            "chat.update",
            &[("channel", "u2"), ("ts", "1.000000"), ("blocks", "[]")],
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"ok": true, "channel": "u2", "ts": "1.000000"}));
        assert_eq!(platform.messages.count("u2"), 0);
    }

    #[tokio::test]
    async fn test_response_url_updates_message() {
        let (platform, handle) = start().await;
        let record = platform.messages.post("u2", Default::default());

        let (_, body) = call_json(
            &handle,
            &format!("response_url/u2/{}", record.ts()),
            json!({"replace_original": true, "blocks": [{"type": "divider"}]}),
        )
        .await;

        assert_eq!(body["ok"], true);
        assert_eq!(record.blocks().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_blocks_is_server_error() {
        let (_, handle) = start().await;
        let (status, body) =
            call_form(&handle, "chat.postMessage", &[("channel", "u2"), ("blocks", "{oops")]).await;
        assert_eq!(status, 500);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_views_open_resolves_pending_trigger() {
        let (platform, handle) = start().await;
        let (trigger_id, waiter) = platform.pending_views.register();

        let (_, body) = call_json(
            &handle,
            "views.open",
            json!({
                "trigger_id": trigger_id,
                "view": {"type": "modal", "title": {"type": "plain_text", "text": "New review"}, "blocks": []}
            }),
        )
        .await;

        assert_eq!(body["ok"], true);
        assert!(body["view"]["id"].as_str().unwrap().starts_with('V'));
        let view = waiter.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(view.title_text(), Some("New review"));
        assert!(view.id.is_some());
    }

    #[tokio::test]
    async fn test_views_open_unknown_trigger_does_not_block() {
        let (_, handle) = start().await;
        let (status, body) = call_json(
            &handle,
            "views.open",
            json!({"trigger_id": "1.nobody", "view": {"type": "modal", "blocks": []}}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["ok"], true);
        assert!(body["view"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_views_open_second_answer_is_acknowledged() {
        let (platform, handle) = start().await;
        let (trigger_id, waiter) = platform.pending_views.register();
        let open = |title: &str| {
            json!({
                "trigger_id": trigger_id,
                "view": {"type": "modal", "title": {"type": "plain_text", "text": title}, "blocks": []}
            })
        };

        let (_, first) = call_json(&handle, "views.open", open("First")).await;
        let (status, second) = call_json(&handle, "views.open", open("Second")).await;

        assert_eq!(first["ok"], true);
        assert_eq!(status, 200);
        assert_eq!(second["ok"], true);
        let view = waiter.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(view.title_text(), Some("First"));
    }

    #[tokio::test]
    async fn test_views_publish_reaches_home_queue() {
        let (platform, handle) = start().await;
        let home = platform.home.subscribe("u1");

        let view = serde_json::to_string(&View::home(Vec::new()).with_private_metadata("m")).unwrap();
        let (_, body) = call_form(&handle, "views.publish", &[("user_id", "u1"), ("view", &view)]).await;

        assert_eq!(body["ok"], true);
        let published = home.recv(Duration::from_secs(1)).await.unwrap();
        assert_eq!(published.private_metadata, "m");
    }

    #[tokio::test]
    async fn test_users_info() {
        let (platform, handle) = start().await;
        platform.register_user(User::new("u1").with_name("alice"));

        let (status, body) = call_form(&handle, "users.info", &[("user", "u1")]).await;
        assert_eq!(status, 200);
        assert_eq!(body["user"]["name"], "alice");
        assert_eq!(body["user"]["team_id"], "T1");

        let (status, _) = call_form(&handle, "users.info", &[("user", "u9")]).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_auth_test_reports_team() {
        let (_, handle) = start().await;
        let (_, body) = call_form(&handle, "auth.test", &[]).await;
        assert_eq!(body["team_id"], "T1");
        assert_eq!(body["url"], format!("{}/", handle.base_url()));
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let (_, handle) = start().await;
        let url = handle.api_base_url();
        handle.shutdown().await.unwrap();

        let result = reqwest::Client::new()
            .post(format!("{url}/auth.test"))
            .send()
            .await;
        assert!(result.is_err());
    }
}
