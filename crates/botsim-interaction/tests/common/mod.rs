//! An in-process bot used as the application under test.
//!
//! It verifies request signatures, records what it receives, and drives the
//! mock platform the way a real bot would:
//!
//! - `app_home_opened` → publishes a home tab with "New" and "Send form"
//! - "New" → opens the review modal
//! - "Send form" → posts a "Fill form" message to the user's channel
//! - "Fill form" (on that message) → edits the message via its response URL
//!   and opens the answer modal
//! - review submissions → field errors for an empty title, `update` to a
//!   confirmation step for the title "two-step", otherwise a home republish
//! - confirmation submissions → `clear`

#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use botsim_core::config::HarnessConfig;
use botsim_core::signature::{SIGNATURE_HEADER, Signer, TIMESTAMP_HEADER};
use botsim_interaction::{Harness, init_tracing};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const SECRET: &str = "test-signing-secret";

#[derive(Clone, Default)]
struct BotState {
    api_base: Arc<Mutex<String>>,
    events: Arc<Mutex<Vec<Value>>>,
    interactions: Arc<Mutex<Vec<Value>>>,
    client: reqwest::Client,
    signer: Option<Signer>,
}

impl BotState {
    fn api_base(&self) -> String {
        self.api_base.lock().unwrap().clone()
    }

    async fn call(&self, method: &str, body: Value) -> Value {
        self.client
            .post(format!("{}/{method}", self.api_base()))
            .json(&body)
            .send()
            .await
            .expect("mock API reachable")
            .json()
            .await
            .unwrap_or(Value::Null)
    }

    /// Form-encoded call with JSON arguments embedded as strings.
    async fn call_form(&self, method: &str, form: &[(&str, String)]) -> Value {
        self.client
            .post(format!("{}/{method}", self.api_base()))
            .form(form)
            .send()
            .await
            .expect("mock API reachable")
            .json()
            .await
            .unwrap_or(Value::Null)
    }

    fn verified(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        let Some(signer) = &self.signer else {
            return true;
        };
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        signer.verify(&header(TIMESTAMP_HEADER), body, &header(SIGNATURE_HEADER))
    }
}

pub struct FakeBot {
    pub addr: SocketAddr,
    state: BotState,
}

impl FakeBot {
    pub async fn start(secret: &str) -> Self {
        let state = BotState {
            signer: Some(Signer::new(secret)),
            ..Default::default()
        };
        let app = Router::new()
            .route("/slack/events", post(events))
            .route("/slack/actions", post(actions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(
            format!("http://{}/slack/events", self.addr),
            format!("http://{}/slack/actions", self.addr),
            SECRET,
        )
        .with_timeout(Duration::from_secs(3))
    }

    pub fn connect(&self, api_base_url: &str) {
        *self.state.api_base.lock().unwrap() = api_base_url.to_string();
    }

    pub fn events(&self) -> Vec<Value> {
        self.state.events.lock().unwrap().clone()
    }

    pub fn interactions(&self) -> Vec<Value> {
        self.state.interactions.lock().unwrap().clone()
    }

    /// Publishes a home view for `user_id` outside of any request.
    pub async fn publish_home(&self, user_id: &str, headline: &str) {
        self.state
            .call(
                "views.publish",
                json!({"user_id": user_id, "view": home_view(headline)}),
            )
            .await;
    }
}

/// A bot and a harness wired to each other.
pub async fn setup() -> (FakeBot, Harness) {
    init_tracing();
    let bot = FakeBot::start(SECRET).await;
    let harness = Harness::start(bot.config()).await.expect("harness starts");
    bot.connect(&harness.api_base_url());
    (bot, harness)
}

fn plain(text: &str) -> Value {
    json!({"type": "plain_text", "text": text})
}

fn button(action_id: &str, text: &str, value: &str) -> Value {
    json!({"type": "button", "action_id": action_id, "text": plain(text), "value": value})
}

pub fn home_view(headline: &str) -> Value {
    json!({
        "type": "home",
        "blocks": [
            {"type": "header", "text": plain("Reviews")},
            {"type": "section", "text": {"type": "mrkdwn", "text": headline}},
            {"type": "actions", "block_id": "home_actions", "elements": [
                button("new", "New", ""),
                button("send_form", "Send form", "")
            ]}
        ]
    })
}

fn review_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": "new_review",
        "private_metadata": "review:new",
        "title": plain("New review"),
        "submit": plain("Save"),
        "blocks": [
            {"type": "input", "block_id": "title_block", "label": plain("Title"),
             "element": {"type": "plain_text_input", "action_id": "title", "placeholder": plain("Review title")}},
            {"type": "input", "block_id": "grade_block", "label": plain("Grade"),
             "element": {"type": "static_select", "action_id": "grade", "placeholder": plain("Grade"),
                         "options": [
                             {"text": plain("Meets expectations"), "value": "3"},
                             {"text": plain("Exceeds expectations"), "value": "4"}
                         ]}},
            {"type": "input", "block_id": "owner_block", "label": plain("Owner"),
             "element": {"type": "users_select", "action_id": "owner", "placeholder": plain("Owner")}},
            {"type": "input", "block_id": "reviewers_block", "label": plain("Reviewers"),
             "element": {"type": "multi_users_select", "action_id": "reviewers", "placeholder": plain("Reviewers")}},
            {"type": "actions", "elements": [button("nested", "More options", "")]}
        ]
    })
}

fn confirm_modal(title: &str) -> Value {
    json!({
        "type": "modal",
        "callback_id": "confirm",
        "title": plain("Confirm"),
        "blocks": [
            {"type": "section", "text": {"type": "mrkdwn", "text": format!("Create {title}?")}},
            {"type": "actions", "elements": [button("looks_good", "Looks good", "")]}
        ]
    })
}

fn answer_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": "answer",
        "title": plain("Answer"),
        "blocks": [
            {"type": "input", "block_id": "answer_block", "label": plain("Answer"),
             "element": {"type": "plain_text_input", "action_id": "answer", "placeholder": plain("Your answer")}}
        ]
    })
}

fn nested_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": "nested",
        "title": plain("More"),
        "blocks": [{"type": "section", "text": plain("Nothing here yet")}]
    })
}

async fn events(State(state): State<BotState>, headers: HeaderMap, body: Bytes) -> Response {
    if !state.verified(&headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Ok(envelope) = serde_json::from_slice::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    state.events.lock().unwrap().push(envelope.clone());

    if envelope["event"]["type"] == "app_home_opened" {
        let user = envelope["event"]["user"].as_str().unwrap_or_default();
        state
            .call(
                "views.publish",
                json!({"user_id": user, "view": home_view("No reviews yet")}),
            )
            .await;
    }
    StatusCode::OK.into_response()
}

async fn actions(State(state): State<BotState>, headers: HeaderMap, body: Bytes) -> Response {
    if !state.verified(&headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(&body).unwrap_or_default();
    let Some(payload) = form
        .get("payload")
        .and_then(|p| serde_json::from_str::<Value>(p).ok())
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    state.interactions.lock().unwrap().push(payload.clone());

    let user = payload["user"]["id"].as_str().unwrap_or_default().to_string();
    let trigger_id = payload["trigger_id"].as_str().unwrap_or_default().to_string();

    match payload["type"].as_str() {
        Some("block_actions") => {
            match payload["actions"][0]["action_id"].as_str().unwrap_or_default() {
                "new" => {
                    state
                        .call("views.open", json!({"trigger_id": trigger_id, "view": review_modal()}))
                        .await;
                }
                "nested" => {
                    state
                        .call("views.push", json!({"trigger_id": trigger_id, "view": nested_modal()}))
                        .await;
                }
                "send_form" => {
                    let blocks = json!([
                        {"type": "section", "text": {"type": "mrkdwn", "text": "Please answer"}},
                        {"type": "actions", "block_id": "form_actions", "elements": [button("fill_form", "Fill form", "f-1")]}
                    ]);
                    state
                        .call_form(
                            "chat.postMessage",
                            &[
                                ("channel", user.clone()),
                                ("text", "Please answer".to_string()),
                                ("blocks", blocks.to_string()),
                            ],
                        )
                        .await;
                }
                "fill_form" => {
                    let response_url = payload["response_url"].as_str().unwrap_or_default();
                    state
                        .client
                        .post(response_url)
                        .json(&json!({
                            "replace_original": true,
                            "blocks": [{"type": "section", "text": plain("Form opened")}]
                        }))
                        .send()
                        .await
                        .expect("response url reachable");
                    state
                        .call("views.open", json!({"trigger_id": trigger_id, "view": answer_modal()}))
                        .await;
                }
                _ => {}
            }
            StatusCode::OK.into_response()
        }
        Some("view_submission") => submission(&state, &user, &payload).await,
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn submission(state: &BotState, user: &str, payload: &Value) -> Response {
    let values = &payload["view"]["state"]["values"];
    match payload["view"]["callback_id"].as_str().unwrap_or_default() {
        "new_review" => {
            let title = values["title_block"]["title"]["value"].as_str().unwrap_or_default();
            if title.is_empty() {
                return axum::Json(json!({
                    "response_action": "errors",
                    "errors": {"title_block": "Title is required"}
                }))
                .into_response();
            }
            if title == "two-step" {
                return axum::Json(json!({
                    "response_action": "update",
                    "view": confirm_modal(title)
                }))
                .into_response();
            }
            let grade = values["grade_block"]["grade"]["selected_option"]["value"]
                .as_str()
                .unwrap_or("-");
            state
                .call(
                    "views.publish",
                    json!({"user_id": user, "view": home_view(&format!("Review: {title} ({grade})"))}),
                )
                .await;
            StatusCode::OK.into_response()
        }
        "confirm" => axum::Json(json!({"response_action": "clear"})).into_response(),
        _ => StatusCode::OK.into_response(),
    }
}
