//! Wire types exchanged with the application under test.

use botsim_core::page::{FormState, InteractionKind};
use botsim_core::store::User;
use botsim_core::view::View;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team_id: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.name.clone(),
            name: user.name.clone(),
            team_id: user.team_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(rename = "type", default = "ActionPayload::button")]
    pub kind: String,
    #[serde(default)]
    pub action_ts: String,
}

impl ActionPayload {
    fn button() -> String {
        "button".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: FormState,
}

/// The open modal an interaction reports about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

impl ViewPayload {
    pub fn for_view(view: &View, values: FormState) -> Self {
        Self {
            id: view.id.clone(),
            callback_id: view.callback_id.clone(),
            private_metadata: view.private_metadata.clone(),
            state: ViewState { values },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRef {
    pub ts: String,
    #[serde(default)]
    pub text: String,
}

/// Body of the `payload` form field POSTed to the actions URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub team: TeamRef,
    pub user: UserRef,
    pub trigger_id: String,
    #[serde(default)]
    pub actions: Vec<ActionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageRef>,
}

/// Events API callback event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AppHomeOpened {
        user: String,
        #[serde(default)]
        channel: String,
        tab: String,
        #[serde(default)]
        event_ts: String,
    },
}

/// Current time as `"<secs>.<micros>"`, the platform's `*_ts` format.
pub fn timestamp_now() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

impl Event {
    pub fn app_home_opened(user: impl Into<String>) -> Self {
        Event::AppHomeOpened {
            user: user.into(),
            channel: String::new(),
            tab: "home".to_string(),
            event_ts: timestamp_now(),
        }
    }
}

/// Outer `event_callback` envelope POSTed to the events URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub team_id: String,
    pub event: Event,
    pub event_time: i64,
}

impl EventEnvelope {
    pub fn callback(team_id: impl Into<String>, event: Event) -> Self {
        Self {
            kind: "event_callback".to_string(),
            team_id: team_id.into(),
            event,
            event_time: chrono::Utc::now().timestamp(),
        }
    }
}

/// Synchronous answer of the application to a view submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "response_action", rename_all = "snake_case")]
pub enum ResponseAction {
    Update { view: View },
    Push { view: View },
    Clear,
    Errors { errors: BTreeMap<String, String> },
}

impl ResponseAction {
    /// `None` for an empty body or anything that is not a response action.
    pub fn parse(body: &str) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(body).ok()
    }
}
