//! Modal and home-tab view documents.

use serde::{Deserialize, Serialize};

use crate::block::{Block, TextObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Modal,
    Home,
}

/// A view as sent by the application in `views.open` / `views.publish` or
/// inside a `response_action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct View {
    #[serde(rename = "type", default)]
    pub kind: ViewKind,
    /// Assigned by the mock server when the view is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<TextObject>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_metadata: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub callback_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

impl View {
    pub fn modal(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            kind: ViewKind::Modal,
            title: Some(TextObject::plain(title)),
            blocks,
            ..Default::default()
        }
    }

    pub fn home(blocks: Vec<Block>) -> Self {
        Self {
            kind: ViewKind::Home,
            blocks,
            ..Default::default()
        }
    }

    pub fn with_private_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.private_metadata = metadata.into();
        self
    }

    pub fn with_callback_id(mut self, callback_id: impl Into<String>) -> Self {
        self.callback_id = callback_id.into();
        self
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text.as_str())
    }
}
