//! Block tree types.
//!
//! The JSON shape follows the chat platform's Block Kit documents: every
//! node and element carries a `type` tag in snake_case. Kinds the harness
//! does not interact with decode to `Unsupported` so foreign payloads still
//! parse.

use serde::{Deserialize, Serialize};

/// Formatting of a text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    #[default]
    PlainText,
    Mrkdwn,
}

/// A piece of visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type", default)]
    pub kind: TextKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::PlainText,
            text: text.into(),
            emoji: None,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
            emoji: None,
        }
    }
}

/// One choice of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionObject {
    pub text: TextObject,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextObject>,
}

impl OptionObject {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: TextObject::plain(text),
            value: value.into(),
            description: None,
        }
    }
}

/// A labelled group of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: TextObject,
    pub options: Vec<OptionObject>,
}

/// A top-level layout node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Divider(DividerBlock),
    Actions(ActionsBlock),
    Input(InputBlock),
    Header(HeaderBlock),
    Section(SectionBlock),
    #[serde(other)]
    Unsupported,
}

impl Block {
    /// Platform name of this node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Divider(_) => "divider",
            Block::Actions(_) => "actions",
            Block::Input(_) => "input",
            Block::Header(_) => "header",
            Block::Section(_) => "section",
            Block::Unsupported => "unsupported",
        }
    }

    pub fn block_id(&self) -> Option<&str> {
        match self {
            Block::Divider(b) => b.block_id.as_deref(),
            Block::Actions(b) => b.block_id.as_deref(),
            Block::Input(b) => Some(b.block_id.as_str()).filter(|id| !id.is_empty()),
            Block::Header(b) => b.block_id.as_deref(),
            Block::Section(b) => b.block_id.as_deref(),
            Block::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DividerBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

/// A row of interactive elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionsBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default)]
    pub elements: Vec<BlockElement>,
}

/// A labelled form field wrapping exactly one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputBlock {
    #[serde(default)]
    pub block_id: String,
    pub label: TextObject,
    pub element: BlockElement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<TextObject>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    pub text: TextObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<Box<BlockElement>>,
}

/// An interactive element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockElement {
    Button(ButtonElement),
    PlainTextInput(TextInputElement),
    StaticSelect(SelectElement),
    UsersSelect(SelectElement),
    ConversationsSelect(SelectElement),
    ChannelsSelect(SelectElement),
    MultiStaticSelect(SelectElement),
    MultiUsersSelect(SelectElement),
    MultiConversationsSelect(SelectElement),
    MultiChannelsSelect(SelectElement),
    #[serde(other)]
    Unsupported,
}

/// What a select menu chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectSource {
    Static,
    Users,
    Conversations,
    Channels,
}

/// A select element viewed through its declared subtype.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    pub source: SelectSource,
    pub multi: bool,
    pub element: &'a SelectElement,
}

impl BlockElement {
    /// Platform name of this element kind, used in failure messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockElement::Button(_) => "button",
            BlockElement::PlainTextInput(_) => "plain_text_input",
            BlockElement::StaticSelect(_) => "static_select",
            BlockElement::UsersSelect(_) => "users_select",
            BlockElement::ConversationsSelect(_) => "conversations_select",
            BlockElement::ChannelsSelect(_) => "channels_select",
            BlockElement::MultiStaticSelect(_) => "multi_static_select",
            BlockElement::MultiUsersSelect(_) => "multi_users_select",
            BlockElement::MultiConversationsSelect(_) => "multi_conversations_select",
            BlockElement::MultiChannelsSelect(_) => "multi_channels_select",
            BlockElement::Unsupported => "unsupported",
        }
    }

    pub fn action_id(&self) -> Option<&str> {
        match self {
            BlockElement::Button(b) => Some(&b.action_id),
            BlockElement::PlainTextInput(t) => Some(&t.action_id),
            BlockElement::Unsupported => None,
            _ => self.selector().map(|s| s.element.action_id.as_str()),
        }
    }

    /// Visible label: button text or placeholder text.
    pub fn label(&self) -> Option<&str> {
        match self {
            BlockElement::Button(b) => Some(&b.text.text),
            BlockElement::PlainTextInput(t) => t.placeholder.as_ref().map(|p| p.text.as_str()),
            BlockElement::Unsupported => None,
            _ => self
                .selector()
                .and_then(|s| s.element.placeholder.as_ref())
                .map(|p| p.text.as_str()),
        }
    }

    pub fn as_button(&self) -> Option<&ButtonElement> {
        match self {
            BlockElement::Button(b) => Some(b),
            _ => None,
        }
    }

    pub fn selector(&self) -> Option<Selector<'_>> {
        let (source, multi, element) = match self {
            BlockElement::StaticSelect(e) => (SelectSource::Static, false, e),
            BlockElement::UsersSelect(e) => (SelectSource::Users, false, e),
            BlockElement::ConversationsSelect(e) => (SelectSource::Conversations, false, e),
            BlockElement::ChannelsSelect(e) => (SelectSource::Channels, false, e),
            BlockElement::MultiStaticSelect(e) => (SelectSource::Static, true, e),
            BlockElement::MultiUsersSelect(e) => (SelectSource::Users, true, e),
            BlockElement::MultiConversationsSelect(e) => (SelectSource::Conversations, true, e),
            BlockElement::MultiChannelsSelect(e) => (SelectSource::Channels, true, e),
            _ => return None,
        };
        Some(Selector {
            source,
            multi,
            element,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonElement {
    pub action_id: String,
    pub text: TextObject,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            text: TextObject::plain(text),
            value: String::new(),
            url: None,
            style: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInputElement {
    pub action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectElement {
    pub action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_groups: Vec<OptionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selected_items: Option<u32>,
}

impl SelectElement {
    pub fn new(action_id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            placeholder: Some(TextObject::plain(placeholder)),
            options: Vec::new(),
            option_groups: Vec::new(),
            initial_user: None,
            max_selected_items: None,
        }
    }

    pub fn with_options(mut self, options: Vec<OptionObject>) -> Self {
        self.options = options;
        self
    }

    /// First option whose visible text equals `text`, flat options before groups.
    pub fn find_option(&self, text: &str) -> Option<&OptionObject> {
        self.options
            .iter()
            .chain(self.option_groups.iter().flat_map(|g| g.options.iter()))
            .find(|option| option.text.text == text)
    }
}
