//! View model of one surface (home tab, modal or message).
//!
//! # Module Structure
//!
//! - `surface`: the shared tree plus serialized snapshot
//! - `form`: pending field values keyed by block id and action id
//!
//! A [`Page`] answers label lookups against its surface, accumulates form
//! values, and hands every click or submission to an injected
//! [`ActionHandler`]. It holds no network or channel logic of its own.

mod form;
mod surface;

// Re-export public API
pub use form::{FieldValue, FormState, SelectedOption};
pub use surface::Surface;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::block::{self, Block, BlockElement, Found, InputBlock, SelectSource};
use crate::error::{BotsimError, Result};

/// Interaction callback type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    BlockActions,
    ViewSubmission,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::BlockActions => "block_actions",
            InteractionKind::ViewSubmission => "view_submission",
        }
    }
}

/// A user action a page asks its handler to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: InteractionKind,
    /// Empty for submissions.
    pub action_id: String,
    pub block_id: Option<String>,
    pub value: String,
    pub wait_for_modal: bool,
    pub state: FormState,
}

impl Action {
    pub fn click(
        action_id: impl Into<String>,
        block_id: Option<String>,
        value: impl Into<String>,
        wait_for_modal: bool,
    ) -> Self {
        Self {
            kind: InteractionKind::BlockActions,
            action_id: action_id.into(),
            block_id,
            value: value.into(),
            wait_for_modal,
            state: FormState::default(),
        }
    }

    /// Attaches the values typed so far; clicks inside a modal carry them.
    pub fn with_state(mut self, state: FormState) -> Self {
        self.state = state;
        self
    }

    pub fn submission(state: FormState) -> Self {
        Self {
            kind: InteractionKind::ViewSubmission,
            action_id: String::new(),
            block_id: None,
            value: String::new(),
            wait_for_modal: false,
            state,
        }
    }
}

/// What a dispatched action did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Delivered; nothing observable changed before returning.
    Dispatched,
    ModalOpened,
    /// The top modal was replaced or a new one pushed by a submission response.
    ViewUpdated,
    ViewClosed,
    /// The submission was rejected; field block id → message.
    ValidationErrors(BTreeMap<String, String>),
}

impl ActionOutcome {
    /// Converts a rejected submission into `BotsimError::Validation`.
    pub fn into_result(self) -> Result<ActionOutcome> {
        match self {
            ActionOutcome::ValidationErrors(errors) => Err(BotsimError::Validation(errors)),
            outcome => Ok(outcome),
        }
    }
}

/// Delivers page actions to the application under test.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, action: Action) -> Result<ActionOutcome>;
}

/// One surface's tree, pending form values and dispatch hook.
pub struct Page {
    surface: Surface,
    form: FormState,
    handler: Arc<dyn ActionHandler>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("surface", &self.surface)
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl Page {
    pub fn new(handler: Arc<dyn ActionHandler>) -> Self {
        Self::with_surface(Surface::default(), handler)
    }

    /// Binds a page to an existing surface, sharing redraws with its other holders.
    pub fn with_surface(surface: Surface, handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            surface,
            form: FormState::default(),
            handler,
        }
    }

    pub fn set(&self, blocks: Vec<Block>) {
        self.surface.set(blocks);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.surface.blocks()
    }

    pub fn raw(&self) -> String {
        self.surface.raw()
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    pub fn find_by_label(&self, label: &str) -> Result<Found> {
        self.surface
            .read(|blocks| block::find_by_label(blocks, label).map(|hit| hit.to_found()))
            .ok_or_else(|| BotsimError::not_found("element", format!("text={label}")))
    }

    /// True when any visible text on the surface equals `text`.
    pub fn contains_text(&self, text: &str) -> bool {
        self.surface
            .read(|blocks| block::visible_texts(blocks).contains(&text))
    }

    pub fn type_text(&mut self, label: &str, value: &str) -> Result<()> {
        let input = self.input_block(label)?;
        match &input.element {
            BlockElement::PlainTextInput(text_input) => {
                self.form.record(
                    &input.block_id,
                    &text_input.action_id,
                    FieldValue::text(value),
                );
                Ok(())
            }
            other => Err(BotsimError::wrong_element(
                label,
                "plain_text_input",
                other.kind_name(),
            )),
        }
    }

    /// Picks the option whose visible text is `option_text`.
    pub fn select_option(&mut self, label: &str, option_text: &str) -> Result<()> {
        let input = self.input_block(label)?;
        let selector = input
            .element
            .selector()
            .filter(|s| s.source == SelectSource::Static)
            .ok_or_else(|| {
                BotsimError::wrong_element(label, "static_select", input.element.kind_name())
            })?;

        let option = selector.element.find_option(option_text).ok_or_else(|| {
            BotsimError::OptionNotFound {
                label: label.to_string(),
                option: option_text.to_string(),
            }
        })?;
        let selected = SelectedOption {
            value: option.value.clone(),
            text: Some(option.text.clone()),
        };

        let value = if selector.multi {
            FieldValue::SelectedOptions {
                selected_options: vec![selected],
            }
        } else {
            FieldValue::SelectedOption {
                selected_option: selected,
            }
        };
        self.form
            .record(&input.block_id, &selector.element.action_id, value);
        Ok(())
    }

    pub fn select_user(&mut self, label: &str, user_id: &str) -> Result<()> {
        let input = self.input_block(label)?;
        match input.element.selector() {
            Some(s) if s.source == SelectSource::Users && !s.multi => {
                self.form.record(
                    &input.block_id,
                    &s.element.action_id,
                    FieldValue::SelectedUser {
                        selected_user: user_id.to_string(),
                    },
                );
                Ok(())
            }
            _ => Err(BotsimError::wrong_element(
                label,
                "users_select",
                input.element.kind_name(),
            )),
        }
    }

    pub fn select_users(&mut self, label: &str, user_ids: &[&str]) -> Result<()> {
        let input = self.input_block(label)?;
        match input.element.selector() {
            Some(s) if s.source == SelectSource::Users && s.multi => {
                self.form.record(
                    &input.block_id,
                    &s.element.action_id,
                    FieldValue::SelectedUsers {
                        selected_users: user_ids.iter().map(|id| id.to_string()).collect(),
                    },
                );
                Ok(())
            }
            _ => Err(BotsimError::wrong_element(
                label,
                "multi_users_select",
                input.element.kind_name(),
            )),
        }
    }

    pub async fn click_by_label(&mut self, label: &str, wait_for_modal: bool) -> Result<ActionOutcome> {
        let action = self
            .surface
            .read(|blocks| {
                let hit = block::find_by_label(blocks, label)?;
                Some(match hit.as_button() {
                    Some((block_id, button)) => Ok(Action::click(
                        &button.action_id,
                        block_id.map(str::to_string),
                        &button.value,
                        wait_for_modal,
                    )),
                    None => Err(BotsimError::wrong_element(label, "button", hit.describe())),
                })
            })
            .ok_or_else(|| BotsimError::not_found("element", format!("text={label}")))??;

        self.handler.handle(action.with_state(self.form.clone())).await
    }

    /// Clicks the first button with `action_id`; an empty `value` matches any.
    pub async fn click_by_action(
        &mut self,
        action_id: &str,
        value: &str,
        wait_for_modal: bool,
    ) -> Result<ActionOutcome> {
        let action = self
            .surface
            .read(|blocks| {
                block::find_by_action_and_value(blocks, action_id, value)
                    .and_then(|hit| hit.as_button())
                    .map(|(block_id, button)| {
                        Action::click(
                            &button.action_id,
                            block_id.map(str::to_string),
                            &button.value,
                            wait_for_modal,
                        )
                    })
            })
            .ok_or_else(|| {
                BotsimError::not_found("button", format!("action={action_id}&value={value}"))
            })?;

        self.handler.handle(action.with_state(self.form.clone())).await
    }

    /// Submits the accumulated form.
    ///
    /// The form survives a failed dispatch or a rejection with field errors,
    /// so a retry only needs the corrected fields. Any other outcome clears it.
    pub async fn submit(&mut self) -> Result<ActionOutcome> {
        let action = Action::submission(self.form.clone());
        let outcome = self.handler.handle(action).await?;
        if !matches!(outcome, ActionOutcome::ValidationErrors(_)) {
            self.form.take();
        }
        Ok(outcome)
    }

    fn input_block(&self, label: &str) -> Result<InputBlock> {
        match self.find_by_label(label)? {
            Found::Input(input) => Ok(input),
            Found::Element { element, .. } => Err(BotsimError::wrong_element(
                label,
                "input block",
                element.kind_name(),
            )),
            Found::Header(_) => Err(BotsimError::wrong_element(label, "input block", "header")),
            Found::Section(_) => Err(BotsimError::wrong_element(label, "input block", "section")),
        }
    }
}
