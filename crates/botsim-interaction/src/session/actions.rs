//! Dispatch of page actions and their effect on a session's modal stack.

use async_trait::async_trait;
use botsim_core::page::{Action, ActionHandler, ActionOutcome, InteractionKind, Surface};
use botsim_core::rendezvous::ViewWaiter;
use botsim_core::view::View;
use botsim_core::Result;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{SessionContext, ViewStack};
use crate::payload::{
    self, ActionPayload, ChannelRef, InteractionPayload, MessageRef, ResponseAction, TeamRef, UserRef,
    ViewPayload,
};

/// The message a message-originated action was taken on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOrigin {
    pub channel: String,
    pub ts: String,
    pub text: String,
}

/// `ActionHandler` bound to one user session.
///
/// Modals answering an action are pushed onto the session's stack and drawn
/// on the session's surface, whether the action came from the home tab, a
/// modal, or a message.
#[derive(Clone)]
pub struct SessionActions {
    ctx: Arc<SessionContext>,
    user_id: String,
    views: Arc<Mutex<ViewStack>>,
    surface: Surface,
    origin: Option<MessageOrigin>,
}

impl fmt::Debug for SessionActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionActions")
            .field("user_id", &self.user_id)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

fn lock(views: &Mutex<ViewStack>) -> MutexGuard<'_, ViewStack> {
    views.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Redraws `surface` with whatever the stack shows now.
fn redraw(views: &Mutex<ViewStack>, surface: &Surface) {
    let blocks = lock(views).active_blocks();
    if let Some(blocks) = blocks {
        surface.set(blocks);
    }
}

fn open_modal(views: &Mutex<ViewStack>, surface: &Surface, view: View) {
    debug!(view_id = ?view.id, "modal opened");
    lock(views).push(view);
    redraw(views, surface);
}

impl SessionActions {
    pub fn new(
        ctx: Arc<SessionContext>,
        user_id: impl Into<String>,
        views: Arc<Mutex<ViewStack>>,
        surface: Surface,
    ) -> Self {
        Self {
            ctx,
            user_id: user_id.into(),
            views,
            surface,
            origin: None,
        }
    }

    /// The same handler, reporting actions as taken on `origin`.
    pub fn for_message(&self, origin: MessageOrigin) -> Self {
        Self {
            origin: Some(origin),
            ..self.clone()
        }
    }

    fn build_payload(&self, action: Action, trigger_id: String) -> InteractionPayload {
        let user = self.ctx.user(&self.user_id);
        let view = lock(&self.views)
            .top()
            .map(|top| ViewPayload::for_view(top, action.state.clone()));

        let actions = match action.kind {
            InteractionKind::BlockActions => vec![ActionPayload {
                action_id: action.action_id,
                block_id: action.block_id,
                value: action.value,
                kind: "button".to_string(),
                action_ts: payload::timestamp_now(),
            }],
            InteractionKind::ViewSubmission => Vec::new(),
        };

        let origin = self.origin.as_ref();
        InteractionPayload {
            kind: action.kind,
            team: TeamRef {
                id: self.ctx.platform.team_id.clone(),
            },
            user: UserRef::from(&user),
            trigger_id,
            actions,
            view,
            response_url: origin.map(|o| self.ctx.response_url(&o.channel, &o.ts)),
            channel: origin.map(|o| ChannelRef {
                id: o.channel.clone(),
            }),
            message: origin.map(|o| MessageRef {
                ts: o.ts.clone(),
                text: o.text.clone(),
            }),
        }
    }

    /// Waits for a modal in the background; one that arrives is opened.
    fn await_modal_in_background(&self, waiter: ViewWaiter, timeout: Duration) {
        let views = self.views.clone();
        let surface = self.surface.clone();
        tokio::spawn(async move {
            let trigger_id = waiter.trigger_id().to_string();
            match waiter.wait(timeout).await {
                Ok(view) => open_modal(&views, &surface, view),
                Err(e) => debug!(%trigger_id, "no modal for trigger: {}", e),
            }
        });
    }

    fn apply_submission_response(&self, body: &str) -> ActionOutcome {
        let outcome = {
            let mut views = lock(&self.views);
            match ResponseAction::parse(body) {
                Some(ResponseAction::Update { view }) => {
                    views.replace_top(view);
                    ActionOutcome::ViewUpdated
                }
                Some(ResponseAction::Push { view }) => {
                    views.push(view);
                    ActionOutcome::ViewUpdated
                }
                Some(ResponseAction::Clear) => {
                    views.clear();
                    ActionOutcome::ViewClosed
                }
                Some(ResponseAction::Errors { errors }) => {
                    return ActionOutcome::ValidationErrors(errors);
                }
                None => {
                    views.pop();
                    ActionOutcome::ViewClosed
                }
            }
        };
        redraw(&self.views, &self.surface);
        outcome
    }
}

#[async_trait]
impl ActionHandler for SessionActions {
    #[instrument(skip_all, fields(user_id = %self.user_id, kind = action.kind.as_str(), action_id = %action.action_id))]
    async fn handle(&self, action: Action) -> Result<ActionOutcome> {
        let (trigger_id, waiter) = self.ctx.platform.pending_views.register();
        let kind = action.kind;
        let wait_for_modal = action.wait_for_modal;
        let payload = self.build_payload(action, trigger_id);

        let response = self.ctx.transport.send_interaction(&payload).await?;
        let timeout = self.ctx.config.modal_timeout();

        match kind {
            InteractionKind::BlockActions if wait_for_modal => {
                let view = waiter.wait(timeout).await?;
                open_modal(&self.views, &self.surface, view);
                Ok(ActionOutcome::ModalOpened)
            }
            InteractionKind::BlockActions => {
                self.await_modal_in_background(waiter, timeout);
                Ok(ActionOutcome::Dispatched)
            }
            InteractionKind::ViewSubmission => {
                // the stack change comes first; a modal opened on the
                // submission's trigger lands on top of the result
                let outcome = self.apply_submission_response(&response.body);
                self.await_modal_in_background(waiter, timeout);
                Ok(outcome)
            }
        }
    }
}
