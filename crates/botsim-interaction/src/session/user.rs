//! A synthetic user driving the application.

use botsim_core::page::{Page, Surface};
use botsim_core::rendezvous::HomeReceiver;
use botsim_core::store::User;
use botsim_core::view::View;
use botsim_core::{BotsimError, Result};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};

use super::actions::SessionActions;
use super::message::{MessageView, Messages};
use super::{SessionContext, ViewStack};
use crate::payload::{Event, EventEnvelope};

/// One user's view of the application: home tab, modal stack and the
/// messages addressed to them.
///
/// Derefs to the current [`Page`], so the label DSL is called directly on
/// the session:
///
/// ```ignore
/// let mut alice = harness.user("u1");
/// alice.open_home_tab().await?;
/// alice.click_by_label("New", true).await?;
/// alice.type_text("Review title", "Q3")?;
/// alice.submit().await?;
/// ```
#[derive(Debug)]
pub struct UserSession {
    user_id: String,
    ctx: Arc<SessionContext>,
    views: Arc<Mutex<ViewStack>>,
    actions: SessionActions,
    page: Page,
    home_rx: HomeReceiver,
}

impl UserSession {
    pub fn new(ctx: Arc<SessionContext>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let views = Arc::new(Mutex::new(ViewStack::default()));
        let page_surface = Surface::default();
        let actions = SessionActions::new(ctx.clone(), &user_id, views.clone(), page_surface.clone());
        let page = Page::with_surface(page_surface, Arc::new(actions.clone()));
        let home_rx = ctx.platform.home.subscribe(&user_id);

        Self {
            user_id,
            ctx,
            views,
            actions,
            page,
            home_rx,
        }
    }

    fn views(&self) -> MutexGuard<'_, ViewStack> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user(&self) -> User {
        self.ctx.user(&self.user_id)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// The last home view received.
    pub fn home(&self) -> Option<View> {
        self.views().home.clone()
    }

    pub fn top_modal(&self) -> Option<View> {
        self.views().top().cloned()
    }

    pub fn modal_depth(&self) -> usize {
        self.views().depth()
    }

    /// Opens the home tab: sends `app_home_opened` and waits for the
    /// application to publish the home view.
    ///
    /// Home views published before this call are discarded first. Open
    /// modals are closed.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn open_home_tab(&mut self) -> Result<&mut Page> {
        self.home_rx.drain_stale().await;

        let envelope = EventEnvelope::callback(
            self.ctx.platform.team_id.clone(),
            Event::app_home_opened(&self.user_id),
        );
        let transport = self.ctx.transport.clone();
        let mut dispatch = tokio::spawn(async move { transport.push_event(&envelope).await });
        let timeout = self.ctx.config.home_timeout();

        let view = tokio::select! {
            view = self.home_rx.recv(timeout) => view?,
            joined = &mut dispatch => {
                joined
                    .map_err(|e| BotsimError::internal(format!("event dispatch task: {e}")))??;
                // delivered; the publish may still be on its way
                self.home_rx.recv(timeout).await?
            }
        };

        debug!("home tab opened");
        {
            let mut views = self.views();
            views.clear();
            views.home = Some(view.clone());
        }
        self.page.set(view.blocks);
        Ok(&mut self.page)
    }

    /// Waits for the next home publish without dispatching anything.
    ///
    /// The page is redrawn only while no modal is open.
    pub async fn wait_home_update(&mut self) -> Result<&mut Page> {
        let view = self.home_rx.recv(self.ctx.config.home_timeout()).await?;
        let show = {
            let mut views = self.views();
            views.home = Some(view.clone());
            views.depth() == 0
        };
        if show {
            self.page.set(view.blocks);
        }
        Ok(&mut self.page)
    }

    /// Messages posted to this user's channel, each with a fresh page.
    pub fn messages(&self) -> Messages {
        let timeout = self.ctx.config.message_timeout();
        Messages::new(
            self.ctx
                .platform
                .messages
                .list(&self.user_id)
                .into_iter()
                .map(|record| MessageView::new(record, &self.actions, timeout))
                .collect(),
        )
    }

    pub async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl Deref for UserSession {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl DerefMut for UserSession {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.page
    }
}
