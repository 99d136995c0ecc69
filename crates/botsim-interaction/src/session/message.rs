//! Messages as seen by a user session.

use botsim_core::Result;
use botsim_core::page::Page;
use botsim_core::store::MessageRecord;
use std::ops::{Deref, DerefMut, Index};
use std::sync::Arc;
use std::time::Duration;

use super::actions::{MessageOrigin, SessionActions};

/// One message with its own page.
///
/// Actions taken on the page carry the message's response URL; modals they
/// open land on the owning session's stack.
#[derive(Debug)]
pub struct MessageView {
    record: Arc<MessageRecord>,
    page: Page,
    timeout: Duration,
}

impl MessageView {
    pub(crate) fn new(record: Arc<MessageRecord>, session: &SessionActions, timeout: Duration) -> Self {
        let content = record.content();
        let handler = session.for_message(MessageOrigin {
            channel: record.channel().to_string(),
            ts: record.ts().to_string(),
            text: content.text,
        });
        let page = Page::new(Arc::new(handler));
        page.set(content.blocks);
        Self {
            record,
            page,
            timeout,
        }
    }

    pub fn channel(&self) -> &str {
        self.record.channel()
    }

    pub fn ts(&self) -> &str {
        self.record.ts()
    }

    pub fn text(&self) -> String {
        self.record.content().text
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Waits for the application to edit this message, then redraws.
    pub async fn wait_update(&mut self) -> Result<&mut Page> {
        self.record.wait_update(self.timeout).await?;
        self.page.set(self.record.blocks());
        Ok(&mut self.page)
    }
}

impl Deref for MessageView {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl DerefMut for MessageView {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.page
    }
}

/// A snapshot of a channel's messages in posting order.
#[derive(Debug, Default)]
pub struct Messages(Vec<MessageView>);

impl Messages {
    pub(crate) fn new(views: Vec<MessageView>) -> Self {
        Self(views)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MessageView> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MessageView> {
        self.0.get_mut(index)
    }

    /// The most recently posted message.
    pub fn last(&self) -> Option<&MessageView> {
        self.0.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut MessageView> {
        self.0.last_mut()
    }

    /// Takes the most recently posted message out of the snapshot.
    pub fn into_last(mut self) -> Option<MessageView> {
        self.0.pop()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageView> {
        self.0.iter()
    }
}

impl Index<usize> for Messages {
    type Output = MessageView;

    fn index(&self, index: usize) -> &MessageView {
        &self.0[index]
    }
}

impl IntoIterator for Messages {
    type Item = MessageView;
    type IntoIter = std::vec::IntoIter<MessageView>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
