//! Session hooks and UI bindings

use std::sync::Arc;

use crate::error::StreamError;
use crate::params::StreamParams;
use crate::ui::{ContentSink, MessageList, ScrollContainer, StatusSink, SubmitControl, Visibility};

/// What a message hook gets to see alongside the chunk
pub struct ChunkContext<'a> {
    /// Id of the bubble created for this stream, in counted-message mode
    pub message_id: Option<&'a str>,
    /// Sink the default handler would have appended to
    pub content: Option<&'a dyn ContentSink>,
}

type StartHook = Box<dyn FnMut(&StreamParams) + Send>;
type MessageHook = Box<dyn FnMut(&str, &ChunkContext<'_>) + Send>;
type ErrorHook = Box<dyn FnMut(&StreamError) + Send>;
type EndHook = Box<dyn FnMut() + Send>;

/// Optional callbacks fired by the session
///
/// A message hook replaces the default append entirely.
#[derive(Default)]
pub struct SessionHooks {
    pub(crate) on_start: Option<StartHook>,
    pub(crate) on_message: Option<MessageHook>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) on_end: Option<EndHook>,
}

impl SessionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl FnMut(&StreamParams) + Send + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_message(
        mut self,
        hook: impl FnMut(&str, &ChunkContext<'_>) + Send + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnMut(&StreamError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn on_end(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Sinks the session updates; every one is optional
#[derive(Clone, Default)]
pub struct SessionUi {
    pub submit: Option<Arc<dyn SubmitControl>>,
    pub status: Option<Arc<dyn StatusSink>>,
    pub typing: Option<Arc<dyn Visibility>>,
    pub result: Option<Arc<dyn ContentSink>>,
    pub scroll: Option<Arc<dyn ScrollContainer>>,
    /// Receives a new bubble per stream in counted-message mode
    pub messages: Option<Arc<dyn MessageList>>,
}

impl SessionUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit(mut self, submit: Arc<dyn SubmitControl>) -> Self {
        self.submit = Some(submit);
        self
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_typing(mut self, typing: Arc<dyn Visibility>) -> Self {
        self.typing = Some(typing);
        self
    }

    pub fn with_result(mut self, result: Arc<dyn ContentSink>) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_scroll(mut self, scroll: Arc<dyn ScrollContainer>) -> Self {
        self.scroll = Some(scroll);
        self
    }

    pub fn with_messages(mut self, messages: Arc<dyn MessageList>) -> Self {
        self.messages = Some(messages);
        self
    }
}
