//! Stream session
//!
//! One session per widget, at most one live connection per session.
//!
//! ```text
//! Idle --start_stream--> Connecting --open--> Streaming --chunk--> Streaming
//!                             |                   |
//!                             +--error/timeout----+--done/complete--> Ending --> Idle
//! ```
//!
//! Every way out (terminal event, transport error, timeout) goes through
//! `end_stream`. The host drives the session with [`StreamSession::next_event`]
//! or [`StreamSession::run_to_end`]; transport I/O happens on a separate task
//! and only reaches the session through its connection channel.

mod hooks;

pub use hooks::{ChunkContext, SessionHooks, SessionUi};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ConfigError, StreamError};
use crate::params::{build_request_url, StreamParams};
use crate::spacing::append_chunk;
use crate::transport::{Connection, EventTransport, TransportEvent};
use crate::ui::{ContentSink, MessageRole};

/// Named events that end a stream normally
const TERMINAL_EVENTS: [&str; 2] = ["done", "complete"];

/// Prefix of generated bubble ids
pub const MESSAGE_ID_PREFIX: &str = "aiResponse_";

enum Step {
    Event(Option<TransportEvent>),
    Timeout,
}

pub struct StreamSession {
    config: SessionConfig,
    ui: SessionUi,
    hooks: SessionHooks,
    transport: Arc<dyn EventTransport>,
    connection: Option<Connection>,
    is_active: bool,
    /// Armed timeout, only set while active
    deadline: Option<Instant>,
    current_message_id: Option<String>,
    /// Bubble receiving this stream's chunks in counted-message mode
    current_content: Option<Arc<dyn ContentSink>>,
    message_counter: u64,
    /// Bumped on start and destroy so stale delayed status clears no-op
    generation: Arc<AtomicU64>,
}

impl StreamSession {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn EventTransport>,
        ui: SessionUi,
        hooks: SessionHooks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ui,
            hooks,
            transport,
            connection: None,
            is_active: false,
            deadline: None,
            current_message_id: None,
            current_content: None,
            message_counter: 0,
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin streaming `params` from `endpoint` (or the configured endpoint)
    ///
    /// Dropped without effect while a stream is already active. Must be called
    /// from within a Tokio runtime.
    pub fn start_stream(&mut self, params: StreamParams, endpoint: Option<&str>) {
        if self.is_active {
            info!("Stream already active, ignoring new request");
            return;
        }

        info!("Starting stream: {}", params);
        self.is_active = true;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.set_busy(true);
        self.update_status(&self.config.status_texts.connecting);
        self.set_typing(true);

        if self.config.message_counter {
            self.create_message_container();
        }

        self.close_connection();

        let endpoint = endpoint.unwrap_or(&self.config.endpoint);
        let url = build_request_url(endpoint, &params, &self.config.message_param);
        debug!("Opening event stream: {}", url);
        self.connection = Some(self.transport.connect(&url));

        self.setup_timeout();

        if let Some(hook) = self.hooks.on_start.as_mut() {
            hook(&params);
        }
    }

    /// Wait for the next transport event or the timeout and apply it
    ///
    /// Returns whether the session is still streaming afterwards. Returns
    /// `false` immediately when idle.
    pub async fn next_event(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        let Some(connection) = self.connection.as_mut() else {
            warn!("Active session without a connection, ending stream");
            self.end_stream();
            return false;
        };

        let deadline = self.deadline;
        let step = tokio::select! {
            biased;
            event = connection.recv() => Step::Event(event),
            _ = wait_until(deadline) => Step::Timeout,
        };

        match step {
            Step::Event(Some(event)) => self.handle_event(event),
            Step::Event(None) => self.handle_error(StreamError::Closed),
            Step::Timeout => {
                let ms = self.config.timeout_ms.max(0) as u64;
                warn!("Stream timed out after {} ms", ms);
                self.handle_error(StreamError::Timeout(ms));
            }
        }
        self.is_active
    }

    /// Drive the current stream until it ends
    pub async fn run_to_end(&mut self) {
        while self.next_event().await {}
    }

    /// Close the live connection, if any. Idempotent.
    pub fn close_connection(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("Closing event stream: {}", connection.url());
            connection.close();
        }
    }

    /// Arm the timeout; no-op when idle or when the timeout is disabled
    pub fn setup_timeout(&mut self) {
        if !self.is_active {
            return;
        }
        self.deadline = self.config.timeout().map(|timeout| Instant::now() + timeout);
    }

    pub fn clear_timeout(&mut self) {
        self.deadline = None;
    }

    /// Tear down early, e.g. when the owning widget goes away
    ///
    /// No hooks fire and no pending status clear runs afterwards.
    pub fn destroy(&mut self) {
        debug!("Destroying stream session");
        self.close_connection();
        self.clear_timeout();
        self.is_active = false;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_message_id(&self) -> Option<&str> {
        self.current_message_id.as_deref()
    }

    pub fn is_currently_streaming(&self) -> bool {
        self.is_active
    }

    /// Append a finished bubble (e.g. the user's own message)
    pub fn add_message(&self, content: &str, role: MessageRole) {
        let Some(list) = &self.ui.messages else {
            return;
        };
        list.append_message(None, role).append_text(content);
        self.scroll_to_bottom();
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => {
                info!("Event stream opened");
                self.update_status(&self.config.status_texts.connected);
                self.set_typing(false);
            }
            TransportEvent::Message { event, data } => match event.as_deref() {
                None | Some("message") => {
                    if self.config.done_sentinel.as_deref() == Some(data.as_str()) {
                        info!("Done sentinel received");
                        self.end_stream();
                    } else {
                        self.handle_message(&data);
                    }
                }
                Some(name) if TERMINAL_EVENTS.contains(&name) => {
                    info!("Terminal event received: {}", name);
                    self.end_stream();
                }
                Some(name) => {
                    debug!("Ignoring SSE event: {}", name);
                }
            },
            TransportEvent::Error(error) => self.handle_error(error),
        }
    }

    fn handle_message(&mut self, data: &str) {
        debug!("Chunk received: {} chars", data.len());
        let content = self.content_sink();

        if let Some(hook) = self.hooks.on_message.as_mut() {
            let context = ChunkContext {
                message_id: self.current_message_id.as_deref(),
                content: content.as_deref(),
            };
            hook(data, &context);
        } else if let Some(sink) = content.as_deref() {
            append_chunk(sink, data, self.config.smart_spacing, self.config.markup);
        }

        if self.config.auto_scroll {
            self.scroll_to_bottom();
        }
    }

    fn handle_error(&mut self, error: StreamError) {
        warn!("Stream error ({}): {}", error.kind(), error);
        self.update_status(&self.config.status_texts.error);
        self.set_typing(false);

        if self.config.show_error_in_result {
            if let Some(sink) = self.content_sink() {
                sink.append_text(&format!("\n{}", self.config.error_message));
            }
        }

        if let Some(hook) = self.hooks.on_error.as_mut() {
            hook(&error);
        }

        self.end_stream();
    }

    fn end_stream(&mut self) {
        info!("Ending stream");
        self.close_connection();
        self.clear_timeout();
        self.is_active = false;
        self.set_busy(false);
        self.update_status(&self.config.status_texts.complete);

        if let Some(hook) = self.hooks.on_end.as_mut() {
            hook();
        }

        self.schedule_status_clear();
    }

    /// Clear the status line after the configured delay, unless another
    /// stream started (or the session was destroyed) in the meantime
    fn schedule_status_clear(&self) {
        let Some(status) = self.ui.status.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No Tokio runtime, status will not be cleared");
            return;
        };

        let generation = Arc::clone(&self.generation);
        let expected = generation.load(Ordering::SeqCst);
        let delay = self.config.status_clear_delay();
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == expected {
                status.set_text("");
            } else {
                debug!("Skipping stale status clear");
            }
        });
    }

    fn create_message_container(&mut self) {
        self.message_counter += 1;
        let id = format!("{}{}", MESSAGE_ID_PREFIX, self.message_counter);
        self.current_content = self
            .ui
            .messages
            .as_ref()
            .map(|list| list.append_message(Some(&id), MessageRole::Ai));
        self.current_message_id = Some(id);
        self.scroll_to_bottom();
    }

    /// Bubble for this stream, else the shared result sink
    fn content_sink(&self) -> Option<Arc<dyn ContentSink>> {
        self.current_content
            .clone()
            .or_else(|| self.ui.result.clone())
    }

    fn set_busy(&self, busy: bool) {
        let Some(submit) = &self.ui.submit else {
            return;
        };
        let labels = &self.config.button_labels;
        submit.set_enabled(!busy);
        submit.set_label(if busy { &labels.busy } else { &labels.idle });
    }

    fn update_status(&self, text: &str) {
        if let Some(status) = &self.ui.status {
            status.set_text(text);
        }
    }

    fn set_typing(&self, visible: bool) {
        if let Some(typing) = &self.ui.typing {
            typing.set_visible(visible);
        }
    }

    fn scroll_to_bottom(&self) {
        if let Some(scroll) = &self.ui.scroll {
            scroll.scroll_to_bottom();
        }
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("endpoint", &self.config.endpoint)
            .field("is_active", &self.is_active)
            .field("connection", &self.connection)
            .field("deadline", &self.deadline)
            .field("current_message_id", &self.current_message_id)
            .field("hooks", &self.hooks)
            .finish()
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::ui::memory::{
        MemoryContent, MemoryControl, MemoryFlag, MemoryMessageList, MemoryScroll, MemoryStatus,
    };

    struct Harness {
        transport: Arc<MockTransport>,
        submit: Arc<MemoryControl>,
        status: Arc<MemoryStatus>,
        typing: Arc<MemoryFlag>,
        result: Arc<MemoryContent>,
        scroll: Arc<MemoryScroll>,
        messages: Arc<MemoryMessageList>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                transport: Arc::new(MockTransport::new()),
                submit: Arc::new(MemoryControl::new("Send")),
                status: Arc::new(MemoryStatus::new()),
                typing: Arc::new(MemoryFlag::new(false)),
                result: Arc::new(MemoryContent::new()),
                scroll: Arc::new(MemoryScroll::new(480)),
                messages: Arc::new(MemoryMessageList::new()),
            }
        }

        fn ui(&self) -> SessionUi {
            SessionUi::new()
                .with_submit(self.submit.clone())
                .with_status(self.status.clone())
                .with_typing(self.typing.clone())
                .with_result(self.result.clone())
                .with_scroll(self.scroll.clone())
                .with_messages(self.messages.clone())
        }

        fn session(&self, config: SessionConfig, hooks: SessionHooks) -> StreamSession {
            StreamSession::new(config, self.transport.clone(), self.ui(), hooks).unwrap()
        }
    }

    /// Hooks that record what fired, in order
    fn recording_hooks() -> (SessionHooks, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (start, error, end) = (log.clone(), log.clone(), log.clone());
        let hooks = SessionHooks::new()
            .on_start(move |params| start.lock().push(format!("start:{}", params)))
            .on_error(move |err| error.lock().push(format!("error:{}", err.kind())))
            .on_end(move || end.lock().push("end".to_string()));
        (hooks, log)
    }

    #[tokio::test]
    async fn test_start_stream_sets_loading_state() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("hi"), None);

        assert!(session.is_currently_streaming());
        assert_eq!(h.transport.urls(), vec!["/chat/stream?message=hi"]);
        assert!(!h.submit.is_enabled());
        assert_eq!(h.submit.label(), "Sending...");
        assert_eq!(h.status.text(), "Connecting...");
        assert!(h.typing.is_visible());
        assert!(session.deadline.is_some());
        assert_eq!(*log.lock(), vec!["start:message(2 chars)"]);
    }

    #[tokio::test]
    async fn test_start_while_active_is_ignored() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("first"), None);
        let status_before = h.status.history();
        session.start_stream(StreamParams::message("second"), None);

        assert_eq!(h.transport.connect_count(), 1);
        assert!(!h.transport.is_closed(0));
        assert_eq!(h.status.history(), status_before);
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_full_lifecycle_with_done() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit(TransportEvent::Open);
        h.transport.emit_message("Hello");
        h.transport.emit_message("World");
        h.transport.emit_named("done");

        assert!(session.next_event().await);
        assert_eq!(h.status.text(), "Connected, receiving reply...");
        assert!(!h.typing.is_visible());

        assert!(session.next_event().await);
        assert!(session.next_event().await);
        assert_eq!(h.result.text(), "Hello World");
        assert_eq!(h.scroll.scroll_top(), 480);

        assert!(!session.next_event().await);
        assert!(!session.is_currently_streaming());
        assert!(h.transport.is_closed(0));
        assert!(session.connection.is_none());
        assert!(session.deadline.is_none());
        assert!(h.submit.is_enabled());
        assert_eq!(h.submit.label(), "Send");
        assert_eq!(h.status.text(), "Done");
        assert_eq!(*log.lock(), vec!["start:message(2 chars)", "end"]);

        // Idle sessions return immediately
        assert!(!session.next_event().await);
    }

    #[tokio::test]
    async fn test_complete_event_ends_stream() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::translate(), SessionHooks::new());

        session.start_stream(StreamParams::translate("hi", "fr"), None);
        h.transport.emit(TransportEvent::Open);
        h.transport.emit_message("salut");
        h.transport.emit_named("complete");
        session.run_to_end().await;

        assert_eq!(h.transport.urls(), vec!["/translate/stream?text=hi&targetLang=fr"]);
        assert_eq!(h.result.text(), "salut");
        assert!(!session.is_currently_streaming());
        assert_eq!(h.submit.label(), "🔄 Translate");
    }

    #[tokio::test]
    async fn test_transport_error_path() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit(TransportEvent::Open);
        h.transport.emit_message("partial");
        h.transport
            .emit(TransportEvent::Error(StreamError::Transport("reset".into())));
        session.run_to_end().await;

        assert!(!session.is_currently_streaming());
        assert!(h.transport.is_closed(0));
        assert_eq!(h.result.text(), "partial\nRequest failed, please retry");
        let history = h.status.history();
        assert_eq!(
            &history[history.len() - 2..],
            ["Connection error, please retry", "Done"]
        );
        assert!(h.submit.is_enabled());
        assert_eq!(
            *log.lock(),
            vec!["start:message(2 chars)", "error:error", "end"]
        );
    }

    #[tokio::test]
    async fn test_error_message_can_be_suppressed() {
        let h = Harness::new();
        let config = SessionConfig {
            show_error_in_result: false,
            ..SessionConfig::default()
        };
        let mut session = h.session(config, SessionHooks::new());

        session.start_stream(StreamParams::message("hi"), None);
        h.transport
            .emit(TransportEvent::Error(StreamError::HttpStatus(503)));
        session.run_to_end().await;

        assert_eq!(h.result.text(), "");
        assert!(!session.is_currently_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_error_path() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let config = SessionConfig {
            timeout_ms: 1_000,
            ..SessionConfig::default()
        };
        let mut session = h.session(config, hooks);

        let started = Instant::now();
        session.start_stream(StreamParams::weather("Paris"), Some("/weather/stream"));
        h.transport.emit(TransportEvent::Open);
        h.transport.emit_message("Sunny");

        // Open and the chunk do not disarm the timer
        assert!(session.next_event().await);
        assert!(session.next_event().await);
        assert!(!session.next_event().await);

        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert!(h.transport.is_closed(0));
        assert!(!session.is_currently_streaming());
        assert_eq!(
            *log.lock(),
            vec!["start:weather(Paris)", "error:timeout", "end"]
        );
    }

    #[tokio::test]
    async fn test_timeout_disabled() {
        let h = Harness::new();
        let config = SessionConfig {
            timeout_ms: 0,
            ..SessionConfig::default()
        };
        let mut session = h.session(config, SessionHooks::new());
        session.start_stream(StreamParams::message("hi"), None);
        assert!(session.deadline.is_none());
    }

    #[tokio::test]
    async fn test_setup_timeout_requires_active_stream() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());
        session.setup_timeout();
        assert!(session.deadline.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_mid_stream() {
        let h = Harness::new();
        let (hooks, log) = recording_hooks();
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit(TransportEvent::Open);
        assert!(session.next_event().await);

        session.destroy();
        assert!(!session.is_currently_streaming());
        assert!(h.transport.is_closed(0));
        assert!(session.deadline.is_none());

        let status_before = h.status.history();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!session.next_event().await);
        assert_eq!(h.status.history(), status_before);
        assert_eq!(*log.lock(), vec!["start:message(2 chars)"]);

        // Safe to call again
        session.close_connection();
        session.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_cleared_after_delay() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit_named("done");
        session.run_to_end().await;
        assert_eq!(h.status.text(), "Done");

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(h.status.text(), "Done");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.status.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_status_clear_does_not_blank_new_stream() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());

        session.start_stream(StreamParams::message("one"), None);
        h.transport.emit_named("done");
        session.run_to_end().await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        session.start_stream(StreamParams::message("two"), None);
        assert_eq!(h.status.text(), "Connecting...");

        // First stream's clear would have fired at 3s
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(h.status.text(), "Connecting...");

        h.transport.emit_named("done");
        session.run_to_end().await;
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(h.status.text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_cancels_pending_status_clear() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit_named("done");
        session.run_to_end().await;
        session.destroy();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.status.text(), "Done");
    }

    #[tokio::test]
    async fn test_message_hook_replaces_default_append() {
        let h = Harness::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_hook = seen.clone();
        let hooks = SessionHooks::new().on_message(move |chunk, ctx| {
            seen_hook
                .lock()
                .push((chunk.to_string(), ctx.content.is_some()));
        });
        let mut session = h.session(SessionConfig::default(), hooks);

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit_message("Hello");
        h.transport.emit_named("done");
        session.run_to_end().await;

        assert_eq!(*seen.lock(), vec![("Hello".to_string(), true)]);
        assert_eq!(h.result.text(), "");
        // Auto-scroll still runs
        assert_eq!(h.scroll.scroll_top(), 480);
    }

    #[tokio::test]
    async fn test_counted_messages_get_own_bubbles() {
        let h = Harness::new();
        let ids = Arc::new(Mutex::new(Vec::new()));
        let ids_hook = ids.clone();
        let hooks = SessionHooks::new().on_message(move |chunk, ctx| {
            ids_hook
                .lock()
                .push(ctx.message_id.map(str::to_string));
            if let Some(content) = ctx.content {
                content.append_text(chunk);
            }
        });
        let mut session = h.session(SessionConfig::chat(), hooks);
        assert_eq!(session.current_message_id(), None);

        session.start_stream(StreamParams::message("one"), None);
        assert_eq!(session.current_message_id(), Some("aiResponse_1"));
        h.transport.emit_message("first");
        h.transport.emit_named("done");
        session.run_to_end().await;

        session.start_stream(StreamParams::message("two"), None);
        assert_eq!(session.current_message_id(), Some("aiResponse_2"));
        h.transport.emit_message("second");
        h.transport.emit_named("done");
        session.run_to_end().await;

        assert_eq!(
            h.messages.find("aiResponse_1").unwrap().content.text(),
            "first"
        );
        assert_eq!(
            h.messages.find("aiResponse_2").unwrap().content.text(),
            "second"
        );
        assert_eq!(h.result.text(), "");
        assert_eq!(
            *ids.lock(),
            vec![
                Some("aiResponse_1".to_string()),
                Some("aiResponse_2".to_string())
            ]
        );
        // Previous connection was closed before the second opened
        assert!(h.transport.is_closed(0));
    }

    #[tokio::test]
    async fn test_done_sentinel_terminates() {
        let h = Harness::new();
        let config = SessionConfig {
            done_sentinel: Some("[DONE]".to_string()),
            ..SessionConfig::weather()
        };
        let mut session = h.session(config, SessionHooks::new());

        session.start_stream(StreamParams::weather("Oslo"), None);
        h.transport.emit_message("Cloudy");
        h.transport.emit_message("[DONE]");
        session.run_to_end().await;

        assert_eq!(h.result.text(), "Cloudy");
        assert!(!session.is_currently_streaming());
    }

    #[tokio::test]
    async fn test_sentinel_is_content_when_unset() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit_message("[DONE]");
        assert!(session.next_event().await);
        assert_eq!(h.result.text(), "[DONE]");
    }

    #[tokio::test]
    async fn test_unknown_named_event_is_ignored() {
        let h = Harness::new();
        let mut session = h.session(SessionConfig::default(), SessionHooks::new());

        session.start_stream(StreamParams::message("hi"), None);
        h.transport.emit(TransportEvent::Message {
            event: Some("heartbeat".to_string()),
            data: "ping".to_string(),
        });
        assert!(session.next_event().await);
        assert_eq!(h.result.text(), "");
    }

    #[tokio::test]
    async fn test_add_message() {
        let h = Harness::new();
        let session = h.session(SessionConfig::chat(), SessionHooks::new());

        session.add_message("<b>hello</b>", MessageRole::User);

        let messages = h.messages.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].id, None);
        assert_eq!(messages[0].content.text(), "<b>hello</b>");
        assert_eq!(h.scroll.scroll_top(), 480);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let h = Harness::new();
        let config = SessionConfig {
            endpoint: String::new(),
            ..SessionConfig::default()
        };
        let err = StreamSession::new(config, h.transport.clone(), h.ui(), SessionHooks::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyEndpoint);
    }
}
