//! Streaming transport
//!
//! A transport opens one connection per URL and reports what happens on it
//! as [`TransportEvent`]s: `Open`, zero or more `Message`s, then at most one
//! `Error`. I/O runs off the session's task; the session only ever sees the
//! event channel.

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpEventTransport;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;

/// Something that happened on a streaming connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Server accepted the stream
    Open,
    /// A dispatched SSE event; `event` is `None` for unnamed messages
    Message { event: Option<String>, data: String },
    /// The connection failed or ended without a terminal event
    Error(StreamError),
}

/// Opens streaming connections
pub trait EventTransport: Send + Sync {
    /// Start connecting to `url` and return the handle immediately
    ///
    /// Failures are reported through the returned connection, never here.
    fn connect(&self, url: &str) -> Connection;
}

/// Handle to one live streaming connection
///
/// Dropping the handle closes the connection.
pub struct Connection {
    url: String,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    cancel: CancellationToken,
}

impl Connection {
    pub fn new(
        url: impl Into<String>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url: url.into(),
            events,
            cancel,
        }
    }

    /// A connection that fails as soon as it is polled
    pub fn failed(url: impl Into<String>, error: StreamError) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(TransportEvent::Error(error));
        Self::new(url, rx, CancellationToken::new())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Next event, or `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Stop the producer; later events are discarded
    pub fn close(self) {
        self.cancel.cancel();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("closed", &self.cancel.is_cancelled())
            .finish()
    }
}
