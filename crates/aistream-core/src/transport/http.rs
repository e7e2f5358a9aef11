//! HTTP SSE transport over reqwest

use std::time::Instant;

use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Url};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Connection, EventTransport, TransportEvent};
use crate::error::{ConfigError, StreamError};
use crate::sse::SseDecoder;

/// Opens `GET` event streams relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpEventTransport {
    client: Client,
    base_url: Url,
}

impl HttpEventTransport {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (or absolute URL) against the base
    pub fn resolve(&self, url: &str) -> Result<Url, StreamError> {
        self.base_url
            .join(url)
            .map_err(|e| StreamError::Transport(format!("invalid URL {}: {}", url, e)))
    }
}

impl EventTransport for HttpEventTransport {
    fn connect(&self, url: &str) -> Connection {
        let target = match self.resolve(url) {
            Ok(target) => target,
            Err(e) => {
                warn!("Cannot open event stream: {}", e);
                return Connection::failed(url, e);
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let client = self.client.clone();
        let token = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Event stream cancelled");
                }
                result = read_event_stream(&client, target, &tx) => {
                    if let Err(e) = result {
                        let _ = tx.send(TransportEvent::Error(e));
                    }
                }
            }
        });

        Connection::new(url, rx, cancel)
    }
}

/// Read the body to completion, forwarding frames as they complete
///
/// Returns `Ok` only when the receiver went away; a body that simply ends
/// is reported as [`StreamError::Closed`].
async fn read_event_stream(
    client: &Client,
    url: Url,
    tx: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), StreamError> {
    let started = Instant::now();
    info!("Opening event stream: {}", url);

    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|e| StreamError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        warn!("Event stream rejected with HTTP {}", status);
        return Err(StreamError::HttpStatus(status.as_u16()));
    }

    if tx.send(TransportEvent::Open).is_err() {
        return Ok(());
    }

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(|e| StreamError::Transport(e.to_string()))?;
        for frame in decoder.push(&bytes) {
            debug!(
                "SSE frame #{}: event={:?}, {} chars",
                decoder.frame_count(),
                frame.event,
                frame.data.len()
            );
            let event = TransportEvent::Message {
                event: frame.event,
                data: frame.data,
            };
            if tx.send(event).is_err() {
                return Ok(());
            }
        }
    }

    info!(
        "Event stream body ended after {:?}: {} frames, {} bytes",
        started.elapsed(),
        decoder.frame_count(),
        decoder.bytes_received()
    );
    Err(StreamError::Closed)
}
