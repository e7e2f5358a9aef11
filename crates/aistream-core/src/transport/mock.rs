//! Test doubles: a channel-backed transport and a one-shot HTTP server

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{Connection, EventTransport, TransportEvent};

struct OpenedConnection {
    url: String,
    tx: mpsc::UnboundedSender<TransportEvent>,
    cancel: CancellationToken,
}

/// Records every connection and lets the test push events into it
#[derive(Default)]
pub(crate) struct MockTransport {
    opened: Mutex<Vec<OpenedConnection>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.opened.lock().iter().map(|c| c.url.clone()).collect()
    }

    /// Push an event into the most recent connection
    pub fn emit(&self, event: TransportEvent) {
        let opened = self.opened.lock();
        let conn = opened.last().expect("no connection opened");
        let _ = conn.tx.send(event);
    }

    pub fn emit_message(&self, data: &str) {
        self.emit(TransportEvent::Message {
            event: None,
            data: data.to_string(),
        });
    }

    pub fn emit_named(&self, event: &str) {
        self.emit(TransportEvent::Message {
            event: Some(event.to_string()),
            data: String::new(),
        });
    }

    /// Whether connection `index` was closed by its owner
    pub fn is_closed(&self, index: usize) -> bool {
        self.opened.lock()[index].cancel.is_cancelled()
    }
}

impl EventTransport for MockTransport {
    fn connect(&self, url: &str) -> Connection {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        self.opened.lock().push(OpenedConnection {
            url: url.to_string(),
            tx,
            cancel: cancel.clone(),
        });
        Connection::new(url, rx, cancel)
    }
}

/// Read one request (head and `content-length` body) off the socket
async fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let body_len = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= head_end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&request).into_owned()
}

/// Serve canned HTTP responses, one connection each, in order
///
/// Returns the base URL and a handle resolving to the full requests the
/// client sent.
pub(crate) async fn serve_sequence(
    responses: Vec<&'static str>,
) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        requests
    });
    (format!("http://{}", addr), handle)
}

/// Serve one canned HTTP response on a loopback port
///
/// Returns the base URL and a handle resolving to the request line the
/// client sent.
pub(crate) async fn serve_once(
    response: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let (base, requests) = serve_sequence(vec![response]).await;
    let handle = tokio::spawn(async move {
        let requests = requests.await.unwrap();
        requests[0].lines().next().unwrap_or_default().to_string()
    });
    (base, handle)
}
