//! SSE (Server-Sent Events) wire decoding
//!
//! Turns raw body chunks into dispatched events. Chunks may split lines (and
//! UTF-8 sequences) anywhere, so incomplete lines are carried over.

use bytes::Bytes;
use tracing::{debug, warn};

/// Longest line kept while waiting for its newline
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from the `event:` field; `None` for plain messages
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

/// Incremental SSE decoder that handles partial lines and multi-line data
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes after the last newline of the previous chunk
    partial_line: Vec<u8>,
    /// Event name of the frame being assembled
    event: Option<String>,
    /// Data of the frame being assembled
    data: String,
    /// Whether any `data:` field was seen for the frame being assembled
    has_data: bool,
    /// Dropping the rest of an overlong line until its newline
    skipping_line: bool,
    /// Frames dispatched so far
    frame_count: usize,
    bytes_received: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every frame it completes
    pub fn push(&mut self, bytes: &Bytes) -> Vec<SseFrame> {
        self.bytes_received += bytes.len();
        self.partial_line.extend_from_slice(bytes);

        let mut start = 0;
        if self.skipping_line {
            match self.partial_line.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    start = pos + 1;
                    self.skipping_line = false;
                }
                None => {
                    self.partial_line.clear();
                    return Vec::new();
                }
            }
        }

        let mut frames = Vec::new();
        while let Some(offset) = self.partial_line[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let raw = &self.partial_line[start..end];
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw).into_owned();
            start = end + 1;
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        self.partial_line.drain(..start);

        if self.partial_line.len() > MAX_LINE_BYTES {
            warn!(
                "Dropping SSE line longer than {} bytes without a newline",
                MAX_LINE_BYTES
            );
            self.partial_line.clear();
            self.skipping_line = true;
        }
        frames
    }

    /// Total frames dispatched
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn bytes_received(&self) -> usize {
        self.bytes_received
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        // Blank line dispatches the pending frame
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            "event" => {
                self.event = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "id" | "retry" => {
                debug!("Ignoring SSE field {}: {}", field, value);
            }
            _ => {
                debug!("Unknown SSE field: {}", field);
            }
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if !self.has_data {
            // Frames without data are dropped, but terminal events often
            // carry no payload, so keep named ones
            self.data.clear();
            return event.map(|event| {
                self.frame_count += 1;
                SseFrame {
                    event: Some(event),
                    data: String::new(),
                }
            });
        }

        self.has_data = false;
        self.frame_count += 1;
        Some(SseFrame {
            event,
            data: std::mem::take(&mut self.data),
        })
    }
}
