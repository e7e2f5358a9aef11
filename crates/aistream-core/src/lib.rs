//! aistream core library
//!
//! Manages one Server-Sent-Events stream per widget and renders the streamed
//! text into caller-supplied sinks. Used by the chat, translate, and weather
//! front ends.

pub mod config;
pub mod error;
pub mod params;
pub mod provider;
pub mod session;
pub mod spacing;
pub mod sse;
pub mod transport;
pub mod ui;
pub mod utils;

pub use config::{ButtonLabels, MarkupTrust, SessionConfig, SessionOverrides, StatusTexts};
pub use error::{ConfigError, FetchError, StreamError};
pub use params::StreamParams;
pub use session::{ChunkContext, SessionHooks, SessionUi, StreamSession};
pub use transport::{Connection, EventTransport, HttpEventTransport, TransportEvent};
