//! The single authenticated request/ack channel to the backend.

pub mod fake;
pub mod socket;

pub use fake::FakeChannel;
pub use socket::SocketChannel;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors produced by the channel itself, before any operation-level
/// interpretation of the ack.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Connection to the server was lost")]
    ConnectionClosed,

    /// The ack arrived with `success: false`; carries the server message.
    #[error("{0}")]
    Rejected(String),

    /// The server refused the session; the caller must route back to login.
    #[error("Session was rejected by the server")]
    SessionRejected,

    #[error("Malformed server ack: {0}")]
    MalformedAck(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Wire encoding failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A named request/ack pair over the persistent connection.
///
/// Each request resolves exactly once with the raw ack value. No ordering is
/// guaranteed between two independently issued requests, and a request cannot
/// be cancelled once sent.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn request(&self, op: &str, payload: Value) -> Result<Value, ChannelError>;
}
