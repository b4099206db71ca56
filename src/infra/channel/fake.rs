//! Deterministic in-memory channel for exercising the store and the form
//! without a live transport.

use super::{Channel, ChannelError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A scripted [`Channel`]: acks are queued per operation and consumed in FIFO
/// order, and every issued request is recorded for assertions.
///
/// Failures are scripted the way the server expresses them, as
/// `{"success": false, "error": ...}` acks. An operation with no scripted ack
/// resolves to [`ChannelError::ConnectionClosed`].
#[derive(Default)]
pub struct FakeChannel {
    script: Mutex<HashMap<String, VecDeque<Value>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the ack returned for the next `op` request.
    pub fn script_ack(&self, op: &str, ack: Value) {
        self.script
            .lock()
            .entry(op.to_string())
            .or_default()
            .push_back(ack);
    }

    /// Every request issued so far, in order, as `(op, payload)` pairs.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }

    /// Payload of the most recent request for `op`.
    pub fn last_request(&self, op: &str) -> Option<Value> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|(name, _)| name == op)
            .map(|(_, payload)| payload.clone())
    }

    /// Number of requests issued for `op`.
    pub fn request_count(&self, op: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|(name, _)| name == op)
            .count()
    }
}

#[async_trait]
impl Channel for FakeChannel {
    async fn request(&self, op: &str, payload: Value) -> Result<Value, ChannelError> {
        self.requests.lock().push((op.to_string(), payload));
        let scripted = self
            .script
            .lock()
            .get_mut(op)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(ack) => Ok(ack),
            None => {
                log::warn!("no scripted ack for {op}");
                Err(ChannelError::ConnectionClosed)
            }
        }
    }
}
