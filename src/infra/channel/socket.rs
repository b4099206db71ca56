//! Real transport: newline-delimited JSON frames over one TCP connection,
//! with acks routed back to their requests by correlation id.

use super::{Channel, ChannelError};
use crate::infra::session::Session;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

#[derive(Debug, Serialize)]
struct RequestFrame<'a> {
    id: u64,
    op: &'a str,
    payload: &'a Value,
}

#[derive(Debug, Deserialize)]
struct AckFrame {
    id: u64,
    ack: Value,
}

#[derive(Debug, Serialize)]
struct AuthFrame<'a> {
    auth: AuthPayload<'a>,
}

#[derive(Debug, Serialize)]
struct AuthPayload<'a> {
    token: &'a str,
}

type PendingAcks = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

impl From<LinesCodecError> for ChannelError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::Io(err) => ChannelError::Transport(err),
            LinesCodecError::MaxLineLengthExceeded => {
                ChannelError::MalformedAck("frame exceeds line limit".to_string())
            }
        }
    }
}

/// Request/ack channel over a single framed TCP connection.
///
/// Exactly one live transport exists per token value: a new token means
/// constructing a fresh `SocketChannel`, closing the previous one first.
pub struct SocketChannel {
    writer: tokio::sync::Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
    pending: PendingAcks,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl SocketChannel {
    /// Open the transport and perform the auth handshake for `session`.
    pub async fn connect(addr: &str, session: &Session) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        let mut writer = FramedWrite::new(write_half, LinesCodec::new());

        let auth = serde_json::to_string(&AuthFrame {
            auth: AuthPayload {
                token: session.token(),
            },
        })?;
        writer.send(auth).await?;
        log::debug!("channel connected to {addr}");

        let pending: PendingAcks = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let frames = FramedRead::new(read_half, LinesCodec::new());
        let reader = tokio::spawn(route_acks(
            frames,
            Arc::clone(&pending),
            Arc::clone(&closed),
        ));

        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
            pending,
            next_id: AtomicU64::new(1),
            closed,
            reader,
        })
    }

    /// Tear down the transport. Every outstanding request fails with
    /// [`ChannelError::ConnectionClosed`], and later requests fail the same
    /// way without parking a waiter.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.reader.abort();
        self.pending.lock().clear();
    }
}

impl Drop for SocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl Channel for SocketChannel {
    async fn request(&self, op: &str, payload: Value) -> Result<Value, ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::ConnectionClosed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&RequestFrame {
            id,
            op,
            payload: &payload,
        })?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        // Teardown may have raced the insert above; re-check so the waiter
        // cannot survive in a map nothing will drain again.
        if self.closed.load(Ordering::SeqCst) {
            self.pending.lock().remove(&id);
            return Err(ChannelError::ConnectionClosed);
        }

        log::debug!("-> {op} (request {id})");
        if let Err(err) = self.writer.lock().await.send(frame).await {
            self.pending.lock().remove(&id);
            return Err(err.into());
        }

        // The sender is dropped when the reader task dies or the channel is
        // closed, which wakes us with a RecvError.
        rx.await.map_err(|_| ChannelError::ConnectionClosed)
    }
}

async fn route_acks(
    mut frames: FramedRead<OwnedReadHalf, LinesCodec>,
    pending: PendingAcks,
    closed: Arc<AtomicBool>,
) {
    while let Some(line) = frames.next().await {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("transport read failed: {err}");
                break;
            }
        };
        match serde_json::from_str::<AckFrame>(&line) {
            Ok(frame) => {
                let waiter = pending.lock().remove(&frame.id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(frame.ack);
                    }
                    None => log::warn!("ack for unknown request id {}", frame.id),
                }
            }
            Err(err) => log::warn!("discarding malformed frame: {err}"),
        }
    }
    // Mark the transport dead before draining, so a racing request either
    // sees the flag or leaves a waiter for the clear below to drop.
    closed.store(true, Ordering::SeqCst);
    pending.lock().clear();
}
