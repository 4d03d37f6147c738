//! Scripted stand-in for the sensor link

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::time::Instant;

use fpterm_core::Packet;
use fpterm_transport::{Error, Result, Transport, settle_read};

enum Reply {
    Frame(Bytes),
    Partial(usize),
    Timeout,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    sent: Vec<(Instant, Bytes)>,
    connected: bool,
    delay: Duration,
    short_write: Option<usize>,
}

/// Replays queued replies in order and records every frame sent
///
/// Clones share the same script, so a test keeps one handle while the
/// sensor owns another. An exhausted script behaves like a silent module.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Already-open link
    pub fn new() -> Self {
        let transport = Self::default();
        transport.inner.lock().connected = true;
        transport
    }

    /// Link that still needs `connect`
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Queue an acknowledgement carrying only `code`
    pub fn ack(self, code: u8) -> Self {
        self.ack_with(&[code])
    }

    /// Queue an acknowledgement with a full payload
    pub fn ack_with(self, payload: &[u8]) -> Self {
        let frame = Packet::ack(payload.to_vec())
            .map(|packet| packet.encode().freeze())
            .unwrap_or_default();
        self.push(Reply::Frame(frame))
    }

    /// Queue a reply cut off after `len` bytes
    pub fn partial(self, len: usize) -> Self {
        self.push(Reply::Partial(len))
    }

    /// Queue silence
    pub fn timeout(self) -> Self {
        self.push(Reply::Timeout)
    }

    /// Make every reply take `delay` to arrive
    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.lock().delay = delay;
        self
    }

    /// Make the next send accept only `written` bytes
    pub fn short_write(self, written: usize) -> Self {
        self.inner.lock().short_write = Some(written);
        self
    }

    fn push(self, reply: Reply) -> Self {
        self.inner.lock().replies.push_back(reply);
        self
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.inner.lock().sent.iter().map(|(_, frame)| frame.clone()).collect()
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.inner.lock().sent.iter().map(|(at, _)| *at).collect()
    }

    /// Instruction byte of every frame sent so far
    pub fn sent_instructions(&self) -> Vec<u8> {
        self.inner
            .lock()
            .sent
            .iter()
            .filter_map(|(_, frame)| frame.get(Packet::HEADER_SIZE).copied())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> Result<()> {
        self.inner.lock().connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.inner.lock().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut script = self.inner.lock();
        if !script.connected {
            return Err(Error::NotConnected);
        }
        if let Some(written) = script.short_write.take() {
            return Err(Error::WriteIncomplete {
                written: written.min(data.len()),
                expected: data.len(),
            });
        }
        script.sent.push((Instant::now(), Bytes::copy_from_slice(data)));
        Ok(())
    }

    async fn receive(&mut self, expected_len: usize, timeout: Duration) -> Result<BytesMut> {
        let (reply, delay) = {
            let mut script = self.inner.lock();
            (script.replies.pop_front(), script.delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let buf = match reply {
            Some(Reply::Frame(frame)) => BytesMut::from(&frame[..]),
            Some(Reply::Partial(len)) => BytesMut::from(&vec![0xEF; len][..]),
            Some(Reply::Timeout) | None => BytesMut::new(),
        };

        settle_read(buf, expected_len, timeout)
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}
