//! Transports that deliver a session's progress messages.
//!
//! The poller only sees cumulative snapshots, so a push-style transport can
//! replace interval polling without touching rendering.

use crate::api::{ByteStream, TranslatorApi};
use crate::config::FeedKind;
use crate::error::{ClientError, ClientResult};
use crate::model::ProgressMessage;
use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[async_trait]
pub trait ProgressFeed: Send {
    /// Waits for the next update and returns every message seen so far, in
    /// server order.
    async fn next_snapshot(&mut self) -> ClientResult<Vec<ProgressMessage>>;
}

/// Builds the feed configured for `session_id`.
pub fn open_feed(
    kind: FeedKind,
    api: Arc<dyn TranslatorApi>,
    session_id: &str,
    poll_interval: Duration,
) -> Box<dyn ProgressFeed> {
    match kind {
        FeedKind::Polling => Box::new(PollingFeed::new(api, session_id, poll_interval)),
        FeedKind::Stream => Box::new(StreamFeed::new(api, session_id)),
    }
}

/// Re-fetches the full message list once per interval. The first fetch
/// happens one interval after creation.
pub struct PollingFeed {
    api: Arc<dyn TranslatorApi>,
    session_id: String,
    ticker: Interval,
}

impl PollingFeed {
    pub fn new(api: Arc<dyn TranslatorApi>, session_id: &str, period: Duration) -> Self {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            api,
            session_id: session_id.to_string(),
            ticker,
        }
    }
}

#[async_trait]
impl ProgressFeed for PollingFeed {
    async fn next_snapshot(&mut self) -> ClientResult<Vec<ProgressMessage>> {
        self.ticker.tick().await;
        self.api.session_messages(&self.session_id).await
    }
}

/// Follows the server's `data: <json>` event stream and accumulates the
/// messages into snapshots.
pub struct StreamFeed {
    api: Arc<dyn TranslatorApi>,
    session_id: String,
    stream: Option<ByteStream>,
    pending: Vec<u8>,
    messages: Vec<ProgressMessage>,
}

impl StreamFeed {
    pub fn new(api: Arc<dyn TranslatorApi>, session_id: &str) -> Self {
        Self {
            api,
            session_id: session_id.to_string(),
            stream: None,
            pending: Vec::new(),
            messages: Vec::new(),
        }
    }
}

#[async_trait]
impl ProgressFeed for StreamFeed {
    async fn next_snapshot(&mut self) -> ClientResult<Vec<ProgressMessage>> {
        if self.stream.is_none() {
            debug!("opening progress stream for session {}", self.session_id);
            self.stream = Some(self.api.progress_stream(&self.session_id).await?);
        }

        loop {
            let fresh = drain_frames(&mut self.pending)?;
            if !fresh.is_empty() {
                self.messages.extend(fresh);
                return Ok(self.messages.clone());
            }

            let Some(stream) = self.stream.as_mut() else {
                return Err(ClientError::Network("progress stream unavailable".into()));
            };
            match stream.next().await {
                Some(chunk) => self.pending.extend(chunk?),
                None => {
                    self.stream = None;
                    return Err(ClientError::Network("progress stream closed".into()));
                }
            }
        }
    }
}

/// Removes every complete frame (terminated by a blank line) from `buffer`
/// and decodes its `data:` lines. Both `\n` and `\r\n` line endings are
/// accepted.
pub fn drain_frames(buffer: &mut Vec<u8>) -> ClientResult<Vec<ProgressMessage>> {
    buffer.retain(|byte| *byte != b'\r');
    let mut messages = Vec::new();
    while let Some(end) = buffer.windows(2).position(|pair| pair == b"\n\n") {
        let frame: Vec<u8> = buffer.drain(..end + 2).collect();
        let frame = String::from_utf8_lossy(&frame);
        for line in frame.lines() {
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    messages.push(serde_json::from_str(data)?);
                }
            }
        }
    }
    Ok(messages)
}
