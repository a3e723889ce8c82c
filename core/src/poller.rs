//! Progress poller: follows one session until a terminal message shows up.

use crate::event::{AppEvent, PollEvent};
use crate::feed::ProgressFeed;
use crate::model::{MessageKind, ProgressMessage};
use crate::render::{render_messages, MessageBlock};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

static DOWNLOAD_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"File: (.+)$").expect("valid download name regex"));

/// How a finished session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { download: Option<String> },
    Failed,
}

/// Result of one fetch: the freshly rendered region, and the outcome when the
/// sequence contained a terminal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub blocks: Vec<MessageBlock>,
    pub outcome: Option<Outcome>,
}

impl Tick {
    pub fn from_messages(messages: &[ProgressMessage]) -> Self {
        Self {
            blocks: render_messages(messages),
            outcome: outcome_of(messages),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// A terminal message anywhere ends polling, but only the last message
/// decides between success and failure.
pub fn outcome_of(messages: &[ProgressMessage]) -> Option<Outcome> {
    if !messages.iter().any(|message| message.kind.is_terminal()) {
        return None;
    }
    match messages.last() {
        Some(last) if last.kind == MessageKind::Success => Some(Outcome::Succeeded {
            download: download_name(last),
        }),
        _ => Some(Outcome::Failed),
    }
}

/// Prefers the structured `filename` field and falls back to a trailing
/// `File: <name>` in the text.
pub fn download_name(message: &ProgressMessage) -> Option<String> {
    if let Some(name) = message.filename.as_deref().filter(|name| !name.is_empty()) {
        return Some(name.to_string());
    }
    DOWNLOAD_NAME_PATTERN
        .captures(&message.text)
        .map(|caps| caps[1].to_string())
}

/// Drives `feed` until a terminal tick or a feed failure, reporting every
/// tick to `events`.
pub async fn run_poller(
    session_id: String,
    mut feed: Box<dyn ProgressFeed>,
    events: UnboundedSender<AppEvent>,
) {
    loop {
        let messages = match feed.next_snapshot().await {
            Ok(messages) => messages,
            Err(error) => {
                warn!("polling session {} failed: {}", session_id, error);
                let _ = events.send(AppEvent::Poll {
                    session_id,
                    event: PollEvent::Failed(error),
                });
                return;
            }
        };

        let tick = Tick::from_messages(&messages);
        let terminal = tick.is_terminal();
        debug!(
            "session {}: {} messages, terminal={}",
            session_id,
            messages.len(),
            terminal
        );

        if events
            .send(AppEvent::Poll {
                session_id: session_id.clone(),
                event: PollEvent::Tick(tick),
            })
            .is_err()
        {
            debug!("controller gone, stopping poller for {}", session_id);
            return;
        }

        if terminal {
            return;
        }
    }
}

/// Owned handle to a running poller. Dropping it stops the task.
#[derive(Debug)]
pub struct PollerHandle {
    session_id: String,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn spawn(
        session_id: &str,
        feed: Box<dyn ProgressFeed>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let task = tokio::spawn(run_poller(session_id.to_string(), feed, events));
        Self {
            session_id: session_id.to_string(),
            task,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn msg(kind: MessageKind, text: &str) -> ProgressMessage {
        ProgressMessage::new(kind, text, "12:00:00")
    }

    struct ScriptedFeed {
        script: VecDeque<ClientResult<Vec<ProgressMessage>>>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProgressFeed for ScriptedFeed {
        async fn next_snapshot(&mut self) -> ClientResult<Vec<ProgressMessage>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.script
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Network("script exhausted".into())))
        }
    }

    fn scripted(
        script: Vec<ClientResult<Vec<ProgressMessage>>>,
    ) -> (Box<dyn ProgressFeed>, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let feed = ScriptedFeed {
            script: script.into(),
            fetches: fetches.clone(),
        };
        (Box::new(feed), fetches)
    }

    async fn collect(feed: Box<dyn ProgressFeed>) -> Vec<PollEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        run_poller("s1".into(), feed, tx).await;
        let mut events = Vec::new();
        while let Ok(AppEvent::Poll { session_id, event }) = rx.try_recv() {
            assert_eq!(session_id, "s1");
            events.push(event);
        }
        events
    }

    #[test]
    fn no_terminal_message_means_no_outcome() {
        let messages = vec![msg(MessageKind::Info, "a"), msg(MessageKind::Warning, "b")];
        assert_eq!(outcome_of(&messages), None);
        assert_eq!(outcome_of(&[]), None);
    }

    #[test]
    fn success_offers_the_embedded_file_name() {
        let messages = vec![
            msg(MessageKind::Info, "Starting"),
            msg(
                MessageKind::Success,
                "Translation completed! 3 rows translated. File: report.xlsx",
            ),
        ];
        assert_eq!(
            outcome_of(&messages),
            Some(Outcome::Succeeded {
                download: Some("report.xlsx".into())
            })
        );
    }

    #[test]
    fn structured_file_name_wins_over_text() {
        let last = msg(MessageKind::Success, "Done. File: from-text.xlsx").with_filename("field.xlsx");
        assert_eq!(download_name(&last).as_deref(), Some("field.xlsx"));
        assert_eq!(download_name(&msg(MessageKind::Success, "Done")), None);
    }

    #[test]
    fn last_message_decides_the_outcome() {
        let messages = vec![
            msg(MessageKind::Success, "partial. File: a.xlsx"),
            msg(MessageKind::Error, "Translation failed: boom"),
        ];
        assert_eq!(outcome_of(&messages), Some(Outcome::Failed));

        // A terminal message earlier in the list still ends polling.
        let messages = vec![
            msg(MessageKind::Error, "Translation error: timeout"),
            msg(MessageKind::Info, "Row 2/2: Translating..."),
        ];
        assert_eq!(outcome_of(&messages), Some(Outcome::Failed));
    }

    #[tokio::test]
    async fn stops_on_first_terminal_tick() {
        let (feed, fetches) = scripted(vec![
            Ok(vec![msg(MessageKind::Info, "Starting")]),
            Ok(vec![msg(MessageKind::Info, "Starting"), msg(MessageKind::Input, "你好")]),
            Ok(vec![
                msg(MessageKind::Info, "Starting"),
                msg(MessageKind::Input, "你好"),
                msg(MessageKind::Success, "Done. File: out.xlsx"),
            ]),
            Ok(vec![msg(MessageKind::Info, "never fetched")]),
        ]);

        let events = collect(feed).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
        assert_eq!(events.len(), 3);
        let outcomes: Vec<bool> = events
            .iter()
            .map(|event| matches!(event, PollEvent::Tick(tick) if tick.is_terminal()))
            .collect();
        assert_eq!(outcomes, vec![false, false, true]);
        match &events[2] {
            PollEvent::Tick(tick) => {
                assert_eq!(tick.blocks.len(), 3);
                assert_eq!(
                    tick.outcome,
                    Some(Outcome::Succeeded {
                        download: Some("out.xlsx".into())
                    })
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn feed_failure_stops_immediately() {
        let (feed, fetches) = scripted(vec![
            Ok(vec![msg(MessageKind::Info, "Starting")]),
            Err(ClientError::Network("connection refused".into())),
            Ok(vec![msg(MessageKind::Success, "never fetched")]),
        ]);

        let events = collect(feed).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(
            events.last(),
            Some(&PollEvent::Failed(ClientError::Network(
                "connection refused".into()
            )))
        );
    }

    #[tokio::test]
    async fn dropping_the_handle_aborts_the_task() {
        struct PendingFeed;

        #[async_trait]
        impl ProgressFeed for PendingFeed {
            async fn next_snapshot(&mut self) -> ClientResult<Vec<ProgressMessage>> {
                futures::future::pending().await
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = PollerHandle::spawn("s2", Box::new(PendingFeed), tx);
        assert_eq!(handle.session_id(), "s2");
        handle.cancel();
        // The sender lived inside the aborted task, so the channel closes.
        assert!(rx.recv().await.is_none());
    }
}
