//! Translation sessions and the controller that owns their poller.

use crate::api::{TranslatorApi, UploadRequest};
use crate::config::{ClientConfig, FeedKind};
use crate::error::ClientResult;
use crate::event::AppEvent;
use crate::feed::open_feed;
use crate::intake::StagedFile;
use crate::model::MessageKind;
use crate::poller::PollerHandle;
use crate::render::MessageBlock;
use crate::settings::LanguageSelection;
use chrono::{Local, Utc};
use log::{info, warn};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

static LAST_SESSION_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Session token derived from the current time in milliseconds. Two calls in
/// the same millisecond still get distinct tokens.
pub fn generate_session_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut previous = LAST_SESSION_MILLIS.load(Ordering::SeqCst);
    loop {
        let next = now.max(previous + 1);
        match LAST_SESSION_MILLIS.compare_exchange(previous, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next.to_string(),
            Err(actual) => previous = actual,
        }
    }
}

/// Time of day as shown in the processing region.
pub fn local_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub file_name: String,
    pub source_lang: String,
    pub target_lang_1: String,
    pub target_lang_2: String,
    pub domain: String,
}

impl Session {
    pub fn new(file_name: &str, selection: &LanguageSelection) -> Self {
        Self {
            id: generate_session_id(),
            file_name: file_name.to_string(),
            source_lang: selection.source_lang.clone(),
            target_lang_1: selection.target_lang_1.clone(),
            target_lang_2: selection.target_lang_2.clone(),
            domain: selection.domain.clone(),
        }
    }

    /// Lines the client writes into the processing region before uploading.
    pub fn preamble(&self, timestamp: &str) -> Vec<MessageBlock> {
        let mut lines = vec![
            "🚀 Starting dual-language translation process...".to_string(),
            format!("📁 File: {}", self.file_name),
            format!(
                "🌐 Translation 1: {} → {} (Column C)",
                self.source_lang, self.target_lang_1
            ),
            format!(
                "🌐 Translation 2: {} → {} (Column D)",
                self.source_lang, self.target_lang_2
            ),
        ];
        if !self.domain.is_empty() {
            lines.push(format!("🎯 Domain: {}", self.domain));
        }
        lines.push("📤 Uploading file to server...".to_string());
        lines
            .iter()
            .map(|line| MessageBlock::local(MessageKind::Info, line, timestamp))
            .collect()
    }
}

/// Submits jobs and keeps at most one poller alive.
pub struct SessionController {
    api: Arc<dyn TranslatorApi>,
    feed: FeedKind,
    poll_interval: Duration,
    events: UnboundedSender<AppEvent>,
    active: Option<PollerHandle>,
}

impl SessionController {
    pub fn new(
        api: Arc<dyn TranslatorApi>,
        config: &ClientConfig,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            api,
            feed: config.feed,
            poll_interval: config.timing.poll_interval(),
            events,
            active: None,
        }
    }

    pub async fn submit(
        &self,
        session: &Session,
        file: &StagedFile,
        api_key: &str,
        selection: &LanguageSelection,
    ) -> ClientResult<()> {
        self.api
            .upload(UploadRequest {
                file,
                api_key,
                selection,
                session_id: &session.id,
            })
            .await?;
        info!("session {} accepted for {}", session.id, session.file_name);
        Ok(())
    }

    /// Starts following `session_id`, stopping whatever poller ran before.
    pub fn begin_polling(&mut self, session_id: &str) {
        if let Some(previous) = self.active.take() {
            warn!(
                "cancelling poller for session {} in favour of {}",
                previous.session_id(),
                session_id
            );
            previous.cancel();
        }
        let feed = open_feed(self.feed, self.api.clone(), session_id, self.poll_interval);
        self.active = Some(PollerHandle::spawn(session_id, feed, self.events.clone()));
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|handle| handle.session_id() == session_id)
    }

    pub fn active_session(&self) -> Option<&str> {
        self.active.as_ref().map(PollerHandle::session_id)
    }

    /// Forgets the poller for `session_id` once it has reported its end.
    pub fn finish(&mut self, session_id: &str) {
        if self.is_active(session_id) {
            self.active = None;
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            info!("stopping poller for session {}", handle.session_id());
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_numeric_and_unique() {
        let first = generate_session_id();
        let second = generate_session_id();
        assert!(first.parse::<i64>().is_ok());
        assert!(second.parse::<i64>().unwrap() > first.parse::<i64>().unwrap());
    }

    #[test]
    fn preamble_mentions_domain_only_when_set() {
        let mut selection = LanguageSelection::default();
        let session = Session::new("menu.xlsx", &selection);
        let lines = session.preamble("09:00:00");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].header, "[09:00:00] 📁 File: menu.xlsx");
        assert_eq!(
            lines[3].header,
            "[09:00:00] 🌐 Translation 2: Chinese → Japanese (Column D)"
        );

        selection.domain = "Restaurant".into();
        let session = Session::new("menu.xlsx", &selection);
        let lines = session.preamble("09:00:00");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[4].header, "[09:00:00] 🎯 Domain: Restaurant");
    }
}
