//! Top-level controller: owns the application state and reacts to user
//! actions and background events.

use crate::api::{open_in_browser, TranslatorApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::event::{AppEvent, PollEvent};
use crate::history::HistoryView;
use crate::intake::StagedFile;
use crate::model::MessageKind;
use crate::notification::Notification;
use crate::poller::{Outcome, Tick};
use crate::preview::PreviewView;
use crate::render::MessageBlock;
use crate::session::{local_timestamp, Session, SessionController};
use crate::settings::{LanguageSelection, Settings, SettingsStore, Theme};
use crate::view::View;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const PREPARING_TEXT: &str = "Preparing translation...";

/// Everything the interface shows, owned by [`App`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub selection: LanguageSelection,
    pub theme: Theme,
    pub staged: Option<StagedFile>,
    pub preview: Option<PreviewView>,
    pub submit_enabled: bool,
    pub progress_visible: bool,
    pub processing_visible: bool,
    pub processing: Vec<MessageBlock>,
    pub download: Option<String>,
    pub history: HistoryView,
    pub history_refresh_pending: bool,
    pub last_outcome: Option<Outcome>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            selection: LanguageSelection::default(),
            theme: Theme::Light,
            staged: None,
            preview: None,
            submit_enabled: false,
            progress_visible: false,
            processing_visible: false,
            processing: Vec::new(),
            download: None,
            history: HistoryView::Empty,
            history_refresh_pending: false,
            last_outcome: None,
        }
    }
}

pub struct App<V: View> {
    state: AppState,
    view: V,
    api: Arc<dyn TranslatorApi>,
    store: SettingsStore,
    config: ClientConfig,
    sessions: SessionController,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl<V: View> App<V> {
    pub fn new(
        config: ClientConfig,
        api: Arc<dyn TranslatorApi>,
        store: SettingsStore,
        view: V,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let sessions = SessionController::new(api.clone(), &config, events_tx.clone());
        Self {
            state: AppState::default(),
            view,
            api,
            store,
            config,
            sessions,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Startup sequence: saved settings first, then the history list.
    pub async fn start(&mut self) {
        self.load_settings();
        self.load_history().await;
    }

    // ---- settings -------------------------------------------------------

    pub fn load_settings(&mut self) {
        let settings = match self.store.load() {
            Ok(settings) => settings,
            Err(error) => {
                warn!("ignoring unreadable settings: {}", error);
                Settings::default()
            }
        };
        self.adopt_settings(settings);
    }

    pub fn save_settings(&mut self, settings: Settings) -> ClientResult<()> {
        if let Err(error) = self.store.save(&settings) {
            self.view
                .notify(&Notification::error(format!("Failed to save settings: {error}")));
            return Err(error);
        }
        self.adopt_settings(settings);
        self.view
            .notify(&Notification::success("Settings saved successfully!"));
        Ok(())
    }

    fn adopt_settings(&mut self, settings: Settings) {
        self.state.selection.apply_settings(&settings);
        let theme = settings.theme;
        self.state.settings = settings;
        self.apply_theme(theme);
        self.view
            .show_settings(&self.state.settings, &self.state.selection);
    }

    /// Applies a theme immediately without persisting it.
    pub fn apply_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.view.apply_theme(theme);
    }

    /// Per-job overrides of the language and domain fields.
    pub fn set_selection(&mut self, selection: LanguageSelection) {
        self.state.selection = selection;
    }

    // ---- file intake & preview -----------------------------------------

    pub async fn select_path(&mut self, path: &Path) -> ClientResult<()> {
        match StagedFile::from_path(path) {
            Ok(file) => self.select_file(file).await,
            Err(error) => {
                self.view.notify(&Notification::error(error.to_string()));
                Err(error)
            }
        }
    }

    pub async fn select_file(&mut self, file: StagedFile) -> ClientResult<()> {
        info!("staged {}", file.descriptor());
        self.view.show_staged_file(Some(&file.descriptor()));
        self.state.staged = Some(file);
        self.set_submit_enabled(true);
        self.load_preview().await
    }

    pub fn clear_file(&mut self) {
        self.state.staged = None;
        self.state.preview = None;
        self.view.show_staged_file(None);
        self.view.render_preview(None);
        self.set_submit_enabled(false);
    }

    async fn load_preview(&mut self) -> ClientResult<()> {
        let Some(file) = self.state.staged.clone() else {
            return Err(ClientError::validation("Please select a file first"));
        };
        self.view
            .notify(&Notification::info("Loading Excel preview..."));

        match self.api.preview_excel(&file).await {
            Ok(response) => {
                let preview = PreviewView::from_response(&response);
                self.view.render_preview(Some(&preview));
                self.state.preview = Some(preview);
                self.view
                    .notify(&Notification::success("Excel content loaded successfully"));
                Ok(())
            }
            Err(ClientError::Rejected(text)) => {
                self.view.notify(&Notification::error(text.clone()));
                Err(ClientError::Rejected(text))
            }
            Err(error) => {
                self.view.notify(&Notification::error(format!(
                    "Error loading Excel preview: {error}"
                )));
                Err(error)
            }
        }
    }

    // ---- submission ----------------------------------------------------

    /// Uploads the staged file and starts polling its session.
    pub async fn submit(&mut self) -> ClientResult<Session> {
        let Some(file) = self.state.staged.clone() else {
            let error = ClientError::validation("Please select a file first");
            self.view.notify(&Notification::error(error.to_string()));
            return Err(error);
        };
        if !self.state.settings.has_api_key() {
            let error = ClientError::validation("Please set your API key in settings");
            self.view.notify(&Notification::error(error.to_string()));
            self.view.request_settings();
            return Err(error);
        }
        let api_key = self.state.settings.api_key.trim().to_string();

        let selection = self.state.selection.clone();
        let session = Session::new(file.name(), &selection);
        // The processing region now belongs to the new job, whether or not
        // its upload goes through.
        self.sessions.cancel();

        self.set_progress_visible(true);
        self.state.processing_visible = true;
        self.view.set_processing_visible(true);
        self.set_submit_enabled(false);
        self.state.download = None;
        self.state.last_outcome = None;

        let timestamp = local_timestamp();
        self.state.processing = vec![MessageBlock::local(
            MessageKind::Info,
            PREPARING_TEXT,
            &timestamp,
        )];
        self.state.processing.extend(session.preamble(&timestamp));
        self.view.render_processing(&self.state.processing);

        match self
            .sessions
            .submit(&session, &file, &api_key, &selection)
            .await
        {
            Ok(()) => {
                self.sessions.begin_polling(&session.id);
                Ok(session)
            }
            Err(error) => {
                let (headline, notice) = match &error {
                    ClientError::Rejected(text) => ("❌ Translation failed", text.clone()),
                    other => (
                        "❌ Network error occurred",
                        format!("Network error: {other}"),
                    ),
                };
                let timestamp = local_timestamp();
                self.state.processing.push(MessageBlock::local(
                    MessageKind::Error,
                    headline,
                    &timestamp,
                ));
                self.state.processing.push(MessageBlock::local(
                    MessageKind::Error,
                    &format!("Error: {error}"),
                    &timestamp,
                ));
                self.view.render_processing(&self.state.processing);
                self.view.notify(&Notification::error(notice));
                self.set_progress_visible(false);
                self.set_submit_enabled(true);
                Err(error)
            }
        }
    }

    pub fn is_polling(&self) -> bool {
        self.sessions.active_session().is_some()
    }

    pub fn active_session(&self) -> Option<&str> {
        self.sessions.active_session()
    }

    // ---- events --------------------------------------------------------

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Poll { session_id, event } => {
                if !self.sessions.is_active(&session_id) {
                    warn!("dropping update for inactive session {}", session_id);
                    return;
                }
                match event {
                    PollEvent::Tick(tick) => self.apply_tick(&session_id, tick),
                    PollEvent::Failed(error) => self.abort_session(&session_id, error),
                }
            }
            AppEvent::RefreshHistory => {
                self.state.history_refresh_pending = false;
                self.load_history().await;
            }
            AppEvent::HideProcessing => {
                self.state.processing_visible = false;
                self.view.set_processing_visible(false);
            }
        }
    }

    fn apply_tick(&mut self, session_id: &str, tick: Tick) {
        self.state.processing = tick.blocks;
        self.view.render_processing(&self.state.processing);

        if let Some(outcome) = tick.outcome {
            self.finish_session(session_id, outcome);
        }
    }

    fn finish_session(&mut self, session_id: &str, outcome: Outcome) {
        self.sessions.finish(session_id);
        self.set_progress_visible(false);
        self.set_submit_enabled(true);

        match &outcome {
            Outcome::Succeeded { download } => {
                info!("session {} finished", session_id);
                self.view
                    .notify(&Notification::success("Translation completed successfully!"));
                if let Some(filename) = download {
                    let url = self.api.download_url(filename);
                    self.view.offer_download(filename, &url);
                    self.state.download = Some(filename.clone());
                }
                self.state.history_refresh_pending = true;
                self.schedule(
                    self.config.timing.history_refresh_delay(),
                    AppEvent::RefreshHistory,
                );
                self.clear_file();
            }
            Outcome::Failed => {
                warn!("session {} failed", session_id);
                self.view.notify(&Notification::error("Translation failed"));
            }
        }

        self.state.last_outcome = Some(outcome);
        self.schedule(
            self.config.timing.processing_hide_delay(),
            AppEvent::HideProcessing,
        );
    }

    fn abort_session(&mut self, session_id: &str, error: ClientError) {
        self.sessions.finish(session_id);
        self.set_progress_visible(false);
        self.set_submit_enabled(true);
        self.view.notify(&Notification::error(format!(
            "Lost track of translation progress: {error}"
        )));
    }

    /// Posts `event` back to this controller after `delay`.
    fn schedule(&self, delay: Duration, event: AppEvent) {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event);
        });
    }

    // ---- history & downloads -------------------------------------------

    pub async fn load_history(&mut self) {
        match self.api.history().await {
            Ok(entries) => {
                self.state.history = HistoryView::from_entries(&entries);
                self.view.render_history(&self.state.history);
            }
            Err(error) => warn!("Failed to load history: {}", error),
        }
    }

    /// Returns `Ok(false)` when the user declined the confirmation.
    pub async fn clear_history(&mut self) -> ClientResult<bool> {
        if !self
            .view
            .confirm("Are you sure you want to clear all translation history?")
        {
            return Ok(false);
        }

        match self.api.clear_history().await {
            Ok(()) => {
                self.load_history().await;
                self.view
                    .notify(&Notification::success("History cleared successfully"));
                Ok(true)
            }
            Err(ClientError::Rejected(text)) => {
                warn!("{}", text);
                Err(ClientError::Rejected(text))
            }
            Err(error) => {
                self.view
                    .notify(&Notification::error("Failed to clear history"));
                Err(error)
            }
        }
    }

    /// Opens the download in the system browser.
    pub fn open_download(&mut self, filename: &str) -> ClientResult<()> {
        let url = self.api.download_url(filename);
        open_in_browser(&url).inspect_err(|error| {
            self.view.notify(&Notification::error(error.to_string()));
        })
    }

    /// Stops the active poller, if any.
    pub fn shutdown(&mut self) {
        self.sessions.cancel();
    }

    // ---- small state setters -------------------------------------------

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.state.submit_enabled = enabled;
        self.view.set_submit_enabled(enabled);
    }

    fn set_progress_visible(&mut self, visible: bool) {
        self.state.progress_visible = visible;
        self.view.set_progress_visible(visible);
    }
}
