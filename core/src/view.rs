//! The surface the controller draws on. A front-end implements this once;
//! the controller never formats output itself.

use crate::history::HistoryView;
use crate::notification::Notification;
use crate::preview::PreviewView;
use crate::render::MessageBlock;
use crate::settings::{LanguageSelection, Settings, Theme};

pub trait View: Send {
    fn notify(&mut self, notification: &Notification);

    /// Staged file descriptor, or `None` to show the empty drop area.
    fn show_staged_file(&mut self, descriptor: Option<&str>);
    fn set_submit_enabled(&mut self, enabled: bool);
    fn set_progress_visible(&mut self, visible: bool);

    fn set_processing_visible(&mut self, visible: bool);
    /// Replaces the whole processing region and scrolls to its end.
    fn render_processing(&mut self, blocks: &[MessageBlock]);
    fn offer_download(&mut self, filename: &str, url: &str);

    fn render_preview(&mut self, preview: Option<&PreviewView>);
    fn render_history(&mut self, history: &HistoryView);

    fn apply_theme(&mut self, theme: Theme);
    fn show_settings(&mut self, settings: &Settings, selection: &LanguageSelection);
    /// Asks the user to open the settings form.
    fn request_settings(&mut self);

    fn confirm(&mut self, prompt: &str) -> bool;
}
