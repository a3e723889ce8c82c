pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod history;
pub mod intake;
pub mod model;
pub mod notification;
pub mod poller;
pub mod preview;
pub mod render;
pub mod session;
pub mod settings;
pub mod view;

pub use api::{open_in_browser, HttpApi, TranslatorApi, UploadRequest};
pub use app::{App, AppState};
pub use config::{ClientConfig, FeedKind, TimingOptions};
pub use error::{ClientError, ClientResult};
pub use event::{AppEvent, PollEvent};
pub use feed::{PollingFeed, ProgressFeed, StreamFeed};
pub use history::{HistoryItemView, HistoryView};
pub use intake::{format_file_size, is_excel_file_name, StagedFile};
pub use model::{HistoryEntry, MessageKind, PreviewResponse, PreviewRow, ProgressMessage};
pub use notification::{Notification, NotificationLevel};
pub use poller::{Outcome, PollerHandle, Tick};
pub use preview::PreviewView;
pub use render::MessageBlock;
pub use session::Session;
pub use settings::{LanguageSelection, Settings, SettingsStore, Theme};
pub use view::View;
