use crate::terminal::TerminalView;
use crate::{SettingsUpdate, TranslateArgs};
use anyhow::{bail, Context as _, Result};
use log::{info, warn};
use serde::Serialize;
use sheet_translator_core::{
    App, ClientConfig, FeedKind, HttpApi, Outcome, SettingsStore, Theme, TranslatorApi,
};
use std::path::Path;
use std::sync::Arc;

/// Reads the config file if one was given, then applies command-line overrides.
pub fn load_config(path: Option<&Path>, server: Option<String>, stream: bool) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(server) = server {
        config.server_url = server;
    }
    if stream {
        config.feed = FeedKind::Stream;
    }
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsReport<'a> {
    api_key: String,
    default_source: &'a str,
    default_target: &'a str,
    theme: &'a str,
    settings_file: String,
}

pub struct Context {
    app: App<TerminalView>,
    http: Arc<HttpApi>,
    store_path: String,
}

impl Context {
    pub fn new(config: ClientConfig, assume_yes: bool) -> Result<Self> {
        let http = Arc::new(HttpApi::new(&config)?);
        let store = SettingsStore::in_config_dir()?;
        let store_path = store.path().display().to_string();
        let api: Arc<dyn TranslatorApi> = http.clone();
        let app = App::new(config, api, store, TerminalView::new(assume_yes));
        Ok(Self {
            app,
            http,
            store_path,
        })
    }

    pub async fn translate(&mut self, args: TranslateArgs) -> Result<()> {
        self.app.load_settings();

        let mut selection = self.app.state().selection.clone();
        if let Some(source) = args.source {
            selection.source_lang = source;
        }
        if let Some(target) = args.target {
            selection.target_lang_1 = target;
        }
        if let Some(target) = args.target2 {
            selection.target_lang_2 = target;
        }
        if let Some(domain) = args.domain {
            selection.domain = domain;
        }
        self.app.set_selection(selection);

        // A failed preview still leaves the file staged for upload.
        if let Err(error) = self.app.select_path(&args.file).await {
            if self.app.state().staged.is_none() {
                return Err(error.into());
            }
        }
        let session = self.app.submit().await?;
        info!("following session {}", session.id);

        while self.app.is_polling() {
            let Some(event) = self.app.next_event().await else {
                break;
            };
            self.app.handle_event(event).await;
        }
        // Let the delayed history refresh land before exiting.
        while self.app.state().history_refresh_pending {
            let Some(event) = self.app.next_event().await else {
                break;
            };
            self.app.handle_event(event).await;
        }

        match self.app.state().last_outcome.clone() {
            Some(Outcome::Succeeded { download }) => {
                let Some(filename) = download else {
                    warn!("server reported success without a download name");
                    return Ok(());
                };
                if let Some(dir) = args.save_to.as_deref() {
                    let saved = self.http.download_to(&filename, dir).await?;
                    println!("Saved {}", saved.display());
                }
                if args.open {
                    self.app.open_download(&filename)?;
                }
                Ok(())
            }
            Some(Outcome::Failed) => bail!("translation of {} failed", session.file_name),
            None => bail!("lost track of session {}", session.id),
        }
    }

    pub async fn preview(&mut self, file: &Path) -> Result<()> {
        self.app.load_settings();
        self.app.select_path(file).await?;
        Ok(())
    }

    pub async fn history(&mut self) {
        self.app.load_history().await;
    }

    pub async fn clear_history(&mut self) -> Result<()> {
        if !self.app.clear_history().await? {
            info!("history left unchanged");
        }
        Ok(())
    }

    pub async fn download(&mut self, filename: &str, save_to: Option<&Path>) -> Result<()> {
        let dir = match save_to {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("resolve current directory")?,
        };
        let saved = self.http.download_to(filename, &dir).await?;
        println!("Saved {}", saved.display());
        Ok(())
    }

    pub fn show_settings(&mut self, reveal: bool) -> Result<()> {
        self.app.view_mut().reveal_api_key(reveal);
        self.app.load_settings();
        let settings = &self.app.state().settings;
        let report = SettingsReport {
            api_key: if reveal {
                settings.api_key.clone()
            } else {
                settings.masked_api_key()
            },
            default_source: &settings.default_source,
            default_target: &settings.default_target,
            theme: settings.theme.as_str(),
            settings_file: self.store_path.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<()> {
        self.app.load_settings();
        let mut settings = self.app.state().settings.clone();
        if let Some(key) = update.api_key {
            settings.api_key = key;
        }
        if let Some(source) = update.source {
            settings.default_source = source;
        }
        if let Some(target) = update.target {
            settings.default_target = target;
        }
        if let Some(theme) = update.theme {
            settings.theme = Theme::try_from(theme.as_str())?;
        }
        self.app.save_settings(settings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overrides_win_over_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"serverUrl": "http://files:5000", "feed": "polling"}}"#).unwrap();

        let config = load_config(Some(file.path()), Some("http://cli:9000".into()), true).unwrap();
        assert_eq!(config.server_url, "http://cli:9000");
        assert_eq!(config.feed, FeedKind::Stream);
    }

    #[test]
    fn defaults_without_a_config_file() {
        let config = load_config(None, None, false).unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
