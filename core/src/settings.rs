//! User preferences persisted on the client between runs.

use crate::error::{ClientError, ClientResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed key the settings record is stored under.
pub const SETTINGS_STORAGE_KEY: &str = "translatorSettings";
pub const DEFAULT_SOURCE_LANG: &str = "Chinese";
pub const DEFAULT_TARGET_LANG: &str = "English";
const APP_DIR_NAME: &str = "sheet-translator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl TryFrom<&str> for Theme {
    type Error = ClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ClientError::validation(format!("unknown theme: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default = "default_target")]
    pub default_target: String,
    #[serde(default)]
    pub theme: Theme,
}

fn default_source() -> String {
    DEFAULT_SOURCE_LANG.to_string()
}

fn default_target() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            default_source: default_source(),
            default_target: default_target(),
            theme: Theme::Light,
        }
    }
}

impl Settings {
    /// Blank language fields count as unset.
    fn normalized(mut self) -> Self {
        self.api_key = self.api_key.trim().to_string();
        if self.default_source.trim().is_empty() {
            self.default_source = default_source();
        }
        if self.default_target.trim().is_empty() {
            self.default_target = default_target();
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key for display, hiding everything but the last four characters.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{}", "•".repeat(hidden), tail)
    }
}

/// The second target column follows the first: English pairs with Japanese,
/// everything else pairs with English.
pub fn secondary_target_for(primary: &str) -> &'static str {
    if primary == "English" {
        "Japanese"
    } else {
        "English"
    }
}

/// Language and domain choices for the next submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSelection {
    pub source_lang: String,
    pub target_lang_1: String,
    pub target_lang_2: String,
    pub domain: String,
}

impl Default for LanguageSelection {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl LanguageSelection {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            source_lang: settings.default_source.clone(),
            target_lang_1: settings.default_target.clone(),
            target_lang_2: secondary_target_for(&settings.default_target).to_string(),
            domain: String::new(),
        }
    }

    /// Re-derives the languages from `settings` and keeps the domain.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let domain = std::mem::take(&mut self.domain);
        *self = Self::from_settings(settings);
        self.domain = domain;
    }
}

/// JSON-file backed storage for [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SETTINGS_STORAGE_KEY}.json")),
        }
    }

    /// Store under the platform configuration directory.
    pub fn in_config_dir() -> ClientResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            ClientError::Storage("could not resolve a configuration directory".into())
        })?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns defaults when nothing has been saved yet.
    pub fn load(&self) -> ClientResult<Settings> {
        if !self.path.exists() {
            debug!("no saved settings at {}", self.path.display());
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Storage(format!("read {}: {e}", self.path.display())))?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings.normalized())
    }

    pub fn save(&self, settings: &Settings) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ClientError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let content = serde_json::to_string(settings)?;
        fs::write(&self.path, content)
            .map_err(|e| ClientError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_source, "Chinese");
        assert_eq!(settings.default_target, "English");
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn round_trip_preserves_target_and_theme() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested"));
        let settings = Settings {
            api_key: "sk-123".into(),
            default_target: "English".into(),
            theme: Theme::Dark,
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, settings);
        let selection = LanguageSelection::from_settings(&loaded);
        assert_eq!(selection.target_lang_1, "English");
        assert_eq!(selection.target_lang_2, "Japanese");
    }

    #[test]
    fn stored_record_uses_camel_case_keys() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save(&Settings::default()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"defaultSource\""));
        assert!(raw.contains("\"apiKey\""));
        assert!(store.path().ends_with("translatorSettings.json"));
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        fs::write(store.path(), r#"{"defaultSource": "", "theme": "dark"}"#).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.default_source, "Chinese");
        assert_eq!(loaded.default_target, "English");
        assert_eq!(loaded.theme, Theme::Dark);
    }

    #[test]
    fn secondary_target_toggles_between_english_and_japanese() {
        assert_eq!(secondary_target_for("English"), "Japanese");
        assert_eq!(secondary_target_for("Japanese"), "English");
        assert_eq!(secondary_target_for("French"), "English");
    }

    #[test]
    fn apply_settings_keeps_domain() {
        let mut selection = LanguageSelection::default();
        selection.domain = "Legal".into();
        let settings = Settings {
            default_target: "Japanese".into(),
            ..Settings::default()
        };
        selection.apply_settings(&settings);
        assert_eq!(selection.target_lang_1, "Japanese");
        assert_eq!(selection.target_lang_2, "English");
        assert_eq!(selection.domain, "Legal");
    }

    #[test]
    fn masks_all_but_the_tail() {
        let settings = Settings {
            api_key: "sk-abcdef".into(),
            ..Settings::default()
        };
        assert_eq!(settings.masked_api_key(), "•••••cdef");
        assert_eq!(Settings::default().masked_api_key(), "");
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!(Theme::try_from("Dark").unwrap(), Theme::Dark);
        assert!(Theme::try_from("sepia").is_err());
    }
}
