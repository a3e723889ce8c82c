//! Wire types exchanged with the translation server.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Input,
    Output,
    Info,
    Success,
    Error,
    Warning,
    #[serde(other)]
    Other,
}

impl MessageKind {
    /// `success` and `error` mark the end of a session.
    pub fn is_terminal(self) -> bool {
        matches!(self, MessageKind::Success | MessageKind::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Input => "input",
            MessageKind::Output => "output",
            MessageKind::Info => "info",
            MessageKind::Success => "success",
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Other => "other",
        }
    }
}

/// One status unit emitted by the server for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    /// Download name attached to a `success` message by servers that send it
    /// as a field instead of inside `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ProgressMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: timestamp.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub row: u32,
    #[serde(rename = "isEmpty")]
    pub is_empty: bool,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub total_rows: u32,
    #[serde(default)]
    pub content: Vec<PreviewRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A finished job as recorded by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub original_file: String,
    #[serde(default)]
    pub translated_file: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang_2: Option<String>,
    /// Older servers record a single target under this name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub rows_translated: u64,
}

impl HistoryEntry {
    pub fn primary_target(&self) -> &str {
        self.target_lang_1
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .or(self.target_lang.as_deref())
            .unwrap_or_default()
    }

    pub fn secondary_target(&self) -> Option<&str> {
        self.target_lang_2.as_deref().filter(|lang| !lang.is_empty())
    }
}
