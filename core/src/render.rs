//! Turns progress messages into display blocks for the processing region.

use crate::model::{MessageKind, ProgressMessage};
use serde::Serialize;
use std::fmt;

pub fn icon_for(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "ℹ️",
        MessageKind::Success => "✅",
        MessageKind::Error => "❌",
        MessageKind::Warning => "⚠️",
        _ => "📝",
    }
}

/// Neutralizes control characters so server text cannot drive the terminal.
/// Line breaks and tabs are kept.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() && ch != '\n' && ch != '\t' {
            out.extend(ch.escape_unicode());
        } else {
            out.push(ch);
        }
    }
    out
}

/// One entry of the processing region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBlock {
    pub kind: MessageKind,
    pub header: String,
    /// Only `input` and `output` messages carry a body line.
    pub body: Option<String>,
}

impl MessageBlock {
    /// Line produced by the client itself rather than fetched from the server.
    pub fn local(kind: MessageKind, text: &str, timestamp: &str) -> Self {
        Self {
            kind,
            header: format!("[{timestamp}] {}", escape_text(text)),
            body: None,
        }
    }
}

impl fmt::Display for MessageBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        if let Some(body) = &self.body {
            write!(f, "\n{body}")?;
        }
        Ok(())
    }
}

pub fn render_message(message: &ProgressMessage) -> MessageBlock {
    let ts = &message.timestamp;
    match message.kind {
        MessageKind::Input => MessageBlock {
            kind: message.kind,
            header: format!("[{ts}] 📝 Original Input:"),
            body: Some(escape_text(&message.text)),
        },
        MessageKind::Output => MessageBlock {
            kind: message.kind,
            header: format!("[{ts}] ✅ Translation Output:"),
            body: Some(escape_text(&message.text)),
        },
        kind => MessageBlock {
            kind,
            header: format!("[{ts}] {} {}", icon_for(kind), escape_text(&message.text)),
            body: None,
        },
    }
}

/// Full render of a sequence; the previous contents are never consulted.
pub fn render_messages(messages: &[ProgressMessage]) -> Vec<MessageBlock> {
    messages.iter().map(render_message).collect()
}
