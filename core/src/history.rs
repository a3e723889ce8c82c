use crate::model::HistoryEntry;
use serde::Serialize;

pub const NO_HISTORY_TEXT: &str = "No translation history yet.";
const DEFAULT_DOMAIN_LABEL: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItemView {
    pub timestamp: String,
    /// File offered for download from this entry.
    pub download: String,
    pub details: Vec<String>,
}

impl HistoryItemView {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        let mut details = vec![format!("File: {}", entry.original_file)];
        details.push(format!(
            "Translation: {} → {} (Column C)",
            entry.source_lang,
            entry.primary_target()
        ));
        if let Some(second) = entry.secondary_target() {
            details.push(format!(
                "Translation 2: {} → {} (Column D)",
                entry.source_lang, second
            ));
        }
        let domain = entry
            .domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
            .unwrap_or(DEFAULT_DOMAIN_LABEL);
        details.push(format!("Domain: {domain}"));
        details.push(format!("Rows: {}", entry.rows_translated));

        Self {
            timestamp: entry.timestamp.clone(),
            download: entry.translated_file.clone(),
            details,
        }
    }
}

/// History list as the view shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HistoryView {
    Empty,
    Items(Vec<HistoryItemView>),
}

impl HistoryView {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Items(entries.iter().map(HistoryItemView::from_entry).collect())
        }
    }
}
