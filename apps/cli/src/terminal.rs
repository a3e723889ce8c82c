use colored::Colorize;
use log::debug;
use sheet_translator_core::{
    HistoryView, LanguageSelection, MessageBlock, Notification, NotificationLevel, PreviewView,
    Settings, Theme, View,
};
use std::io::{self, BufRead, Write};

/// Line-oriented view for an interactive terminal.
#[derive(Debug, Default)]
pub struct TerminalView {
    assume_yes: bool,
    reveal_key: bool,
    theme: Theme,
    shown: Vec<MessageBlock>,
    downloads: Vec<String>,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            ..Self::default()
        }
    }

    pub fn reveal_api_key(&mut self, reveal: bool) {
        self.reveal_key = reveal;
    }

    /// Files offered for download during this run, oldest first.
    pub fn downloads(&self) -> &[String] {
        &self.downloads
    }

    /// Light keeps the plain glyphs; dark colours them.
    fn badge(&self, level: NotificationLevel) -> String {
        let glyph = match level {
            NotificationLevel::Success => "✔",
            NotificationLevel::Error => "✖",
            NotificationLevel::Info => "•",
            NotificationLevel::Warning => "!",
        };
        match self.theme {
            Theme::Light => glyph.to_string(),
            Theme::Dark => match level {
                NotificationLevel::Success => glyph.bright_green().to_string(),
                NotificationLevel::Error => glyph.bright_red().bold().to_string(),
                NotificationLevel::Info => glyph.bright_cyan().to_string(),
                NotificationLevel::Warning => glyph.bright_yellow().to_string(),
            },
        }
    }

    fn separator(&self) -> String {
        let line = "──────────";
        match self.theme {
            Theme::Light => line.to_string(),
            Theme::Dark => line.bright_black().to_string(),
        }
    }
}

impl View for TerminalView {
    fn notify(&mut self, notification: &Notification) {
        eprintln!("{} {}", self.badge(notification.level), notification.message);
    }

    fn show_staged_file(&mut self, descriptor: Option<&str>) {
        match descriptor {
            Some(descriptor) => println!("📄 {descriptor}"),
            None => debug!("file intake cleared"),
        }
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        debug!("submit enabled: {enabled}");
    }

    fn set_progress_visible(&mut self, visible: bool) {
        if visible {
            println!("⏳ Translating...");
        }
    }

    fn set_processing_visible(&mut self, visible: bool) {
        if !visible {
            self.shown.clear();
        }
    }

    /// Terminal output cannot be redrawn, so only the part past what is
    /// already on screen is printed. A sequence that no longer extends the
    /// screen is printed again in full.
    fn render_processing(&mut self, blocks: &[MessageBlock]) {
        let extends = blocks.starts_with(&self.shown);
        let fresh = if extends {
            &blocks[self.shown.len()..]
        } else {
            println!("{}", self.separator());
            blocks
        };
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for block in fresh {
            let _ = writeln!(out, "{block}");
        }
        let _ = out.flush();
        self.shown = blocks.to_vec();
    }

    fn offer_download(&mut self, filename: &str, url: &str) {
        println!("✅ Translation Complete - Download Ready: {filename}");
        println!("   {url}");
        self.downloads.push(filename.to_string());
    }

    fn render_preview(&mut self, preview: Option<&PreviewView>) {
        let Some(preview) = preview else {
            return;
        };
        println!("File: {}", preview.filename);
        println!(
            "Total Rows: {}  Non-empty: {}  Empty: {}",
            preview.total_rows, preview.non_empty_rows, preview.empty_rows
        );
        if let Some(notice) = &preview.truncation_notice {
            println!("ℹ {notice}");
        }
        for row in &preview.rows {
            let marker = if row.is_empty { "·" } else { " " };
            println!("{marker}{:>9} │ {}", row.label, row.text);
        }
    }

    fn render_history(&mut self, history: &HistoryView) {
        match history {
            HistoryView::Empty => println!("{}", sheet_translator_core::history::NO_HISTORY_TEXT),
            HistoryView::Items(items) => {
                for item in items {
                    println!("{}  ⬇ {}", item.timestamp, item.download);
                    for line in &item.details {
                        println!("    {line}");
                    }
                }
            }
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        debug!("theme: {}", theme.as_str());
    }

    fn show_settings(&mut self, settings: &Settings, selection: &LanguageSelection) {
        let key = if self.reveal_key {
            settings.api_key.clone()
        } else {
            settings.masked_api_key()
        };
        debug!(
            "settings loaded: key={} source={} targets={}/{} theme={}",
            if key.is_empty() { "<unset>" } else { key.as_str() },
            selection.source_lang,
            selection.target_lang_1,
            selection.target_lang_2,
            self.theme.as_str()
        );
    }

    fn request_settings(&mut self) {
        eprintln!("Run `sheet-translator settings set --api-key <KEY>` first.");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
