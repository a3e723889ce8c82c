//! HTTP access to the translation server.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::intake::StagedFile;
use crate::model::{HistoryEntry, PreviewResponse, ProgressMessage, UploadResponse};
use crate::settings::LanguageSelection;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything `POST /upload` needs for one job.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub file: &'a StagedFile,
    pub api_key: &'a str,
    pub selection: &'a LanguageSelection,
    pub session_id: &'a str,
}

/// Raw chunks of a streaming response body.
pub type ByteStream = BoxStream<'static, ClientResult<Vec<u8>>>;

#[async_trait]
pub trait TranslatorApi: Send + Sync {
    async fn preview_excel(&self, file: &StagedFile) -> ClientResult<PreviewResponse>;
    async fn upload(&self, request: UploadRequest<'_>) -> ClientResult<UploadResponse>;
    /// Full, ordered message history of a session.
    async fn session_messages(&self, session_id: &str) -> ClientResult<Vec<ProgressMessage>>;
    /// Event stream of a session's messages (`data: <json>` frames).
    async fn progress_stream(&self, session_id: &str) -> ClientResult<ByteStream>;
    async fn history(&self) -> ClientResult<Vec<HistoryEntry>>;
    async fn clear_history(&self) -> ClientResult<()>;
    fn download_url(&self, filename: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    request_timeout: Duration,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base = Url::parse(config.base_url())
            .map_err(|e| ClientError::validation(format!("invalid server url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::validation(format!(
                "invalid server url: {}",
                config.server_url
            )));
        }
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base,
            request_timeout: config.timing.request_timeout(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn file_form(file: &StagedFile) -> Form {
        Form::new().part(
            "file",
            Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string()),
        )
    }

    /// Decodes the body whatever the status; the server reports failures
    /// as JSON with an `error` field.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ClientError::Decode(format!("{e} (status {status})"))
        })
    }

    /// Fetches `filename` and writes it into `dir`.
    pub async fn download_to(&self, filename: &str, dir: &Path) -> ClientResult<PathBuf> {
        let response = self
            .client
            .get(self.endpoint(&["download", filename]))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Rejected(format!(
                "Download failed: server answered {status}"
            )));
        }
        let bytes = response.bytes().await?;
        let target = dir.join(Path::new(filename).file_name().unwrap_or_default());
        fs::create_dir_all(dir)?;
        fs::write(&target, &bytes)?;
        Ok(target)
    }
}

#[async_trait]
impl TranslatorApi for HttpApi {
    async fn preview_excel(&self, file: &StagedFile) -> ClientResult<PreviewResponse> {
        debug!("requesting preview for {}", file.name());
        let response = self
            .client
            .post(self.endpoint(&["preview_excel"]))
            .timeout(self.request_timeout)
            .multipart(Self::file_form(file))
            .send()
            .await?;
        let preview: PreviewResponse = Self::read_json(response).await?;
        if preview.success {
            Ok(preview)
        } else {
            Err(ClientError::Rejected(
                preview
                    .error
                    .unwrap_or_else(|| "Failed to preview Excel file".into()),
            ))
        }
    }

    async fn upload(&self, request: UploadRequest<'_>) -> ClientResult<UploadResponse> {
        let selection = request.selection;
        let form = Self::file_form(request.file)
            .text("api_key", request.api_key.to_string())
            .text("source_lang", selection.source_lang.clone())
            .text("target_lang_1", selection.target_lang_1.clone())
            .text("target_lang_2", selection.target_lang_2.clone())
            .text("domain", selection.domain.clone())
            .text("session_id", request.session_id.to_string());

        debug!("uploading {} for session {}", request.file.name(), request.session_id);
        let response = self
            .client
            .post(self.endpoint(&["upload"]))
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await?;
        let outcome: UploadResponse = Self::read_json(response).await?;
        if outcome.success {
            Ok(outcome)
        } else {
            Err(ClientError::Rejected(
                outcome.error.unwrap_or_else(|| "Translation failed".into()),
            ))
        }
    }

    async fn session_messages(&self, session_id: &str) -> ClientResult<Vec<ProgressMessage>> {
        let response = self
            .client
            .get(self.endpoint(&["get_session_messages", session_id]))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn progress_stream(&self, session_id: &str) -> ClientResult<ByteStream> {
        let response = self
            .client
            .get(self.endpoint(&["translation_progress", session_id]))
            .send()
            .await?
            .error_for_status()?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from))
            .boxed())
    }

    async fn history(&self) -> ClientResult<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(self.endpoint(&["history"]))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn clear_history(&self) -> ClientResult<()> {
        let response = self
            .client
            .post(self.endpoint(&["clear_history"]))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected(format!(
                "Failed to clear history: server answered {status}"
            )))
        }
    }

    fn download_url(&self, filename: &str) -> String {
        self.endpoint(&["download", filename]).to_string()
    }
}

/// Hands a URL to the system browser.
pub fn open_in_browser(url: &str) -> ClientResult<()> {
    open::that_detached(url)
        .map_err(|error| ClientError::Storage(format!("could not open {url}: {error}")))
}
