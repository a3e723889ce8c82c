use thiserror::Error;

/// Failures surfaced by client operations. None of them are retried; the
/// operation that produced one is abandoned and the user has to start again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Input rejected before anything was sent (file type, missing key, ...).
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode server response: {0}")]
    Decode(String),
    /// The server decoded fine but answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures of the transport itself (request or body decoding).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decode(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
