use reqwest::StatusCode;
use shared::error::ApiErrorBody;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// The API answered 401; the session has already been cleared.
    #[error("session expired or invalid credentials")]
    Unauthorized,
    #[error("api error {status}: {}", .body.message.as_deref().unwrap_or("no message"))]
    Api {
        status: StatusCode,
        body: ApiErrorBody,
    },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    #[error("local store failure: {0}")]
    Storage(anyhow::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Api { status, body } => {
                *status == StatusCode::UNPROCESSABLE_ENTITY || !body.errors.is_empty()
            }
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Text for an inline form error: local validation verbatim, then joined
    /// server field errors, then the server message, then `fallback`.
    pub fn dialog_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Api { body, .. } => body
                .joined_field_errors()
                .or_else(|| body.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
            Self::Unauthorized => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Like [`Self::dialog_message`] but only the first field error, the way
    /// the registration screen reports problems.
    pub fn first_error_message(&self, fallback: &str) -> String {
        match self {
            Self::Api { body, .. } => body
                .first_field_error()
                .map(str::to_string)
                .or_else(|| body.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
            other => other.dialog_message(fallback),
        }
    }

    /// Message for list/detail pages, which never show server internals.
    pub fn page_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Unauthorized => self.to_string(),
            Self::Api { status, .. } if *status == StatusCode::NOT_FOUND => {
                "Not found".to_string()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(value: anyhow::Error) -> Self {
        Self::Storage(value)
    }
}
