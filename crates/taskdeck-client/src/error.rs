use taskdeck_shared::DraftError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Service,
    MalformedResponse,
}

/// Failures surfaced by the task API client. They are never retried or
/// reinterpreted here; callers decide what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    #[error("request failed with status code {status}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Transport(_) => FailureKind::Transport,
            ApiError::Service { .. } => FailureKind::Service,
            ApiError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user. Service failures prefer the `error` or
    /// `message` field of a JSON error body when there is one.
    pub fn user_message(&self) -> String {
        if let ApiError::Service { body, .. } = self
            && let Some(detail) = service_detail(body)
        {
            return format!("{self} ({detail})");
        }
        self.to_string()
    }
}

fn service_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str())
        .filter(|detail| !detail.trim().is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] DraftError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
