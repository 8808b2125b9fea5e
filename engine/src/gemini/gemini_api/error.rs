use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Gemini / Generative Language API, or by the way we
/// read its responses.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("API Key missing")]
    MissingApiKey,

    #[error("{kind} ({status}): {message}")]
    Api {
        status: u16,
        kind: GeminiErrorKind,
        message: String,
    },

    #[error("No text returned from Gemini")]
    EmptyResponse,

    /// The details are only logged, the user sees the generic message.
    #[error("Failed to discover location.")]
    MalformedResponse { details: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiErrorKind {
    InvalidArgument,
    FailedPrecondition,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    ResourceExhausted,
    Internal,
    Unavailable,
    DeadlineExceeded,
    Other(String),
}

impl GeminiErrorKind {
    pub fn from_status(status: &str) -> Self {
        match status {
            "INVALID_ARGUMENT" => Self::InvalidArgument,
            "FAILED_PRECONDITION" => Self::FailedPrecondition,
            "UNAUTHENTICATED" => Self::Unauthenticated,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "NOT_FOUND" => Self::NotFound,
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted,
            "INTERNAL" => Self::Internal,
            "UNAVAILABLE" => Self::Unavailable,
            "DEADLINE_EXCEEDED" => Self::DeadlineExceeded,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for GeminiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidArgument => "Invalid argument",
            Self::FailedPrecondition => "Failed precondition",
            Self::Unauthenticated => "Unauthenticated",
            Self::PermissionDenied => "Permission denied",
            Self::NotFound => "Not found",
            Self::ResourceExhausted => "Quota exhausted",
            Self::Internal => "Internal API error",
            Self::Unavailable => "API unavailable",
            Self::DeadlineExceeded => "Deadline exceeded",
            Self::Other(s) if s.is_empty() => "Unexpected API error",
            Self::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiError {
    /// Builds an error from a non-success HTTP response. Bodies that are not
    /// Google's error envelope are passed through as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => Self::Api {
                status,
                kind: GeminiErrorKind::from_status(&error.status),
                message: error.message,
            },
            Err(_) => Self::Api {
                status,
                kind: GeminiErrorKind::Other(String::new()),
                message: body.trim().to_string(),
            },
        }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        Self::MalformedResponse {
            details: details.into(),
        }
    }
}
