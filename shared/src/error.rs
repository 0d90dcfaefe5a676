//! Error types for the coach assistant Lambda functions.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::trace::TraceId;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving an assistant request.
#[derive(Error, Debug)]
pub enum Error {
    /// No caller identity on the request
    #[error("{0}")]
    Unauthenticated(String),

    /// Missing or malformed request field
    #[error("{0}")]
    InvalidArgument(String),

    /// Request cannot proceed because of server configuration or product policy
    #[error("{0}")]
    FailedPrecondition(String),

    /// The external inference call failed; details are only in the logs
    #[error("AI service failed")]
    AiService,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the inference provider
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error code returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    Unauthenticated,
    InvalidArgument,
    FailedPrecondition,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::FailedPrecondition => "failed-precondition",
            ErrorCode::Internal => "internal",
        }
    }

    /// Get HTTP status code for this error code.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCode::Unauthenticated => 401,
            ErrorCode::InvalidArgument | ErrorCode::FailedPrecondition => 400,
            ErrorCode::Internal => 500,
        }
    }
}

impl Error {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Error::Unauthenticated(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Error::FailedPrecondition(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Unauthenticated(_) => ErrorCode::Unauthenticated,
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::FailedPrecondition(_) => ErrorCode::FailedPrecondition,
            _ => ErrorCode::Internal,
        }
    }

    /// Errors raised deliberately inside the pipeline. Their message is safe to
    /// show to the caller.
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated(_)
                | Error::InvalidArgument(_)
                | Error::FailedPrecondition(_)
                | Error::AiService
        )
    }
}

/// The only error shape that is returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub trace_id: String,
}

pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal error";

impl ApiError {
    /// Convert a pipeline error at the endpoint boundary. Anything not raised
    /// deliberately is logged in full and replaced by a generic message.
    pub fn from_error(err: Error, trace_id: &TraceId) -> Self {
        if err.is_client_facing() {
            return Self {
                code: err.code(),
                message: err.to_string(),
                trace_id: trace_id.to_string(),
            };
        }

        error!(trace_id = %trace_id, error = ?err, "Unexpected failure: {}", err);
        Self {
            code: ErrorCode::Internal,
            message: GENERIC_INTERNAL_MESSAGE.to_string(),
            trace_id: trace_id.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (trace {})", self.code.as_str(), self.message, self.trace_id)
    }
}

impl std::error::Error for ApiError {}
