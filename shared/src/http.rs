//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::auth::{extract_user_from_context, AuthenticatedUser};
use crate::error::{ApiError, ErrorCode};
use crate::{Error, Result};

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error payload: machine-readable code, message and correlation details.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub details: ErrorDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub trace_id: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: err.code,
                message: err.message.clone(),
                details: ErrorDetails {
                    trace_id: err.trace_id.clone(),
                },
            }),
        }
    }
}

/// Caller from the Cognito authorizer claims, if any.
pub fn caller_from_request(event: &Request) -> Option<AuthenticatedUser> {
    let claims = event
        .request_context_ref()?
        .authorizer()?
        .fields
        .get("claims")?;

    match extract_user_from_context(claims) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Failed to extract user: {}", e);
            None
        }
    }
}

/// Decode a JSON request body. Empty or malformed bodies are invalid arguments.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::invalid_argument("Missing request body"));
    }
    serde_json::from_slice(body).map_err(|e| {
        // serde's message can quote the offending value
        warn!(
            category = ?e.classify(),
            line = e.line(),
            column = e.column(),
            "Rejected request body"
        );
        Error::invalid_argument("Invalid request body")
    })
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Render an endpoint outcome into the response envelope.
pub fn respond<T: Serialize>(
    outcome: std::result::Result<T, ApiError>,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    match outcome {
        Ok(data) => json_response(200, &ApiResponse::success(data)),
        Err(err) => json_response(err.status_code(), &ApiResponse::error(&err)),
    }
}
