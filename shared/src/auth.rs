//! Caller identity from the API Gateway authorizer context.

use serde_json::Value;

use crate::{Error, Result};

/// Decoded caller information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Trainer's Cognito subject
    pub user_id: String,
}

/// Extract the caller from Cognito authorizer claims.
///
/// When using Cognito authorizer, user info is in requestContext.authorizer.claims
pub fn extract_user_from_context(claims: &Value) -> Result<AuthenticatedUser> {
    let sub = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::unauthenticated("Missing sub claim"))?;

    Ok(AuthenticatedUser {
        user_id: sub.to_string(),
    })
}

/// First pipeline step of every endpoint.
pub fn require_caller(caller: Option<&AuthenticatedUser>) -> Result<&AuthenticatedUser> {
    caller.ok_or_else(|| Error::unauthenticated("Authentication required"))
}
