//! AWS Secrets Manager integration.

use std::future::Future;

use aws_sdk_secretsmanager::Client as SecretsClient;

use crate::{Config, Error, Result};

/// JSON fields that may hold the provider key inside a structured secret.
const API_KEY_FIELDS: &[&str] = &["apiKey", "api_key", "OPENAI_API_KEY"];

/// Get a secret value from Secrets Manager.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    response
        .secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))
}

/// Extract the provider key from a secret stored either as a bare string or as
/// a JSON object.
pub fn parse_api_key(secret: &str) -> Option<String> {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
        return API_KEY_FIELDS
            .iter()
            .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }
    Some(trimmed.to_string())
}

/// Resolve the inference API key: the direct value wins, then the secret.
///
/// Returns `Ok(None)` only when neither is configured; requests then fail with
/// failed-precondition. A failed secret fetch is an error so the function fails
/// its cold start and Lambda retries initialisation.
pub async fn resolve_api_key(config: &Config, client: &SecretsClient) -> Result<Option<String>> {
    resolve_api_key_with(config, |arn| async move { get_secret(client, &arn).await }).await
}

async fn resolve_api_key_with<F, Fut>(config: &Config, fetch: F) -> Result<Option<String>>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    if let Some(key) = &config.ai_api_key {
        return Ok(Some(key.clone()));
    }
    let Some(arn) = &config.ai_api_key_secret_arn else {
        return Ok(None);
    };
    let secret = fetch(arn.clone()).await?;
    Ok(parse_api_key(&secret))
}
