//! Configuration management for Lambda functions.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::{Error, Result};

/// Application configuration loaded from environment variables once per cold start.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region
    pub aws_region: String,
    /// Inference provider API key, when supplied directly
    pub ai_api_key: Option<String>,
    /// ARN of the secret holding the inference provider API key
    pub ai_api_key_secret_arn: Option<String>,
    /// Inference provider settings
    pub inference: InferenceSettings,
    /// Request size limits
    pub limits: Limits,
}

/// Settings for the text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 700,
            timeout_secs: 30,
        }
    }
}

/// Request limits enforced before any external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_query_chars: usize,
    pub max_roster_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_query_chars: 500,
            max_roster_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = InferenceSettings::default();
        let default_limits = Limits::default();

        let temperature: f32 = parse_or(vars, "AI_TEMPERATURE", defaults.temperature)?;

        Ok(Self {
            aws_region: get("AWS_REGION").unwrap_or_else(|| "eu-central-1".to_string()),
            ai_api_key: get("OPENAI_API_KEY"),
            ai_api_key_secret_arn: get("OPENAI_API_KEY_SECRET_ARN"),
            inference: InferenceSettings {
                base_url: get("AI_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.base_url),
                model: get("AI_MODEL").unwrap_or(defaults.model),
                temperature: temperature.clamp(0.0, 1.0),
                max_tokens: parse_or(vars, "AI_MAX_TOKENS", defaults.max_tokens)?,
                timeout_secs: parse_or(vars, "AI_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
            limits: Limits {
                max_query_chars: parse_or(vars, "MAX_QUERY_CHARS", default_limits.max_query_chars)?,
                max_roster_size: parse_or(vars, "MAX_ROSTER_SIZE", default_limits.max_roster_size)?,
            },
        })
    }
}

fn parse_or<T: FromStr>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T> {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}
