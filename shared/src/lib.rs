//! Shared library for the coach assistant Lambda functions.
//!
//! Holds the AI-assisted student search and fitness comment pipelines together
//! with the redaction, prompt, inference and validation stages they share.

pub mod auth;
pub mod comment;
pub mod config;
pub mod error;
pub mod http;
pub mod inference;
pub mod models;
pub mod prompt;
pub mod redact;
pub mod roster;
pub mod search;
pub mod secrets;
pub mod trace;
pub mod validate;

#[cfg(test)]
mod testing;

pub use auth::{extract_user_from_context, AuthenticatedUser};
pub use comment::fitness_comment;
pub use config::{Config, InferenceSettings, Limits};
pub use error::{ApiError, Error, ErrorCode, Result};
pub use inference::{InferenceGateway, OpenAiGateway};
pub use models::{FitnessCommentRequest, FitnessCommentResponse, Locale, SearchRequest, SearchResponse};
pub use search::search_students;
pub use secrets::{get_secret, resolve_api_key};
pub use trace::TraceId;
