//! Natural-language student search.
//!
//! Pipeline: authenticate, validate, sanitize roster, redact query, compose
//! prompt, infer, loose-parse, then intersect the returned ids with the ids of
//! the roster the caller sent. The model can narrow the roster but never add
//! to it.

use std::collections::HashSet;

use tracing::{field, info, info_span, warn, Instrument, Span};

use crate::auth::{require_caller, AuthenticatedUser};
use crate::config::Limits;
use crate::error::ApiError;
use crate::http::decode_body;
use crate::inference::{ensure_configured, infer_object, InferenceGateway};
use crate::models::{SearchRequest, SearchResponse};
use crate::prompt::build_search_prompt;
use crate::roster::{sanitize_roster, RosterEntry};
use crate::trace::TraceId;
use crate::validate::{validate_ids, validate_reason};
use crate::{Error, Result};

/// Endpoint boundary for the search call.
pub async fn search_students(
    gateway: &dyn InferenceGateway,
    limits: &Limits,
    caller: Option<&AuthenticatedUser>,
    body: &[u8],
    trace_id: &TraceId,
) -> std::result::Result<SearchResponse, ApiError> {
    let span = info_span!("student_search", trace_id = %trace_id, uid = field::Empty);
    async {
        run_search(gateway, limits, caller, body, trace_id)
            .await
            .map_err(|err| {
                if err.is_client_facing() {
                    warn!(code = err.code().as_str(), "Student search rejected: {}", err);
                }
                ApiError::from_error(err, trace_id)
            })
    }
    .instrument(span)
    .await
}

struct ValidSearch {
    query_text: String,
    students: Vec<RosterEntry>,
}

fn validate_request(request: SearchRequest, limits: &Limits) -> Result<ValidSearch> {
    let query_text = request
        .query_text
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if query_text.is_empty() {
        return Err(Error::invalid_argument("queryText is required"));
    }
    if query_text.chars().count() > limits.max_query_chars {
        return Err(Error::invalid_argument(format!(
            "queryText must be at most {} characters",
            limits.max_query_chars
        )));
    }

    let students = request.students.unwrap_or_default();
    if students.is_empty() {
        return Err(Error::invalid_argument("students must be a non-empty array"));
    }
    if students.len() > limits.max_roster_size {
        return Err(Error::invalid_argument(format!(
            "students must contain at most {} entries",
            limits.max_roster_size
        )));
    }
    if students.iter().any(|s| s.id.trim().is_empty()) {
        return Err(Error::invalid_argument("every student needs an id"));
    }

    Ok(ValidSearch {
        query_text,
        students,
    })
}

async fn run_search(
    gateway: &dyn InferenceGateway,
    limits: &Limits,
    caller: Option<&AuthenticatedUser>,
    body: &[u8],
    trace_id: &TraceId,
) -> Result<SearchResponse> {
    let caller = require_caller(caller)?;
    Span::current().record("uid", caller.user_id.as_str());
    let request: SearchRequest = decode_body(body)?;
    let locale = request.locale;
    let search = validate_request(request, limits)?;
    ensure_configured(gateway)?;

    let sanitized = sanitize_roster(&search.students);
    let prompt = build_search_prompt(&search.query_text, &sanitized, locale)?;
    let parsed = infer_object(gateway, &prompt, trace_id).await?;

    // Allowed ids come from the caller's roster, not from the sanitized copy.
    let allowed: HashSet<&str> = search.students.iter().map(|s| s.id.as_str()).collect();
    let ids = validate_ids(&parsed, &allowed);
    let reason = validate_reason(&parsed);

    info!(
        uid = %caller.user_id,
        input_count = search.students.len(),
        output_count = ids.len(),
        query_len = search.query_text.chars().count(),
        "Student search completed"
    );

    Ok(SearchResponse { ids, reason })
}
