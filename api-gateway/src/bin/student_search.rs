//! Student Search Lambda - Handles POST /v1/students/search.
//!
//! Filters the trainer's roster with a natural-language query. The roster is
//! sanitized before it reaches the model and the model's answer is intersected
//! with the roster ids before it reaches the caller.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{caller_from_request, respond};
use shared::{resolve_api_key, search_students, Config, Limits, OpenAiGateway, TraceId};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    gateway: OpenAiGateway,
    limits: Limits,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&sdk_config);

        let api_key = resolve_api_key(&config, &secrets_client).await?;
        if api_key.is_none() {
            warn!("AI API key not configured; search requests will be rejected");
        }

        info!(model = %config.inference.model, "Student search initialised");

        Ok(Self {
            gateway: OpenAiGateway::new(config.inference, api_key)?,
            limits: config.limits,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let trace_id = TraceId::generate();
    let caller = caller_from_request(&event);

    let outcome = search_students(
        &state.gateway,
        &state.limits,
        caller.as_ref(),
        event.body().as_ref(),
        &trace_id,
    )
    .await;

    respond(outcome)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
