//! Fitness Comment Lambda - Handles POST /v1/students/{id}/fitness-comment.
//!
//! Produces a short interpretation of one student's measurements. Requests
//! that are not about fitness are rejected before the model is called.

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use shared::http::{caller_from_request, respond};
use shared::{fitness_comment, resolve_api_key, Config, OpenAiGateway, TraceId};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct AppState {
    gateway: OpenAiGateway,
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
            warn!("AI API key not configured; comment requests will be rejected");
        }

        info!(model = %config.inference.model, "Fitness comment initialised");

        Ok(Self {
            gateway: OpenAiGateway::new(config.inference, api_key)?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let trace_id = TraceId::generate();
    let caller = caller_from_request(&event);

    let path_params = event.path_parameters();

    let outcome = fitness_comment(
        &state.gateway,
        caller.as_ref(),
        path_params.first("id"),
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
