use axum::extract::{DefaultBodyLimit, State};
use axum::routing::any;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::credential::HashError;

use super::endpoints;
use super::error::ApiError;
use super::request::RequestEnvelope;
use super::responses::{
    EchoResponse, HashResponse, HealthResponse, IdentityResponse, InfoResponse, TokenResponse,
    VersionResponse, YamlResponse,
};
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let request_id = axum::http::header::HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", any(identity))
        .route("/health", any(health))
        .route("/info", any(info))
        .route("/version", any(version))
        .route("/echo", any(echo))
        .route("/hash", any(hash))
        .route("/token", any(token))
        .route("/yaml", any(yaml))
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        // Outermost last: the id must be set before it can be propagated.
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(
            request_id,
            MakeRequestUuid::default(),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn identity(State(state): State<AppState>) -> Json<IdentityResponse> {
    Json(endpoints::identity(&state))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(endpoints::status(&state, Utc::now()))
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(endpoints::info(&state, Utc::now()))
}

async fn version() -> Json<VersionResponse> {
    Json(endpoints::version(Utc::now()))
}

async fn echo(request: RequestEnvelope) -> Json<EchoResponse> {
    Json(endpoints::echo(&request))
}

/// bcrypt is deliberately slow, so it runs on the blocking pool.
async fn hash(
    State(state): State<AppState>,
    request: RequestEnvelope,
) -> Result<Json<HashResponse>, ApiError> {
    let cost = state.hash_cost;
    tokio::task::spawn_blocking(move || endpoints::hash(cost, &request))
        .await
        .map_err(|err| ApiError::HashFailed(HashError::Task(err.to_string())))?
        .map(Json)
}

async fn token(
    State(state): State<AppState>,
    request: RequestEnvelope,
) -> Result<Json<TokenResponse>, ApiError> {
    endpoints::token(&state.tokens, &request, Utc::now()).map(Json)
}

async fn yaml(request: RequestEnvelope) -> Result<Json<YamlResponse>, ApiError> {
    endpoints::yaml(&request).map(Json)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
