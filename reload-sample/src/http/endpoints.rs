//! Request handling proper, independent of axum.
//!
//! Every function here maps a [`RequestEnvelope`] (plus read-only settings and
//! the current time) to a response body or an [`ApiError`]. None of them keep
//! state between calls.

use std::collections::HashMap;

use axum::http::Method;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::convert;
use crate::credential;
use crate::token::TokenIssuer;

use super::error::ApiError;
use super::request::RequestEnvelope;
use super::responses::{
    wire_timestamp, EchoResponse, HashResponse, HealthResponse, IdentityResponse, InfoResponse,
    TokenResponse, VersionResponse, YamlResponse,
};
use super::state::AppState;

const INFO_NOTE: &str = "New info endpoint to verify sync/restart";

pub fn identity(state: &AppState) -> IdentityResponse {
    IdentityResponse {
        message: format!("Hello from {} - Hot Reload Test", state.service_name),
        uuid: Uuid::new_v4().to_string(),
        hot_reload: state.reload_marker.to_string(),
    }
}

pub fn status(state: &AppState, now: DateTime<Utc>) -> HealthResponse {
    HealthResponse {
        status: "ok",
        service: state.service_name.to_string(),
        timestamp: wire_timestamp(now),
    }
}

pub fn info(state: &AppState, now: DateTime<Utc>) -> InfoResponse {
    InfoResponse {
        service: state.service_name.to_string(),
        timestamp: wire_timestamp(now),
        note: INFO_NOTE,
    }
}

pub fn version(now: DateTime<Utc>) -> VersionResponse {
    VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        framework: "axum",
        timestamp: wire_timestamp(now),
    }
}

pub fn echo(request: &RequestEnvelope) -> EchoResponse {
    EchoResponse {
        method: request.method.to_string(),
        path: request.path.clone(),
        query: request.query.clone(),
    }
}

/// `POST /hash`: bcrypt digest of the raw body.
pub fn hash(cost: u32, request: &RequestEnvelope) -> Result<HashResponse, ApiError> {
    let body = post_body(request)?;
    if body.is_empty() {
        return Err(ApiError::EmptyInput);
    }

    let digest = credential::hash_secret(body, cost).map_err(ApiError::HashFailed)?;
    Ok(HashResponse {
        input: String::from_utf8_lossy(body).into_owned(),
        hash: digest,
    })
}

/// `POST /token`: signs a claim set for the `username` in a flat JSON object.
pub fn token(
    tokens: &TokenIssuer,
    request: &RequestEnvelope,
    now: DateTime<Utc>,
) -> Result<TokenResponse, ApiError> {
    let body = post_body(request)?;
    // `null` parses as an absent map and falls through to the missing-username case.
    let fields: Option<HashMap<String, String>> = serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejecting token request body");
        ApiError::InvalidTokenBody
    })?;
    let username = fields
        .as_ref()
        .and_then(|fields| fields.get("username"))
        .filter(|username| !username.is_empty())
        .ok_or(ApiError::MissingUsername)?;

    let issued = tokens
        .issue(username, now)
        .map_err(ApiError::SigningFailed)?;
    debug!(username = %issued.username, "token issued");

    Ok(TokenResponse {
        username: issued.username,
        token: issued.token,
        expires: wire_timestamp(issued.expires_at),
    })
}

/// `POST /yaml`: re-encodes a JSON document as YAML.
pub fn yaml(request: &RequestEnvelope) -> Result<YamlResponse, ApiError> {
    let body = post_body(request)?;
    let document = convert::parse_json(body).map_err(|err| {
        debug!(error = %err, "rejecting yaml request body");
        ApiError::InvalidJson
    })?;
    let yaml = convert::to_yaml(&document).map_err(ApiError::ConversionFailed)?;

    Ok(YamlResponse {
        json: String::from_utf8_lossy(body).into_owned(),
        yaml,
    })
}

/// Method check first, then body availability.
fn post_body(request: &RequestEnvelope) -> Result<&Bytes, ApiError> {
    if request.method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    request.body.as_ref().ok_or(ApiError::UnreadableBody)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;

    use crate::credential::verify_secret;
    use crate::http::error::ApiError;
    use crate::http::request::RequestEnvelope;
    use crate::http::state::AppState;
    use crate::token::{StaticKey, TokenIssuer, TOKEN_ISSUER};

    fn state() -> AppState {
        AppState {
            service_name: Arc::from("unit-sample"),
            reload_marker: Arc::from("MARKER"),
            hash_cost: 4,
            tokens: TokenIssuer::new(Arc::new(StaticKey::new("unit-secret"))),
        }
    }

    fn post(path: &str, body: &'static str) -> RequestEnvelope {
        RequestEnvelope::new(Method::POST, path).with_body(body)
    }

    #[test]
    fn status_is_ok_with_rfc3339_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let response = super::status(&state(), now);
        assert_eq!(response.status, "ok");
        assert_eq!(response.service, "unit-sample");
        assert_eq!(response.timestamp, "2024-05-01T12:30:00Z");
        assert!(DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[test]
    fn identity_generates_fresh_uuids() {
        let state = state();
        let first = super::identity(&state);
        let second = super::identity(&state);
        assert_ne!(first.uuid, second.uuid);
        assert_eq!(first.hot_reload, "MARKER");
        assert!(first.message.contains("unit-sample"));
    }

    #[test]
    fn echo_copies_request_line() {
        let request = RequestEnvelope::new(Method::PUT, "/echo").with_query("a=1&b=%20x");
        let response = super::echo(&request);
        assert_eq!(response.method, "PUT");
        assert_eq!(response.path, "/echo");
        assert_eq!(response.query, "a=1&b=%20x");
    }

    #[test]
    fn hash_returns_input_and_verifiable_digest() {
        let response = super::hash(4, &post("/hash", "s3cret")).unwrap();
        assert_eq!(response.input, "s3cret");
        assert!(verify_secret(b"s3cret", &response.hash).unwrap());
    }

    #[test]
    fn write_endpoints_reject_other_methods_before_reading_body() {
        let state = state();
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let mut request = RequestEnvelope::new(method, "/x");
            request.body = None;

            let err = super::hash(state.hash_cost, &request).unwrap_err();
            assert!(matches!(err, ApiError::MethodNotAllowed));
            let err = super::token(&state.tokens, &request, Utc::now()).unwrap_err();
            assert!(matches!(err, ApiError::MethodNotAllowed));
            let err = super::yaml(&request).unwrap_err();
            assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[test]
    fn unreadable_body_is_a_client_error() {
        let mut request = RequestEnvelope::new(Method::POST, "/hash");
        request.body = None;
        let err = super::hash(4, &request).unwrap_err();
        assert!(matches!(err, ApiError::UnreadableBody));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_hash_input_is_rejected() {
        let err = super::hash(4, &post("/hash", "")).unwrap_err();
        assert!(matches!(err, ApiError::EmptyInput));
    }

    #[test]
    fn hash_failure_maps_to_server_error() {
        let err = super::hash(2, &post("/hash", "secret")).unwrap_err();
        assert!(matches!(err, ApiError::HashFailed(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn token_distinguishes_invalid_json_from_missing_username() {
        let state = state();
        let now = Utc::now();

        for body in ["not json", "[1,2]", r#"{"username":42}"#] {
            let err = super::token(&state.tokens, &post("/token", body), now).unwrap_err();
            assert!(matches!(err, ApiError::InvalidTokenBody), "body {body}");
        }
        for body in ["{}", r#"{"username":""}"#, r#"{"user":"alice"}"#, "null"] {
            let err = super::token(&state.tokens, &post("/token", body), now).unwrap_err();
            assert!(matches!(err, ApiError::MissingUsername), "body {body}");
        }
    }

    #[test]
    fn token_expires_a_day_after_issue() {
        let state = state();
        let now = Utc::now();
        let response =
            super::token(&state.tokens, &post("/token", r#"{"username":"alice"}"#), now).unwrap();

        assert_eq!(response.username, "alice");
        assert_eq!(response.token.matches('.').count(), 2);
        let expires = DateTime::parse_from_rfc3339(&response.expires).unwrap();
        assert_eq!(expires.timestamp() - now.timestamp(), 86_400);

        let claims = state.tokens.verify(&response.token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn yaml_returns_original_json_and_equivalent_yaml() {
        let body = r#"{"a":1,"b":[1,2]}"#;
        let response = super::yaml(&post("/yaml", body)).unwrap();
        assert_eq!(response.json, body);

        let back: Value = serde_yaml::from_str(&response.yaml).unwrap();
        let original: Value = serde_json::from_str(body).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn yaml_rejects_malformed_json() {
        let err = super::yaml(&post("/yaml", "{\"a\":")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson));
    }
}
