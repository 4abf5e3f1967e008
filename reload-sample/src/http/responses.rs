use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub message: String,
    pub uuid: String,
    pub hot_reload: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: String,
    pub timestamp: String,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub framework: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub method: String,
    pub path: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct HashResponse {
    pub input: String,
    pub hash: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub username: String,
    pub token: String,
    pub expires: String,
}

#[derive(Debug, Serialize)]
pub struct YamlResponse {
    pub json: String,
    pub yaml: String,
}

/// RFC 3339 in UTC with whole seconds, e.g. `2024-05-01T12:00:00Z`.
pub fn wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
