use std::error::Error as _;

use axum::http::header::ALLOW;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::convert::ConvertError;
use crate::credential::HashError;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[error("Failed to read request body")]
    UnreadableBody,
    #[error("Empty input")]
    EmptyInput,
    #[error("Invalid JSON")]
    InvalidTokenBody,
    #[error("Invalid JSON input")]
    InvalidJson,
    #[error("username is required")]
    MissingUsername,
    #[error("Failed to generate hash")]
    HashFailed(#[source] HashError),
    #[error("Failed to generate token")]
    SigningFailed(#[source] TokenError),
    #[error("Failed to convert to YAML")]
    ConversionFailed(#[source] ConvertError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnreadableBody
            | ApiError::EmptyInput
            | ApiError::InvalidTokenBody
            | ApiError::InvalidJson
            | ApiError::MissingUsername => StatusCode::BAD_REQUEST,
            ApiError::HashFailed(_) | ApiError::SigningFailed(_) | ApiError::ConversionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let cause = self.source().map(ToString::to_string).unwrap_or_default();
            error!(error = %self, cause = %cause, "request failed");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        let mut response = (status, body).into_response();
        if matches!(self, ApiError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
