use std::convert::Infallible;

use axum::extract::{FromRequest, Request};
use axum::http::Method;
use bytes::Bytes;
use tracing::debug;

/// Everything a handler may look at: the request line and the raw body.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    /// Raw query string, empty when the URI has none.
    pub query: String,
    /// `None` when the body could not be read.
    pub body: Option<Bytes>,
}

#[cfg(test)]
impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: String::new(),
            body: Some(Bytes::new()),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl<S> FromRequest<S> for RequestEnvelope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();

        // Unreadable bodies are reported by the handler, after its method check.
        let body = match Bytes::from_request(req, state).await {
            Ok(body) => Some(body),
            Err(rejection) => {
                debug!(error = %rejection, "failed to read request body");
                None
            }
        };

        Ok(Self {
            method,
            path,
            query,
            body,
        })
    }
}
