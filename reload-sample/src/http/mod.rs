//! HTTP layer: Axum router, request envelope, and responses.
//!
//! Exposes the reload signal endpoints (`/`, `/health`, `/info`, `/version`,
//! `/echo`) and the computational ones (`/hash`, `/token`, `/yaml`).

mod endpoints;
mod error;
mod handlers;
mod request;
mod responses;
mod state;


pub use handlers::router;
pub use state::AppState;
