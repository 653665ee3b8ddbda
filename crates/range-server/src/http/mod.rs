//! HTTP and WebSocket surface.

mod error;
mod health;
mod relay;
mod reports;
mod scan;
mod source;

pub use error::ApiError;
pub use source::ClientSource;

use crate::app::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Header carrying the pre-shared key on guarded requests.
pub const API_KEY_HEADER: &str = "x-api-key";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/run/sqlmap", post(scan::run_sqlmap))
        .route("/run/nmap", post(scan::run_nmap))
        .route("/reports/{id}", get(reports::get_report))
        .route("/ws/relay", get(relay::relay_ws))
        .fallback(fallback)
        .with_state(state)
}

async fn fallback() -> ApiError {
    ApiError::not_found("no such route")
}
