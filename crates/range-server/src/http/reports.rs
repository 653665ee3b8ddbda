use super::ApiError;
use crate::app::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

pub(super) async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reports = state.executor.reports().clone();
    let text = tokio::task::spawn_blocking(move || reports.read(&id))
        .await
        .map_err(|err| ApiError::infrastructure(err.to_string()))??;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}
