use super::{ApiError, ClientSource, API_KEY_HEADER};
use crate::app::AppState;
use crate::guarded::{Caller, ScanRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct SqlmapBody {
    url: String,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NmapBody {
    args: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RunResponse {
    stdout: String,
    stderr: String,
    code: i32,
    report_id: String,
}

pub(super) async fn run_sqlmap(
    State(state): State<AppState>,
    ClientSource(source): ClientSource,
    headers: HeaderMap,
    body: Result<Json<SqlmapBody>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_input(rejection.body_text()))?;
    let request = ScanRequest::Web {
        url: body.url,
        action: body.action,
    };
    run(&state, caller(&headers, source), request).await
}

pub(super) async fn run_nmap(
    State(state): State<AppState>,
    ClientSource(source): ClientSource,
    headers: HeaderMap,
    body: Result<Json<NmapBody>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_input(rejection.body_text()))?;
    run(&state, caller(&headers, source), ScanRequest::Port { args: body.args }).await
}

async fn run(
    state: &AppState,
    caller: Caller,
    request: ScanRequest,
) -> Result<Json<RunResponse>, ApiError> {
    let outcome = state.executor.execute(&caller, &request).await?;
    Ok(Json(RunResponse {
        stdout: outcome.result.stdout,
        stderr: outcome.result.stderr,
        code: outcome.result.exit_code,
        report_id: outcome.report_id.to_string(),
    }))
}

fn caller(headers: &HeaderMap, source: String) -> Caller {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Caller { api_key, source }
}
