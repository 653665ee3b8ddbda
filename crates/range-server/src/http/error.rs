use crate::guarded::GuardedError;
use access_gate::GateError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use report_sink::ReportError;
use std::time::Duration;

/// Error body `{"code", "message"}` with a status derived from the code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    retry_after: Option<Duration>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_input", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "infrastructure", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<GuardedError> for ApiError {
    fn from(err: GuardedError) -> Self {
        let message = err.to_string();
        match err {
            GuardedError::Gate(GateError::Unauthorized) => {
                Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
            }
            GuardedError::Gate(GateError::RateLimited { retry_after }) => Self {
                retry_after: Some(retry_after),
                ..Self::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", message)
            },
            GuardedError::Policy(violation) => {
                let status = match violation.code() {
                    "bad_input" => StatusCode::BAD_REQUEST,
                    _ => StatusCode::FORBIDDEN,
                };
                Self::new(status, violation.code(), message)
            }
            GuardedError::Runner(_) | GuardedError::Report(_) | GuardedError::Task(_) => {
                tracing::error!(error = %message, "guarded execution failed");
                Self::infrastructure(message)
            }
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotFound { .. } => Self::not_found(err.to_string()),
            ReportError::Io(_) => {
                tracing::error!(error = %err, "report read failed");
                Self::infrastructure(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "code": self.code, "message": self.message });
        let mut response = (self.status, Json(body)).into_response();

        if let Some(retry_after) = self.retry_after {
            // Round up so clients never retry early.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}
