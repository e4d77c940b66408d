use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::verifier::AuthError;

/// Error payload returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a protocol rejection to an HTTP response.
///
/// Internal failures are logged here, at the boundary, with their source
/// chain; the client only ever sees the generic message.
pub(crate) fn reject(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    let status = match &err {
        AuthError::MissingFields(_) | AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials
        | AuthError::InvalidGraphicalPassword(_)
        | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Internal(source) => {
            tracing::error!("internal failure: {source:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Registration variant of [`reject`]: a wrong point count is a validation
/// problem (400), not a failed login (401).
pub(crate) fn reject_registration(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    match err {
        AuthError::InvalidGraphicalPassword(_) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: err.to_string() }))
        }
        other => reject(other),
    }
}
