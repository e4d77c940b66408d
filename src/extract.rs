//! Bearer-token request guards.
//!
//! Handlers that need an authenticated caller take [`AuthUser`] (or
//! [`AdminUser`]) as an argument; extraction reads the `Authorization`
//! header, authenticates the token through the verifier, and loads the
//! user record. Any failure (missing header, malformed token, bad
//! signature, expired token, deleted user) rejects uniformly with 401.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::Json;

use crate::app_state::AppState;
use crate::domain::{Role, User};
use crate::handlers::ErrorResponse;

/// An authenticated caller.
pub(crate) struct AuthUser(pub User);

/// An authenticated caller holding the admin role.
pub(crate) struct AdminUser(pub User);

fn unauthorized() -> (StatusCode, Json<ErrorResponse>) {
    // ---
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "not authorized to access this route".to_string(),
        }),
    )
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    // ---
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    // ---
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let token = bearer_token(parts).ok_or_else(unauthorized)?;

        let user = state
            .verifier()
            .authenticate(token)
            .await
            .map_err(|_| unauthorized())?;

        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    // ---
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "not authorized to access this route".to_string(),
                }),
            ));
        }

        Ok(AdminUser(user))
    }
}
