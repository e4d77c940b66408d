//! Authentication handlers.
//!
//! Thin HTTP adapters over the credential verifier: deserialize the
//! request, run the protocol operation, map the outcome to a status code.
//! All factor-checking logic lives in the verifier; nothing here inspects
//! passwords or points.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::User;
use crate::extract::AuthUser;
use crate::handlers::shared_types::{reject, reject_registration, ErrorResponse};
use crate::verifier::{
    ColorCheckInput, GraphicalCheckInput, LoginInput, RegisterInput, SportCheckInput,
};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    // ---
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCheckResponse {
    // ---
    pub success: bool,
    pub email: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportCheckResponse {
    // ---
    pub success: bool,
    pub image_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    // ---
    pub success: bool,
    pub data: User,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    // ---
    pub success: bool,
    pub data: serde_json::Value,
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/auth/register
///
/// Registers a new user with all four factors and logs them straight in.
///
/// # Request Body
/// ```json
/// {
///   "name": "Alice",
///   "email": "alice@example.com",
///   "password": "hunter2!",
///   "colorPreference": "blue",
///   "sportPreference": "tennis",
///   "graphicalPassword": { "imageId": "img-1", "points": [{"x":10,"y":10}, ...] }
/// }
/// ```
///
/// # Response
/// `200 OK` with a session token. Validation failures (missing fields,
/// wrong point count, duplicate email) are 400 with a specific message.
#[tracing::instrument(skip(state, input))]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let session = state
        .verifier()
        .register(input)
        .await
        .map_err(reject_registration)?;

    state.metrics().record_registration();

    Ok(Json(TokenResponse {
        success: true,
        token: session.token,
    }))
}

// ============================================================================
// Single-shot login
// ============================================================================

/// POST /api/auth/login
///
/// Verifies password and graphical points in one call and issues a
/// session token.
///
/// # Security
/// An unknown email and a wrong password produce byte-identical
/// responses, so the endpoint cannot be used to enumerate accounts.
#[tracing::instrument(skip(state, input))]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let result = state.verifier().verify_login(input).await;
    state.metrics().record_login(result.is_ok());

    let session = result.map_err(reject)?;

    Ok(Json(TokenResponse {
        success: true,
        token: session.token,
    }))
}

// ============================================================================
// Staged verification flow
// ============================================================================

/// POST /api/auth/verify-color
///
/// Staged flow, step 1: checks the declared color preference. Returns the
/// caller's id and email on success; never issues a session.
#[tracing::instrument(skip(state, input))]
pub async fn verify_color(
    State(state): State<AppState>,
    Json(input): Json<ColorCheckInput>,
) -> Result<Json<ColorCheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let check = state.verifier().verify_color(input).await.map_err(reject)?;

    Ok(Json(ColorCheckResponse {
        success: true,
        email: check.email,
        user_id: check.user_id,
    }))
}

/// POST /api/auth/verify-sport
///
/// Staged flow, step 2: checks sport preference and password together.
/// Success reveals which image to render for the graphical challenge.
#[tracing::instrument(skip(state, input))]
pub async fn verify_sport(
    State(state): State<AppState>,
    Json(input): Json<SportCheckInput>,
) -> Result<Json<SportCheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let check = state.verifier().verify_sport(input).await.map_err(reject)?;

    Ok(Json(SportCheckResponse {
        success: true,
        image_id: check.image_id,
    }))
}

/// POST /api/auth/verify-graphical
///
/// Staged flow, terminal step: checks the graphical points and, on
/// success, issues the session token.
#[tracing::instrument(skip(state, input))]
pub async fn verify_graphical(
    State(state): State<AppState>,
    Json(input): Json<GraphicalCheckInput>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let result = state.verifier().verify_graphical(input).await;
    state.metrics().record_login(result.is_ok());

    let session = result.map_err(reject)?;

    Ok(Json(TokenResponse {
        success: true,
        token: session.token,
    }))
}

// ============================================================================
// Session introspection
// ============================================================================

/// GET /api/auth/me
///
/// Returns the authenticated caller's record. The password hash is
/// stripped by serialization, not by the handler.
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    // ---
    Json(UserResponse {
        success: true,
        data: user,
    })
}

/// GET /api/auth/logout
///
/// Acknowledges logout. Session tokens are stateless, so the server has
/// nothing to revoke; the client discards its copy.
pub async fn logout(AuthUser(user): AuthUser) -> Json<LogoutResponse> {
    // ---
    tracing::info!(user_id = %user.id, "user logged out");

    Json(LogoutResponse {
        success: true,
        data: serde_json::json!({}),
    })
}
