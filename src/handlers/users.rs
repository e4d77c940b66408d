//! User administration and profile handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::{is_valid_email, normalize_email, ProfileUpdate, StoreError, User, UserSummary};
use crate::extract::{AdminUser, AuthUser};
use crate::handlers::shared_types::ErrorResponse;

// ============================================================================
// Response/Request Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    // ---
    pub success: bool,
    pub count: usize,
    pub data: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    // ---
    pub success: bool,
    pub data: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    // ---
    pub success: bool,
    pub data: User,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    // ---
    pub success: bool,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    // ---
    pub name: Option<String>,
    pub email: Option<String>,
}

fn db_error(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    tracing::error!("store failure: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "database error".to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    // ---
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "user not found".to_string(),
        }),
    )
}

// ============================================================================
// Admin: listing and deletion
// ============================================================================

/// GET /api/users
///
/// Lists all users. Admin only. Graphical click-points are omitted from
/// the listing; exposing another user's template would hand an attacker
/// the hardest factor.
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<UserListResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let users = state.repository().list_users().await.map_err(db_error)?;

    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        data: users,
    }))
}

/// GET /api/users/{id}
///
/// Fetches a single user without click-points. Admin only.
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let user = state
        .repository()
        .find_by_id(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    Ok(Json(UserDetailResponse {
        success: true,
        data: UserSummary::from(&user),
    }))
}

/// DELETE /api/users/{id}
///
/// Removes a user record. Admin only.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let removed = state.repository().delete_user(id).await.map_err(db_error)?;

    if !removed {
        return Err(not_found());
    }

    tracing::info!(deleted = %id, by = %admin.id, "user deleted");

    Ok(Json(DeletedResponse {
        success: true,
        data: serde_json::json!({}),
    }))
}

// ============================================================================
// Profile update
// ============================================================================

/// PUT /api/users/profile
///
/// Updates the caller's display name and/or email. The secret factors
/// have no update path; re-registration is the only way to change them.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let email = match req.email {
        Some(raw) => {
            let email = normalize_email(&raw);
            if !is_valid_email(&email) {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "please provide a valid email".to_string(),
                    }),
                ));
            }
            Some(email)
        }
        None => None,
    };

    let update = ProfileUpdate {
        name: req.name,
        email,
    };

    let updated = state
        .repository()
        .update_profile(user.id, update)
        .await
        .map_err(|err| match err {
            StoreError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "email already exists".to_string(),
                }),
            ),
            other => db_error(other),
        })?
        .ok_or_else(not_found)?;

    Ok(Json(ProfileResponse {
        success: true,
        data: updated,
    }))
}
