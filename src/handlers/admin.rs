//! Admin dashboard handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveTime, Utc};
use serde::Serialize;

use crate::app_state::AppState;
use crate::domain::UserStats;
use crate::extract::AdminUser;
use crate::handlers::shared_types::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    // ---
    pub success: bool,
    pub data: UserStats,
}

/// GET /api/admin/user-stats
///
/// Role and sign-up counts for the admin dashboard. "New today" counts
/// records created since UTC midnight.
pub async fn user_stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<UserStatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let midnight = Utc::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();

    let stats = state
        .repository()
        .user_stats(midnight)
        .await
        .map_err(|err| {
            tracing::error!("failed to aggregate user stats: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "database error".to_string(),
                }),
            )
        })?;

    Ok(Json(UserStatsResponse {
        success: true,
        data: stats,
    }))
}
