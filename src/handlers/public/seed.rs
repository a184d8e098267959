//! Fixture seeding endpoint, blocked outside development/staging.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::services::fixtures;
use crate::state::AppState;

/// POST /api/seed - Populate fixture data. 403 in production.
pub async fn seed(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if config::config().is_production() {
        return Err(ApiError::forbidden("Seeding is not allowed in production"));
    }

    let summary = fixtures::seed_database(&state.pool)
        .await
        .map_err(|e| match e {
            fixtures::SeedError::Database(db) => ApiError::from(db),
            fixtures::SeedError::PasswordHash(msg) => {
                tracing::error!("Seeding failed: {}", msg);
                ApiError::internal_server_error("Database seeding failed")
            }
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Database seeded successfully",
        "created": {
            "users": summary.users_created,
            "reviews": summary.reviews_created,
        },
        "testCredentials": {
            "user": {
                "email": fixtures::TEST_USER_EMAIL,
                "password": fixtures::TEST_USER_PASSWORD,
            },
            "admin": {
                "email": fixtures::TEST_ADMIN_EMAIL,
                "password": fixtures::TEST_ADMIN_PASSWORD,
            },
        },
    })))
}
