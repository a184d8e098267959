//! Current billing status for the authenticated user.

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::{is_trial_active, needs_upgrade, trial_days_remaining};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{SubscriptionService, UserService};
use crate::state::AppState;

/// GET /api/subscription - Subscription row, trial window, and feature access.
pub async fn current(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.pool.clone())
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    let subscription = SubscriptionService::new(state.pool.clone())
        .active_for_user(user.id)
        .await?;

    Ok(Json(json!({
        "subscription": subscription,
        "subscription_status": user.subscription_status,
        "trial": {
            "active": is_trial_active(&user),
            "daysRemaining": trial_days_remaining(&user),
            "endsAt": user.trial_end_date,
        },
        "needsUpgrade": needs_upgrade(&user),
    })))
}
