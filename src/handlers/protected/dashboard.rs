//! Dashboard aggregates for the caller's organization.

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{OrgService, ReviewService, UserService};
use crate::state::AppState;

/// GET /api/dashboard/stats - Counts, average rating, sentiment breakdown,
/// and the five most recent reviews.
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.pool.clone())
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    let organization_id = OrgService::new(state.pool.clone())
        .resolve_for_user(user.id, &user.name)
        .await?;

    let reviews = ReviewService::new(state.pool.clone());
    let stats = reviews.stats(organization_id).await?;
    let recent = reviews.recent(organization_id, 5).await?;

    let average = (stats.average_rating * 10.0).round() / 10.0;

    Ok(Json(json!({
        "totalReviews": stats.total_reviews,
        "pendingResponses": stats.pending_responses,
        "averageRating": average,
        "sentimentBreakdown": {
            "positive": stats.positive_count,
            "neutral": stats.neutral_count,
            "negative": stats.negative_count,
        },
        "recentReviews": recent
            .iter()
            .map(|review| {
                json!({
                    "id": review.id,
                    "platform": review.platform,
                    "rating": review.rating,
                    "text": review.text,
                    "author_name": review.author_name,
                    "sentiment": review.sentiment.as_deref().unwrap_or("neutral"),
                    "created_at": review.created_at,
                    "status": review.status,
                })
            })
            .collect::<Vec<_>>(),
    })))
}
