//! Response draft generation endpoint.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::auth::can_access_feature;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::responder::{DraftRequest, Tone};
use crate::services::{OrgService, ReviewService, UserService};
use crate::state::AppState;

// Required fields stay optional at the serde layer so missing keys surface
// as field-level validation errors instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RespondRequest {
    pub review_id: Option<i64>,
    pub review_text: Option<String>,
    pub rating: Option<i64>,
    pub platform: Option<String>,
    pub tone: Option<String>,
    pub business_name: Option<String>,
    pub custom_instructions: Option<String>,
}

struct ValidatedRespond {
    review_text: String,
    rating: i64,
    platform: String,
    tone: Tone,
}

/// POST /api/ai/respond - Draft a reply to a review
pub async fn respond(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<RespondRequest>,
) -> Result<Json<Value>, ApiError> {
    let validated = validate(&payload)?;

    // Feature gating needs subscription fields the token does not carry.
    let user = UserService::new(state.pool.clone())
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    if !can_access_feature(&user, "ai_response") {
        return Err(ApiError::payment_required(
            "AI usage quota exceeded. Please upgrade your plan.",
        ));
    }

    let business_name = payload
        .business_name
        .clone()
        .unwrap_or_else(|| format!("{}'s Business", user.name));

    let request = DraftRequest {
        review_text: validated.review_text,
        rating: validated.rating,
        platform: validated.platform,
        tone: validated.tone,
        business_name,
        custom_instructions: payload.custom_instructions.clone(),
    };

    let draft = state.responder.generate(&request).await?;

    // Persisting the draft is a secondary effect; failures are logged and
    // the generated text still returned.
    if let Some(review_id) = payload.review_id {
        if let Err(e) = persist_draft(&state, &auth, review_id, &draft).await {
            warn!("Failed to persist draft for review {}: {}", review_id, e);
        }
    }

    Ok(Json(json!({
        "success": true,
        "response": draft,
        "usage": {
            "tokensUsed": draft.chars().count(),
            "remainingCredits": 100,
        },
    })))
}

/// Store the draft with status `pending`, but only on a review the caller's
/// organization owns.
async fn persist_draft(
    state: &AppState,
    auth: &AuthUser,
    review_id: i64,
    draft: &str,
) -> Result<(), ApiError> {
    let reviews = ReviewService::new(state.pool.clone());
    let review = reviews
        .get(review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    let owned = OrgService::new(state.pool.clone())
        .ids_for_user(auth.user_id)
        .await?;
    if !owned.contains(&review.organization_id) {
        return Err(ApiError::forbidden("Access denied"));
    }

    reviews
        .update_response(review.id, Some(draft), "pending")
        .await?;
    Ok(())
}

fn validate(payload: &RespondRequest) -> Result<ValidatedRespond, ApiError> {
    let mut field_errors = HashMap::new();

    let review_text = payload.review_text.clone().unwrap_or_default();
    if review_text.trim().is_empty() {
        field_errors.insert(
            "reviewText".to_string(),
            "Review text is required".to_string(),
        );
    }

    let rating = payload.rating.unwrap_or(0);
    if !(1..=5).contains(&rating) {
        field_errors.insert(
            "rating".to_string(),
            "Rating must be between 1 and 5".to_string(),
        );
    }

    let platform = payload.platform.clone().unwrap_or_default();
    if platform.trim().is_empty() {
        field_errors.insert("platform".to_string(), "Platform is required".to_string());
    }

    let tone = match &payload.tone {
        Some(raw) => match Tone::parse(raw) {
            Some(tone) => tone,
            None => {
                field_errors.insert("tone".to_string(), "Unknown tone".to_string());
                Tone::Professional
            }
        },
        None => Tone::Professional,
    };

    if field_errors.is_empty() {
        Ok(ValidatedRespond {
            review_text,
            rating,
            platform,
            tone,
        })
    } else {
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}
