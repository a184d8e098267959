//! Tenant-scoped review CRUD.
//!
//! Every single-resource operation loads the row first, distinguishes a
//! missing review (404) from one owned by another organization (403), and
//! only then acts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::review::{Platform, Review, ReviewStatus, Sentiment};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{NewReview, OrgService, ReviewFilters, ReviewService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub sentiment: Option<String>,
}

// Required fields stay optional at the serde layer so missing keys surface
// as field-level validation errors instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateReviewRequest {
    pub platform: Option<String>,
    pub review_id: Option<String>,
    pub rating: Option<i64>,
    pub text: Option<String>,
    pub author_name: Option<String>,
    pub sentiment: Option<String>,
    pub topics: Option<String>,
    pub review_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub response_draft: Option<String>,
    pub status: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub topics: Option<String>,
}

/// GET /api/reviews - List the caller's reviews with filters and pagination
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let api = &config::config().api;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(api.default_page_size);

    if page < 1 {
        return Err(ApiError::bad_request("page must be at least 1"));
    }
    if limit < 1 || limit > api.max_page_size {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {}",
            api.max_page_size
        )));
    }

    let filters = validate_filters(&query)?;

    let organization_id = resolve_organization(&state, &auth).await?;
    let (reviews, total) = ReviewService::new(state.pool.clone())
        .list(organization_id, &filters, page, limit)
        .await?;

    Ok(Json(json!({
        "reviews": reviews,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages(total, limit),
        },
    })))
}

/// POST /api/reviews - Ingest a review for the caller's organization
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new_review = validate_create(&payload)?;

    let organization_id = resolve_organization(&state, &auth).await?;
    let review = match ReviewService::new(state.pool.clone())
        .create(organization_id, &new_review)
        .await
    {
        Ok(review) => review,
        Err(DatabaseError::UniqueViolation(_)) => {
            return Err(ApiError::conflict(
                "Review already exists for this platform and review ID",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Review created successfully",
            "review": review,
        })),
    ))
}

/// GET /api/reviews/:id - Fetch one review, ownership-checked
pub async fn get_one(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let review = load_owned_review(&state, &auth, &id).await?;
    Ok(Json(json!({ "review": review })))
}

/// PUT /api/reviews/:id - Partial update of response/status and/or sentiment
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_update(&payload)?;

    let review = load_owned_review(&state, &auth, &id).await?;
    let reviews = ReviewService::new(state.pool.clone());

    // Each group defaults unspecified fields to the row's current value.
    if payload.response_draft.is_some() || payload.status.is_some() {
        let draft = payload
            .response_draft
            .as_deref()
            .or(review.response_draft.as_deref());
        let status = payload.status.as_deref().unwrap_or(review.status.as_str());
        reviews.update_response(review.id, draft, status).await?;
    }

    if payload.sentiment.is_some() || payload.sentiment_score.is_some() || payload.topics.is_some()
    {
        let sentiment = payload.sentiment.as_deref().or(review.sentiment.as_deref());
        let score = payload.sentiment_score.or(review.sentiment_score);
        let topics = payload.topics.as_deref().or(review.topics.as_deref());
        reviews
            .update_sentiment(review.id, sentiment, score, topics)
            .await?;
    }

    let updated = reviews
        .get(review.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Review updated successfully",
        "review": updated,
    })))
}

/// DELETE /api/reviews/:id - Remove one review, ownership-checked
pub async fn delete_one(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let review = load_owned_review(&state, &auth, &id).await?;

    let deleted = ReviewService::new(state.pool.clone())
        .delete(review.id)
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Review not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Review deleted successfully",
    })))
}

/// Load a review by path id and confirm the caller's organization owns it.
async fn load_owned_review(
    state: &AppState,
    auth: &AuthUser,
    raw_id: &str,
) -> Result<Review, ApiError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid review ID"))?;

    let review = ReviewService::new(state.pool.clone())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    let owned = OrgService::new(state.pool.clone())
        .ids_for_user(auth.user_id)
        .await?;
    if !owned.contains(&review.organization_id) {
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(review)
}

async fn resolve_organization(state: &AppState, auth: &AuthUser) -> Result<i64, ApiError> {
    // The claims carry no display name; the lazily created organization is
    // named after the current user row.
    let user = crate::services::UserService::new(state.pool.clone())
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    let org_id = OrgService::new(state.pool.clone())
        .resolve_for_user(user.id, &user.name)
        .await?;
    Ok(org_id)
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

fn validate_filters(query: &ListQuery) -> Result<ReviewFilters, ApiError> {
    let mut field_errors = HashMap::new();

    if let Some(platform) = &query.platform {
        if Platform::parse(platform).is_none() {
            field_errors.insert("platform".to_string(), "Unknown platform".to_string());
        }
    }
    if let Some(status) = &query.status {
        if ReviewStatus::parse(status).is_none() {
            field_errors.insert("status".to_string(), "Unknown status".to_string());
        }
    }
    if let Some(sentiment) = &query.sentiment {
        if Sentiment::parse(sentiment).is_none() {
            field_errors.insert("sentiment".to_string(), "Unknown sentiment".to_string());
        }
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(field_errors)));
    }

    Ok(ReviewFilters {
        platform: query.platform.clone(),
        status: query.status.clone(),
        sentiment: query.sentiment.clone(),
    })
}

fn validate_create(payload: &CreateReviewRequest) -> Result<NewReview, ApiError> {
    let mut field_errors = HashMap::new();

    let platform = payload.platform.as_deref().unwrap_or("");
    if Platform::parse(platform).is_none() {
        field_errors.insert("platform".to_string(), "Unknown platform".to_string());
    }

    let review_id = payload.review_id.as_deref().unwrap_or("").trim().to_string();
    if review_id.is_empty() {
        field_errors.insert("review_id".to_string(), "Review ID is required".to_string());
    }

    let rating = payload.rating.unwrap_or(0);
    if !(1..=5).contains(&rating) {
        field_errors.insert(
            "rating".to_string(),
            "Rating must be between 1 and 5".to_string(),
        );
    }

    if let Some(sentiment) = &payload.sentiment {
        if Sentiment::parse(sentiment).is_none() {
            field_errors.insert("sentiment".to_string(), "Unknown sentiment".to_string());
        }
    }

    let review_date = match &payload.review_date {
        Some(raw) => match raw.parse::<DateTime<Utc>>() {
            Ok(date) => date,
            Err(_) => {
                field_errors.insert(
                    "review_date".to_string(),
                    "Invalid datetime format".to_string(),
                );
                Utc::now()
            }
        },
        None => Utc::now(),
    };

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(field_errors)));
    }

    Ok(NewReview {
        platform: platform.to_string(),
        review_id,
        rating,
        text: payload.text.clone().unwrap_or_default(),
        author_name: payload
            .author_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string()),
        sentiment: payload
            .sentiment
            .clone()
            .unwrap_or_else(|| "neutral".to_string()),
        topics: payload.topics.clone().unwrap_or_default(),
        review_date,
    })
}

fn validate_update(payload: &UpdateReviewRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if let Some(status) = &payload.status {
        if ReviewStatus::parse(status).is_none() {
            field_errors.insert("status".to_string(), "Unknown status".to_string());
        }
    }
    if let Some(sentiment) = &payload.sentiment {
        if Sentiment::parse(sentiment).is_none() {
            field_errors.insert("sentiment".to_string(), "Unknown sentiment".to_string());
        }
    }
    if let Some(score) = payload.sentiment_score {
        if !(-1.0..=1.0).contains(&score) {
            field_errors.insert(
                "sentiment_score".to_string(),
                "Sentiment score must be between -1 and 1".to_string(),
            );
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_the_ceiling() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(100, 20), 5);
        assert_eq!(total_pages(101, 20), 6);
    }

    #[test]
    fn create_defaults_follow_the_contract() {
        let payload = CreateReviewRequest {
            platform: Some("google".to_string()),
            review_id: Some("g-1".to_string()),
            rating: Some(4),
            ..Default::default()
        };
        let review = validate_create(&payload).expect("valid");
        assert_eq!(review.text, "");
        assert_eq!(review.author_name, "Anonymous");
        assert_eq!(review.sentiment, "neutral");
        assert_eq!(review.topics, "");
    }

    #[test]
    fn create_rejects_bad_platform_rating_and_id() {
        let payload = CreateReviewRequest {
            platform: Some("myspace".to_string()),
            review_id: Some("  ".to_string()),
            rating: Some(6),
            sentiment: Some("meh".to_string()),
            review_date: Some("January 5th".to_string()),
            ..Default::default()
        };
        let err = validate_create(&payload).expect_err("invalid");
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                let errors = field_errors.expect("field errors");
                for field in ["platform", "review_id", "rating", "sentiment", "review_date"] {
                    assert!(errors.contains_key(field), "missing {}", field);
                }
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn create_treats_missing_fields_as_field_errors() {
        let err = validate_create(&CreateReviewRequest::default()).expect_err("invalid");
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                let errors = field_errors.expect("field errors");
                for field in ["platform", "review_id", "rating"] {
                    assert!(errors.contains_key(field), "missing {}", field);
                }
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn update_bounds_sentiment_score() {
        let payload = UpdateReviewRequest {
            response_draft: None,
            status: None,
            sentiment: None,
            sentiment_score: Some(1.5),
            topics: None,
        };
        assert!(validate_update(&payload).is_err());

        let payload = UpdateReviewRequest {
            sentiment_score: Some(-1.0),
            response_draft: None,
            status: None,
            sentiment: None,
            topics: None,
        };
        assert!(validate_update(&payload).is_ok());
    }
}
