//! Account lifecycle endpoints: signup, login, logout.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

use crate::auth::{self, cookies};
use crate::database::manager::DatabaseError;
use crate::error::ApiError;
use crate::services::{OrgService, UserService};
use crate::state::AppState;

// Fields stay optional so missing keys surface as field-level validation
// errors instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/signup - Create an account and its default organization
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let (email, password, name) = validate_signup(&payload)?;

    let users = UserService::new(state.pool.clone());
    let password_hash = auth::hash_password(&password)?;

    let user = match users.create(&email, Some(&password_hash), &name).await {
        Ok(user) => user,
        Err(DatabaseError::UniqueViolation(_)) => {
            return Err(ApiError::conflict("An account with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    // Organization creation is a secondary effect; signup still succeeds if
    // it fails and tenant resolution will retry on first access.
    let orgs = OrgService::new(state.pool.clone());
    let organization_id = match orgs
        .create(&format!("{}'s Organization", name), user.id)
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to create organization for user {}: {}", user.id, e);
            None
        }
    };

    let body = json!({
        "success": true,
        "message": "Account created successfully",
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "role": user.role,
            "subscription_status": user.subscription_status,
            "trial_end_date": user.trial_end_date,
        },
        "organizationId": organization_id,
    });

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// POST /api/auth/login - Authenticate and receive a session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let mut field_errors = HashMap::new();
    let email = payload.email.as_deref().unwrap_or("").trim().to_string();
    let password = payload.password.clone().unwrap_or_default();
    if email.is_empty() {
        field_errors.insert("email".to_string(), "Email is required".to_string());
    }
    if password.is_empty() {
        field_errors.insert("password".to_string(), "Password is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(field_errors)));
    }

    let users = UserService::new(state.pool.clone());

    // Unknown email and wrong password are indistinguishable here.
    let user = users
        .authenticate(&email, &password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let token = auth::generate_token(user.id, &user.email, &user.role)?;

    let body = json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": user,
    });

    let mut response = Json(body).into_response();
    if let Ok(value) = header::HeaderValue::from_str(&cookies::session_cookie(&token)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// POST /api/auth/logout - Clear the session cookie. GET is also accepted.
pub async fn logout() -> Response {
    let body = json!({
        "success": true,
        "message": "Logout successful",
    });

    let mut response = Json(body).into_response();
    if let Ok(value) = header::HeaderValue::from_str(&cookies::clear_session_cookie()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn validate_signup(payload: &SignupRequest) -> Result<(String, String, String), ApiError> {
    let mut field_errors = HashMap::new();

    let email = payload.email.as_deref().unwrap_or("").trim().to_string();
    let password = payload.password.clone().unwrap_or_default();
    let name = payload.name.as_deref().unwrap_or("").trim().to_string();

    if !is_plausible_email(&email) {
        field_errors.insert("email".to_string(), "Invalid email address".to_string());
    }

    if password.len() < 8 {
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
    } else if !password_has_required_classes(&password) {
        field_errors.insert(
            "password".to_string(),
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                .to_string(),
        );
    }

    let name_len = name.chars().count();
    if name_len < 2 {
        field_errors.insert(
            "name".to_string(),
            "Name must be at least 2 characters".to_string(),
        );
    } else if name_len > 50 {
        field_errors.insert(
            "name".to_string(),
            "Name must be less than 50 characters".to_string(),
        );
    }

    if field_errors.is_empty() {
        Ok((email, password, name))
    } else {
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn password_has_required_classes(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
