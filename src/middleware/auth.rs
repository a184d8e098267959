use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{cookies, verify_token, Claims};
use crate::database::models::user::Role;
use crate::error::ApiError;

/// Authenticated identity extracted from a verified token. Handlers trust
/// this context and only re-fetch the full user row when they need fields
/// beyond the claims.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    Admin,
}

const PROTECTED_PREFIXES: [&str; 4] = [
    "/api/reviews",
    "/api/ai",
    "/api/dashboard",
    "/api/subscription",
];

const PUBLIC_PREFIXES: [&str; 3] = ["/health", "/api/auth", "/api/seed"];

const ADMIN_PREFIXES: [&str; 1] = ["/api/admin"];

/// Classify a request path. Checked in order: protected, public, admin;
/// anything unmatched is public and will 404 downstream.
pub fn classify(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return RouteClass::Protected;
    }
    if path == "/" || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return RouteClass::Public;
    }
    if ADMIN_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return RouteClass::Admin;
    }
    RouteClass::Public
}

/// Route guard: enforces token presence, validity, and role before handlers
/// run, and forwards verified claims as request-scoped context.
pub async fn route_guard(mut request: Request, next: Next) -> Response {
    let class = classify(request.uri().path());

    if class == RouteClass::Public {
        return next.run(request).await;
    }

    let Some(token) = extract_token(request.headers()) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    let Some(claims) = verify_token(&token) else {
        // The cookie is no longer good for anything; clear it alongside the 401.
        let mut response = ApiError::unauthorized("Invalid or expired token").into_response();
        if let Ok(value) = HeaderValue::from_str(&cookies::clear_session_cookie()) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        return response;
    };

    if class == RouteClass::Admin && Role::parse(&claims.role) != Some(Role::Admin) {
        return ApiError::forbidden("Admin access required").into_response();
    }

    request.extensions_mut().insert(AuthUser::from(claims));
    next.run(request).await
}

/// Token from the `Authorization: Bearer` header, falling back to the
/// session cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.trim().is_empty() {
                    return Some(token.trim().to_string());
                }
            }
        }
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(cookies::token_from_cookie_header)
}
