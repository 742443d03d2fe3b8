//! Authentication middleware
//!
//! Two JWT layers: marketplace tokens issued by the upstream auth provider
//! (carrying the account's role claim), and admin session tokens issued by
//! this service's admin login.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorResponse;
use shared::models::{AccountRole, AdminPermission};

/// Authenticated marketplace user extracted from a JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub account_id: uuid::Uuid,
    /// Role claim as issued; the identity record remains authoritative
    pub role: AccountRole,
}

/// Authenticated admin extracted from an admin session JWT.
///
/// Holding a token is not enough to act: handlers still run the approval
/// gate against the stored account status.
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub admin_id: uuid::Uuid,
    pub permissions: Vec<AdminPermission>,
}

/// Marketplace authentication middleware
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims: UserClaims = match decode_jwt(token, &jwt_secret()) {
        Ok(claims) => claims,
        Err(msg) => return unauthorized_response(&msg),
    };

    let account_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid account ID in token"),
    };

    let role = match AccountRole::parse(&claims.role) {
        Some(role) => role,
        None => return unauthorized_response("Invalid role in token"),
    };

    request.extensions_mut().insert(AuthUser { account_id, role });

    next.run(request).await
}

/// Admin authentication middleware
pub async fn admin_auth_middleware(mut request: Request, next: Next) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims: AdminTokenClaims = match decode_jwt(token, &jwt_secret()) {
        Ok(claims) => claims,
        Err(msg) => return unauthorized_response(&msg),
    };

    let admin_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid admin ID in token"),
    };

    request.extensions_mut().insert(AdminUser {
        admin_id,
        permissions: claims.permissions,
    });

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

// Fallback for middleware without state
fn jwt_secret() -> String {
    std::env::var("YCM__JWT__SECRET")
        .or_else(|_| std::env::var("YCM_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string())
}

/// Marketplace token claims
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct UserClaims {
    sub: String,
    role: String,
    exp: i64,
    iat: i64,
}

/// Admin session token claims
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct AdminTokenClaims {
    sub: String,
    permissions: Vec<AdminPermission>,
    exp: i64,
    iat: i64,
}

/// Decode and validate a JWT
fn decode_jwt<T: serde::de::DeserializeOwned>(token: &str, secret: &str) -> Result<T, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
            status: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the authenticated marketplace user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(auth_required_rejection)
    }
}

/// Extractor for the authenticated admin
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .map(CurrentAdmin)
            .ok_or_else(auth_required_rejection)
    }
}

fn auth_required_rejection() -> (StatusCode, Json<ErrorResponse>) {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: "Authentication required".to_string(),
            field: None,
            status: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(error))
}
