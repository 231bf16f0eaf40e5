/**
 * Authentication
 * Session tokens for the single admin identity, the JSON auth endpoints,
 * and the guard every admin screen sits behind
 */
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::AppState;

/// Cookie carrying the session token for browser logins.
pub const SESSION_COOKIE: &str = "admin_session";
pub const ADMIN_ROLE: &str = "ADMIN";
const ADMIN_USER_ID: &str = "admin";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated admin, placed in request extensions by [`require_admin`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentAdmin {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for UserInfo {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(error: &str) -> Self {
        Self {
            success: false,
            user: None,
            access_token: None,
            expires_in: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Helper Functions
// ============================================================================

pub fn create_session_token(
    auth: &AuthConfig,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(auth.session_ttl_hours);

    let claims = Claims {
        sub: ADMIN_USER_ID.to_string(),
        email: email.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
}

pub fn verify_session_token(
    auth: &AuthConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Session token from the cookie, or from an `Authorization: Bearer` header.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| extract_bearer_token(headers))
}

/// Compares against the configured admin identity. bcrypt runs on a
/// blocking thread.
pub async fn check_credentials(auth: &AuthConfig, email: &str, password: &str) -> bool {
    if !email.trim().eq_ignore_ascii_case(&auth.admin_email) {
        tracing::warn!(email = %email, "login attempt for unknown user");
        return false;
    }

    let password = password.to_string();
    let hash = auth.admin_password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false);

    if !ok {
        tracing::warn!(email = %email, "failed login attempt");
    }
    ok
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// ============================================================================
// Guard
// ============================================================================

/// Lets the request through only with a valid admin session; everyone else
/// is sent to the login form.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = session_token(&jar, request.headers())
        .and_then(|token| match verify_session_token(&state.config.auth, &token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "rejected admin session");
                None
            }
        });

    let Some(claims) = claims else {
        return Redirect::to("/admin").into_response();
    };

    request.extensions_mut().insert(CurrentAdmin {
        email: claims.email,
        role: claims.role,
    });
    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Email and password are required")),
        )
            .into_response();
    }
    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Invalid email format")),
        )
            .into_response();
    }

    let auth = &state.config.auth;
    if !check_credentials(auth, &payload.email, &payload.password).await {
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid credentials")),
        )
            .into_response();
    }

    let token = match create_session_token(auth, &auth.admin_email) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to create session token");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Failed to create token")),
            )
                .into_response();
        }
    };

    tracing::info!(email = %auth.admin_email, "admin logged in");
    let jar = jar.add(session_cookie(token.clone(), state.config.is_production()));
    (
        jar,
        Json(LoginResponse {
            success: true,
            user: Some(UserInfo {
                user_id: ADMIN_USER_ID.to_string(),
                email: auth.admin_email.clone(),
                role: ADMIN_ROLE.to_string(),
            }),
            access_token: Some(token),
            expires_in: Some(auth.session_ttl_hours * 3600),
            error: None,
        }),
    )
        .into_response()
}

/// POST /api/auth/verify
pub async fn verify_token(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(token) = session_token(&jar, &headers) else {
        return Json(VerifyResponse {
            success: false,
            is_valid: false,
            user: None,
            error: Some("No authorization token provided".to_string()),
        });
    };

    match verify_session_token(&state.config.auth, &token) {
        Ok(claims) => Json(VerifyResponse {
            success: true,
            is_valid: true,
            user: Some(claims.into()),
            error: None,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            Json(VerifyResponse {
                success: false,
                is_valid: false,
                user: None,
                error: Some("Invalid or expired token".to_string()),
            })
        }
    }
}

/// POST /api/auth/logout
///
/// Always succeeds. Tokens are stateless, so this only drops the cookie.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Json(LogoutResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::db::memory::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::routing::{get, post};
    use axum::{middleware, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), SiteConfig::default())
    }

    fn auth_router(state: AppState) -> Router {
        let guarded = Router::new()
            .route("/admin/dashboard", get(|| async { "dashboard" }))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/verify", post(verify_token))
            .route("/api/auth/logout", post(logout))
            .merge(guarded)
            .with_state(state)
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &impl serde::Serialize,
    ) -> (StatusCode, HeaderMap, axum::body::Bytes) {
        let body = Body::from(serde_json::to_vec(json).unwrap());
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_token_round_trip_and_wrong_secret() {
        let config = SiteConfig::default();
        let token = create_session_token(&config.auth, "admin@example.com").unwrap();
        let claims = verify_session_token(&config.auth, &token).unwrap();
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);

        let mut other = config.auth.clone();
        other.jwt_secret = "another-secret".to_string();
        assert!(verify_session_token(&other, &token).is_err());
    }

    #[test]
    fn test_verify_invalid_token_returns_err() {
        let config = SiteConfig::default();
        assert!(verify_session_token(&config.auth, "invalid.jwt.token").is_err());
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let (status, _, _) = post_json(
            auth_router(test_state()),
            "/api/auth/login",
            &login_request("", "admin123"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_invalid_email_format_returns_bad_request() {
        let (status, _, _) = post_json(
            auth_router(test_state()),
            "/api/auth/login",
            &login_request("no-at-sign", "admin123"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let (status, _, _) = post_json(
            auth_router(test_state()),
            "/api/auth/login",
            &login_request("admin@example.com", "wrongpassword"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_success_sets_cookie_and_token() {
        let (status, headers, bytes) = post_json(
            auth_router(test_state()),
            "/api/auth/login",
            &login_request("Admin@Example.com", "admin123"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: LoginResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.success);
        assert!(body.access_token.is_some());

        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("admin_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_verify_no_token_returns_error_in_body() {
        let req = Request::post("/api/auth/verify").body(Body::empty()).unwrap();
        let res = auth_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: VerifyResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert!(!body.is_valid);
    }

    #[tokio::test]
    async fn test_guard_redirects_without_session() {
        let req = Request::get("/admin/dashboard").body(Body::empty()).unwrap();
        let res = auth_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin");
    }

    #[tokio::test]
    async fn test_guard_accepts_cookie_and_bearer() {
        let state = test_state();
        let token = create_session_token(&state.config.auth, "admin@example.com").unwrap();

        let req = Request::get("/admin/dashboard")
            .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .body(Body::empty())
            .unwrap();
        let res = auth_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let req = Request::get("/admin/dashboard")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let res = auth_router(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_returns_success() {
        let req = Request::post("/api/auth/logout").body(Body::empty()).unwrap();
        let res = auth_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let req = Request::post("/api/auth/logout")
            .header(header::COOKIE, format!("{}=abc", SESSION_COOKIE))
            .body(Body::empty())
            .unwrap();
        let res = auth_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("admin_session="));
    }
}
