/**
 * Admin Routes
 * Login plus the guarded back-office screens
 */
pub mod blog;
pub mod dashboard;
pub mod quotes;
pub mod settings;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::db::StoreError;
use crate::routes::auth::{
    check_credentials, clear_session, create_session_token, require_admin, session_cookie,
    session_token, verify_session_token,
};
use crate::views::{self, admin_layout, with_notice, Notice, NoticeParams};
use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/admin/dashboard", get(dashboard::dashboard))
        .route("/admin/analytics", get(dashboard::analytics))
        .route("/admin/blog", get(blog::list))
        .route("/admin/blog/new", get(blog::new_form).post(blog::create))
        .route("/admin/blog/edit/{id}", get(blog::edit_form).post(blog::update))
        .route("/admin/blog/{id}/status", post(blog::set_status))
        .route("/admin/blog/{id}/delete", post(blog::delete))
        .route("/admin/quotes", get(quotes::list))
        .route("/admin/quotes/{id}/status", post(quotes::set_status))
        .route("/admin/quotes/{id}/delete", post(quotes::delete))
        .route(
            "/admin/settings/contact",
            get(settings::contact_form).post(settings::save_contact),
        )
        .route(
            "/admin/homepage",
            get(settings::homepage_form).post(settings::save_homepage),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/admin", get(login_page))
        .route("/admin/login", post(login_submit))
        .route("/admin/logout", post(logout))
        .merge(guarded)
}

/// Full admin page with an optional notice banner.
pub(crate) fn page(title: &str, notice: Option<&Notice>, content: maud::Markup) -> Html<String> {
    views::render(admin_layout(title, notice, content))
}

/// Post-redirect-get back to `path`, carrying `notice`.
pub(crate) fn redirect_with(path: &str, notice: Notice) -> Response {
    Redirect::to(&with_notice(path, &notice)).into_response()
}

/// Logs a failed write and sends the admin back with an error notice.
pub(crate) fn write_failed(path: &str, action: &str, error: StoreError) -> Response {
    match error {
        StoreError::NotFound { .. } => {
            tracing::warn!(action, error = %error, "admin write on missing document");
            redirect_with(path, Notice::error("ไม่พบข้อมูลที่ต้องการ"))
        }
        other => {
            tracing::error!(action, error = %other, "admin write failed");
            redirect_with(path, Notice::error("เกิดข้อผิดพลาด ไม่สามารถบันทึกข้อมูลได้"))
        }
    }
}

/// Error page for a screen whose data could not be loaded.
pub(crate) fn load_failed(title: &str, error: StoreError) -> Response {
    tracing::error!(screen = title, error = %error, "admin screen failed to load");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        page(
            title,
            Some(&Notice::error("ไม่สามารถโหลดข้อมูลได้ กรุณาลองใหม่อีกครั้ง")),
            maud::html! { p { a href="/admin/dashboard" { "← กลับไปหน้า Dashboard" } } },
        ),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// GET /admin
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<NoticeParams>,
) -> Response {
    let signed_in = session_token(&jar, &headers)
        .is_some_and(|token| verify_session_token(&state.config.auth, &token).is_ok());
    if signed_in {
        return Redirect::to("/admin/dashboard").into_response();
    }
    page("เข้าสู่ระบบ", params.into_notice().as_ref(), views::admin::login("")).into_response()
}

/// POST /admin/login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = &state.config.auth;
    if !check_credentials(auth, &form.email, &form.password).await {
        return (
            StatusCode::UNAUTHORIZED,
            page(
                "เข้าสู่ระบบ",
                Some(&Notice::error("อีเมลหรือรหัสผ่านไม่ถูกต้อง")),
                views::admin::login(&form.email),
            ),
        )
            .into_response();
    }

    match create_session_token(auth, &auth.admin_email) {
        Ok(token) => {
            tracing::info!(email = %auth.admin_email, "admin signed in");
            let jar = jar.add(session_cookie(token, state.config.is_production()));
            (jar, Redirect::to("/admin/dashboard")).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create session token");
            redirect_with("/admin", Notice::error("เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้ง"))
        }
    }
}

/// POST /admin/logout
pub async fn logout(jar: CookieJar) -> Response {
    (clear_session(jar), Redirect::to("/admin")).into_response()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::db::memory::MemoryStore;
    use crate::db::DocumentStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Full application over a fresh in-memory store.
    pub(crate) fn test_app() -> (Router, Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), SiteConfig::default());
        let token = create_session_token(&state.config.auth, "admin@example.com").unwrap();
        (crate::create_app(state), store, token)
    }

    pub(crate) fn session_header(token: &str) -> String {
        format!("{}={}", crate::routes::auth::SESSION_COOKIE, token)
    }

    pub(crate) async fn admin_get(app: Router, token: &str, uri: &str) -> (StatusCode, String) {
        let req = Request::get(uri)
            .header(header::COOKIE, session_header(token))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Posts a urlencoded form and returns the status and `Location` header.
    pub(crate) async fn admin_post(
        app: Router,
        token: &str,
        uri: &str,
        form: &str,
    ) -> (StatusCode, Option<String>) {
        let req = Request::post(uri)
            .header(header::COOKIE, session_header(token))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        (res.status(), location)
    }

    #[tokio::test]
    async fn test_screens_redirect_without_session() {
        let (app, _, _) = test_app();
        for uri in ["/admin/dashboard", "/admin/blog", "/admin/quotes", "/admin/homepage"] {
            let req = Request::get(uri).body(Body::empty()).unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(res.headers()[header::LOCATION], "/admin");
        }
    }

    #[tokio::test]
    async fn test_login_form_signs_in() {
        let (app, _, _) = test_app();
        let req = Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=admin%40example.com&password=admin123"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin/dashboard");
        assert!(res.headers().get(header::SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_login_form_rejects_bad_password() {
        let (app, _, _) = test_app();
        let req = Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=admin%40example.com&password=nope"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_page_skips_form_when_signed_in() {
        let (app, _, token) = test_app();
        let req = Request::get("/admin")
            .header(header::COOKIE, session_header(&token))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin/dashboard");
    }

    #[tokio::test]
    async fn test_dashboard_shows_signed_in_email() {
        let (app, store, token) = test_app();
        let (status, body) = admin_get(app, &token, "/admin/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("admin@example.com"));
        assert_eq!(store.count(crate::db::models::POSTS).await.unwrap(), 0);
    }
}
