/**
 * Public Page Routes
 * Home, blog index and blog post, per locale
 */
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::content;
use crate::db::models::ContactSettings;
use crate::db::StoreError;
use crate::i18n::{dictionary, Dictionary, Locale};
use crate::error::AppError;
use crate::views::seo::{self, post_path, PageMeta};
use crate::views::{public, public_layout, render, Notice, NoticeParams, PublicPage};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{lang}", get(home))
        .route("/{lang}/blog", get(blog_index))
        .route("/{lang}/blog/{slug}", get(blog_post))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("unknown locale")]
    UnknownLocale,

    #[error("page not found")]
    NotFound(Locale),

    #[error("could not load page content: {1}")]
    Store(Locale, StoreError),
}

impl PageError {
    /// Error page in the visitor's language. Uses the configured contact
    /// details so it renders even when the store is down.
    pub fn render(self, state: &AppState) -> Response {
        let (locale, status) = match &self {
            PageError::UnknownLocale => (Locale::DEFAULT, StatusCode::NOT_FOUND),
            PageError::NotFound(locale) => (*locale, StatusCode::NOT_FOUND),
            PageError::Store(locale, e) => {
                tracing::error!(locale = %locale, error = %e, "public page failed to load");
                (*locale, StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
        (status, error_page(state, locale, status)).into_response()
    }
}

fn error_page(state: &AppState, locale: Locale, status: StatusCode) -> Html<String> {
    let dict = dictionary(locale);
    let (title, message) = if status == StatusCode::NOT_FOUND {
        (dict.not_found.title.as_str(), dict.not_found.message.as_str())
    } else {
        (dict.server_error.title.as_str(), dict.server_error.message.as_str())
    };
    let meta = PageMeta::simple(title, message);
    let current_path = format!("/{}", locale);
    let page = PublicPage {
        locale,
        dict,
        meta: &meta,
        current_path: &current_path,
        contact: &state.config.defaults.contact,
        notice: None,
    };
    let content = if status == StatusCode::NOT_FOUND {
        public::not_found(locale, dict)
    } else {
        maud::html! {
            section.container {
                h1 { (title) }
                p { (message) }
                a.button href={ "/" (locale) } { (dict.not_found.back) }
            }
        }
    };
    render(public_layout(&page, content))
}

// ============================================================================
// Rendering
// ============================================================================

/// Locale, dictionary and the contact details every public page shows.
pub(crate) struct PageContext {
    pub locale: Locale,
    pub dict: &'static Dictionary,
    pub contact: ContactSettings,
}

impl PageContext {
    pub(crate) async fn load(state: &AppState, lang: &str) -> Result<Self, PageError> {
        let locale = Locale::parse(lang).ok_or(PageError::UnknownLocale)?;
        let contact = content::get_contact_settings(state.store.as_ref(), &state.config.defaults)
            .await
            .map_err(|e| PageError::Store(locale, e))?;
        Ok(Self {
            locale,
            dict: dictionary(locale),
            contact,
        })
    }

    pub(crate) fn store_error(&self) -> impl Fn(StoreError) -> PageError {
        let locale = self.locale;
        move |e| PageError::Store(locale, e)
    }

    pub(crate) fn page(
        &self,
        meta: &PageMeta,
        current_path: &str,
        notice: Option<&Notice>,
        content: maud::Markup,
    ) -> Html<String> {
        let page = PublicPage {
            locale: self.locale,
            dict: self.dict,
            meta,
            current_path,
            contact: &self.contact,
            notice,
        };
        render(public_layout(&page, content))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /{lang}
pub async fn home(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    Query(params): Query<NoticeParams>,
) -> Response {
    match render_home(&state, &lang, params).await {
        Ok(html) => html.into_response(),
        Err(e) => e.render(&state),
    }
}

async fn render_home(
    state: &AppState,
    lang: &str,
    params: NoticeParams,
) -> Result<Html<String>, PageError> {
    let ctx = PageContext::load(state, lang).await?;
    let store = state.store.as_ref();
    let home = content::get_home_page_data(store, &state.config.defaults)
        .await
        .map_err(ctx.store_error())?;
    let posts = content::get_recent_posts(store, content::HOME_RECENT_POSTS)
        .await
        .map_err(ctx.store_error())?;

    let meta = seo::home_meta(&state.config, ctx.locale, ctx.dict, &ctx.contact);
    let path = format!("/{}", ctx.locale);
    let notice = params.into_notice();
    Ok(ctx.page(
        &meta,
        &path,
        notice.as_ref(),
        public::home(ctx.locale, ctx.dict, &home, &posts),
    ))
}

/// GET /{lang}/blog
pub async fn blog_index(State(state): State<AppState>, Path(lang): Path<String>) -> Response {
    match render_blog_index(&state, &lang).await {
        Ok(html) => html.into_response(),
        Err(e) => e.render(&state),
    }
}

async fn render_blog_index(state: &AppState, lang: &str) -> Result<Html<String>, PageError> {
    let ctx = PageContext::load(state, lang).await?;
    let posts = content::get_posts(state.store.as_ref())
        .await
        .map_err(ctx.store_error())?;

    let meta = seo::blog_index_meta(&state.config, ctx.locale, ctx.dict);
    let path = format!("/{}/blog", ctx.locale);
    Ok(ctx.page(&meta, &path, None, public::blog_index(ctx.locale, ctx.dict, &posts)))
}

/// GET /{lang}/blog/{slug}
pub async fn blog_post(
    State(state): State<AppState>,
    Path((lang, slug)): Path<(String, String)>,
) -> Response {
    match render_blog_post(&state, &lang, &slug).await {
        Ok(html) => html.into_response(),
        Err(e) => e.render(&state),
    }
}

async fn render_blog_post(
    state: &AppState,
    lang: &str,
    slug: &str,
) -> Result<Html<String>, PageError> {
    let ctx = PageContext::load(state, lang).await?;
    let store = state.store.as_ref();
    let post = content::get_post(store, slug)
        .await
        .map_err(ctx.store_error())?
        .ok_or(PageError::NotFound(ctx.locale))?;
    let related = content::get_related_posts(store, &post.id)
        .await
        .map_err(ctx.store_error())?;

    let meta = seo::post_meta(&state.config, ctx.locale, &post);
    let path = format!("/{}{}", ctx.locale, post_path(&post.slug));
    Ok(ctx.page(
        &meta,
        &path,
        None,
        public::blog_post(ctx.locale, ctx.dict, &post, &related),
    ))
}

/// Catch-all: JSON for API paths, the 404 page for everything else.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return AppError::NotFound(path.to_string()).into_response();
    }

    tracing::debug!(path = %path, "no route matched");
    let locale = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .and_then(Locale::parse)
        .unwrap_or(Locale::DEFAULT);
    PageError::NotFound(locale).render(&state)
}

#[cfg(test)]
mod tests {
    use crate::content::tests::seed_post;
    use crate::db::models::{PostStatus, CONTACT_KEY, SETTINGS};
    use crate::db::{DocumentStore, WriteMode};
    use crate::routes::admin::tests::test_app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_home_renders_defaults_and_published_posts() {
        let (app, store, _) = test_app();
        seed_post(store.as_ref(), "visible", "2024-07-21", PostStatus::Published).await;
        seed_post(store.as_ref(), "hidden", "2024-07-22", PostStatus::Draft).await;

        let (status, body) = get(app, "/en").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("https://placehold.co/1920x1080.png"));
        assert!(body.contains("tel:0812345678"));
        assert!(body.contains("/en/blog/visible"));
        assert!(!body.contains("/en/blog/hidden"));
        assert!(body.contains("hreflang=\"th-TH\""));
    }

    #[tokio::test]
    async fn test_draft_post_is_not_found() {
        let (app, store, _) = test_app();
        seed_post(store.as_ref(), "secret", "2024-07-21", PostStatus::Draft).await;
        let (status, _) = get(app.clone(), "/th/blog/secret").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get(app, "/th/blog/missing-slug").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_page_has_article_schema() {
        let (app, store, _) = test_app();
        seed_post(store.as_ref(), "clean-sofa", "2024-07-21", PostStatus::Published).await;
        let (status, body) = get(app, "/en/blog/clean-sofa").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"@type\":\"Article\""));
        assert!(body.contains("href=\"/th/blog/clean-sofa\""));
    }

    #[tokio::test]
    async fn test_unknown_locale_is_not_found() {
        let (app, _, _) = test_app();
        let (status, _) = get(app.clone(), "/fr/blog").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

        let (status, body) = get(app, "/th/fr/blog").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("lang=\"th\""));
    }

    #[tokio::test]
    async fn test_saved_contact_settings_reach_the_widget() {
        let (app, store, _) = test_app();
        store
            .set(
                SETTINGS,
                CONTACT_KEY,
                serde_json::json!({"phone": "021112222"}),
                WriteMode::Merge,
            )
            .await
            .unwrap();
        let (_, body) = get(app, "/th/blog").await;
        assert!(body.contains("tel:021112222"));
    }

    #[tokio::test]
    async fn test_unknown_api_path_gets_json() {
        let (app, _, _) = test_app();
        let (status, body) = get(app, "/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"error\":\"Not found: /api/nothing\""));
    }
}
