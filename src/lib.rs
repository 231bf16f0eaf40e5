//! SofaClean Site - bilingual marketing site and content admin

pub mod analytics;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod i18n;
pub mod intake;
pub mod logging;
pub mod routes;
pub mod views;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use config::SiteConfig;
use db::memory::MemoryStore;
use db::postgres::{self, DbConfig, PgStore};
use db::DocumentStore;
use intake::geocode::Geocoder;

/// Request bodies above this are refused. Quote forms carry up to three photos.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<SiteConfig>,
    pub geocoder: Geocoder,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: SiteConfig) -> Self {
        let geocoder = Geocoder::new(config.geocoder_url.clone());
        Self {
            store,
            config: Arc::new(config),
            geocoder,
        }
    }
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, falling back to
/// the site's own URL.
pub fn configure_cors(config: &SiteConfig) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect::<Vec<HeaderValue>>()
        })
        .filter(|origins| !origins.is_empty())
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| config.site_url.parse().ok().into_iter().collect());

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);

    Router::new()
        .route("/api/logs", post(routes::logs::receive_client_logs))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready))
        .route("/sitemap.xml", get(routes::sitemap::sitemap))
        .merge(routes::pages::router())
        .merge(routes::quote::router())
        .merge(routes::admin::router(state.clone()))
        .fallback(routes::pages::fallback)
        .with_state(state)
        .layer(middleware::from_fn(routes::locale::redirect_to_locale))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Multipart obeys axum's own 2 MB default; the tower limit below replaces it
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

async fn open_store(config: &SiteConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let Some(url) = config.database_url.clone() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store; content is lost on restart.");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = postgres::init_pool(Some(DbConfig {
        url,
        ..DbConfig::default()
    }))
    .await
    .context("failed to connect to the database")?;
    postgres::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    Ok(Arc::new(PgStore::new(pool)))
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = SiteConfig::from_env();

    // Held for the process lifetime; dropping them stops the log writers.
    let _log_guards = logging::init(config.environment);

    routes::health::init_start_time();

    let errors = config.production_errors();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("{}", error);
        }
        anyhow::bail!("refusing to start: {}", errors.join("; "));
    }
    if config.is_production() && config.auth.admin_email == "admin@example.com" {
        tracing::warn!("SECURITY: ADMIN_EMAIL is using the example default");
    }

    let store = open_store(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT configuration")?;
    tracing::info!(
        environment = config.environment.as_str(),
        site_url = %config.site_url,
        "Starting server on {}",
        addr
    );

    let app = create_app(AppState::new(store, config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState::new(
            Arc::new(MemoryStore::new()),
            SiteConfig::default(),
        ))
    }

    async fn send(req: Request<Body>) -> axum::response::Response {
        app().oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_default_locale() {
        let res = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/th");
    }

    #[tokio::test]
    async fn test_accept_language_picks_english_and_keeps_query() {
        let res = send(
            Request::get("/blog?page=2")
                .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/en/blog?page=2");
    }

    #[tokio::test]
    async fn test_admin_and_health_are_not_localised() {
        let res = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let res = send(Request::get("/admin").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let res = send(Request::get("/th").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }
}
