/**
 * Sitemap Route
 * GET /sitemap.xml built from the static pages and the curated post list
 */
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};

use crate::config::SiteConfig;
use crate::content;
use crate::views::seo::post_path;
use crate::AppState;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    /// W3C datetime
    pub last_modified: String,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Static pages stamped with `now`, then every curated post.
pub fn entries(config: &SiteConfig, now: &str) -> Vec<SitemapEntry> {
    let statics = [
        ("/", "daily", 1.0),
        ("/en", "daily", 1.0),
        ("/en/blog", "weekly", 0.9),
        ("/th", "daily", 1.0),
        ("/th/blog", "weekly", 0.9),
    ];

    let mut entries: Vec<SitemapEntry> = statics
        .iter()
        .map(|(path, change_frequency, priority)| SitemapEntry {
            url: config.absolute_url(path),
            last_modified: now.to_string(),
            change_frequency: *change_frequency,
            priority: *priority,
        })
        .collect();

    entries.extend(config.sitemap_posts.iter().map(|post| SitemapEntry {
        url: config.absolute_url(&format!("/{}{}", post.lang, post_path(&post.slug))),
        last_modified: format!("{}T00:00:00.000Z", post.last_modified.format("%Y-%m-%d")),
        change_frequency: "monthly",
        priority: 0.8,
    }));
    entries
}

pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "<url>\n<loc>{}</loc>\n<lastmod>{}</lastmod>\n<changefreq>{}</changefreq>\n<priority>{:.1}</priority>\n</url>\n",
            escape_xml(&entry.url),
            escape_xml(&entry.last_modified),
            entry.change_frequency,
            entry.priority,
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Logs published posts that the curated list does not mention.
async fn warn_about_uncurated_posts(state: &AppState) {
    match content::get_posts(state.store.as_ref()).await {
        Ok(posts) => {
            let missing: Vec<&str> = posts
                .iter()
                .filter(|post| {
                    !state
                        .config
                        .sitemap_posts
                        .iter()
                        .any(|entry| entry.slug == post.slug)
                })
                .map(|post| post.slug.as_str())
                .collect();
            if !missing.is_empty() {
                tracing::warn!(slugs = ?missing, "published posts missing from sitemap");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not compare sitemap with published posts"),
    }
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> Response {
    warn_about_uncurated_posts(&state).await;

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let xml = render_xml(&entries(&state.config, &now));
    (
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    )
        .into_response()
}
