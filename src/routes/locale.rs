/**
 * Locale Redirect Middleware
 * Every public page lives under /th or /en; anything else is redirected to
 * the same path under the visitor's preferred locale
 */
use axum::{
    extract::Request,
    http::header::ACCEPT_LANGUAGE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::i18n::Locale;

const EXCLUDED_PREFIXES: [&str; 2] = ["/admin", "/api"];
/// Infrastructure endpoints that never carry a locale.
const EXCLUDED_SEGMENTS: [&str; 1] = ["/health"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleDecision {
    PassThrough,
    Redirect(String),
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_excluded(path: &str) -> bool {
    path.contains('.')
        || EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
        || EXCLUDED_SEGMENTS.iter().any(|p| has_prefix(path, p))
        || Locale::ALL.iter().any(|l| has_prefix(path, &format!("/{}", l)))
}

/// Locale from the first `Accept-Language` entry, ignoring region and
/// quality. Anything unusable yields the default.
pub fn preferred_locale(accept_language: Option<&str>) -> Locale {
    accept_language
        .and_then(|header| header.split(',').next())
        .map(|entry| entry.split(';').next().unwrap_or_default())
        .map(|tag| tag.split('-').next().unwrap_or_default())
        .map(|lang| lang.trim().to_ascii_lowercase())
        .and_then(|lang| Locale::parse(&lang))
        .unwrap_or(Locale::DEFAULT)
}

pub fn decide(path: &str, query: Option<&str>, accept_language: Option<&str>) -> LocaleDecision {
    if is_excluded(path) {
        return LocaleDecision::PassThrough;
    }

    let locale = preferred_locale(accept_language);
    let mut target = if path == "/" || path.is_empty() {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, path)
    };
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    LocaleDecision::Redirect(target)
}

pub async fn redirect_to_locale(request: Request, next: Next) -> Response {
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    match decide(request.uri().path(), request.uri().query(), accept_language) {
        LocaleDecision::PassThrough => next.run(request).await,
        LocaleDecision::Redirect(target) => {
            tracing::debug!(from = %request.uri(), to = %target, "locale redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
