//! Server-rendered HTML.
//!
//! `public` renders the marketing pages, `admin` the back office. Both share
//! the document shell and notice banner defined here.

pub mod admin;
pub mod public;
pub mod seo;

use axum::response::Html;
use maud::{html, Markup, DOCTYPE};
use serde::Deserialize;

use crate::db::models::ContactSettings;
use crate::i18n::{Dictionary, Locale};
use seo::PageMeta;

const SITE_CSS: &str = r#"
:root { --brand: #059669; --brand-dark: #047857; --muted: #6b7280; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, "Noto Sans Thai", sans-serif; color: #111827; }
a { color: var(--brand); }
.container { max-width: 72rem; margin: 0 auto; padding: 0 1rem; }
.site-header { position: sticky; top: 0; background: #fff; border-bottom: 1px solid #e5e7eb; z-index: 10; }
.site-header .container { display: flex; align-items: center; justify-content: space-between; height: 4rem; }
.site-nav a { margin-left: 1rem; text-decoration: none; }
.brand { font-weight: 700; font-size: 1.25rem; text-decoration: none; }
.button { display: inline-block; background: var(--brand); color: #fff; padding: .6rem 1.2rem; border-radius: .4rem; text-decoration: none; border: 0; cursor: pointer; }
.button.secondary { background: #fff; color: var(--brand); border: 1px solid var(--brand); }
.button.danger { background: #dc2626; }
.notice { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.notice.success { background: #ecfdf5; color: #065f46; }
.notice.error { background: #fef2f2; color: #991b1b; }
.hero { min-height: 60vh; background-size: cover; background-position: center; display: flex; align-items: center; color: #fff; }
.hero h1 { font-size: 2.5rem; text-shadow: 0 2px 6px rgba(0,0,0,.5); }
.grid { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fit, minmax(16rem, 1fr)); }
.card { border: 1px solid #e5e7eb; border-radius: .5rem; overflow: hidden; background: #fff; }
.card img { width: 100%; height: 12rem; object-fit: cover; }
.card .body { padding: 1rem; }
.muted { color: var(--muted); }
section { padding: 3rem 0; }
form label { display: block; margin: .75rem 0 .25rem; font-weight: 600; }
form input, form textarea, form select { width: 100%; padding: .5rem; border: 1px solid #d1d5db; border-radius: .4rem; font: inherit; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .5rem; border-bottom: 1px solid #e5e7eb; vertical-align: top; }
.inline { display: inline; }
.floating-contact { position: fixed; right: 1.5rem; bottom: 1.5rem; z-index: 20; }
.floating-contact ul { list-style: none; margin: 0 0 .5rem; padding: 0; display: none; }
.floating-contact[open] ul { display: block; }
.floating-contact li a { display: block; background: #fff; padding: .5rem 1rem; margin-top: .5rem; border-radius: 2rem; box-shadow: 0 2px 8px rgba(0,0,0,.15); }
.floating-contact summary { list-style: none; background: var(--brand); color: #fff; width: 4rem; height: 4rem; border-radius: 50%; display: flex; align-items: center; justify-content: center; cursor: pointer; }
.chart { display: flex; align-items: flex-end; gap: 2px; height: 12rem; border-bottom: 1px solid #d1d5db; }
.chart .bar { flex: 1; background: var(--brand); min-height: 1px; }
.chart-labels { display: flex; gap: 2px; font-size: .7rem; color: var(--muted); }
.chart-labels span { flex: 1; text-align: center; overflow: hidden; }
.prose img { max-width: 100%; }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    fn class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
        }
    }
}

/// A one-shot message shown at the top of a page after a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// `?notice=` / `?error=` parameters carried by post-redirect-get.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl NoticeParams {
    pub fn into_notice(self) -> Option<Notice> {
        match (self.error, self.notice) {
            (Some(error), _) if !error.is_empty() => Some(Notice::error(error)),
            (_, Some(notice)) if !notice.is_empty() => Some(Notice::success(notice)),
            _ => None,
        }
    }
}

/// `path` with a notice query parameter appended.
pub fn with_notice(path: &str, notice: &Notice) -> String {
    let key = match notice.kind {
        NoticeKind::Success => "notice",
        NoticeKind::Error => "error",
    };
    let separator = if path.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        path,
        separator,
        key,
        urlencoding::encode(&notice.message)
    )
}

pub fn render(markup: Markup) -> Html<String> {
    Html(markup.into_string())
}

/// The current path with its locale segment swapped for `target`.
pub fn language_switch_path(current: &str, target: Locale) -> String {
    let rest = Locale::ALL
        .iter()
        .find_map(|l| {
            let prefix = format!("/{}", l);
            current
                .strip_prefix(&prefix)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .unwrap_or(current);
    format!("/{}{}", target, rest)
}

fn notice_banner(notice: Option<&Notice>) -> Markup {
    html! {
        @if let Some(notice) = notice {
            div class=(notice.kind.class()) role="status" { (notice.message) }
        }
    }
}

fn site_header(locale: Locale, dict: &Dictionary, current_path: &str) -> Markup {
    let other = match locale {
        Locale::Th => Locale::En,
        Locale::En => Locale::Th,
    };
    html! {
        header.site-header {
            div.container {
                a.brand href={ "/" (locale) } { (seo::SITE_NAME) }
                nav.site-nav {
                    a href={ "/" (locale) } { (dict.nav.home) }
                    a href={ "/" (locale) "#services" } { (dict.nav.services) }
                    a href={ "/" (locale) "/blog" } { (dict.nav.blog) }
                    a href={ "/" (locale) "/quote" } { (dict.nav.quote) }
                    a href=(language_switch_path(current_path, other)) hreflang=(other.hreflang()) {
                        (dict.nav.language)
                    }
                }
            }
        }
    }
}

fn floating_contact(dict: &Dictionary, contact: &ContactSettings) -> Markup {
    html! {
        details.floating-contact {
            summary aria-label=(dict.contact.title) { "☎" }
            ul {
                li { a href=(contact.facebook_url) target="_blank" rel="noopener" { (dict.contact.facebook) } }
                li { a href=(contact.line_url) target="_blank" rel="noopener" { (dict.contact.line) } }
                li { a href={ "tel:" (contact.phone) } { (dict.contact.phone) " " (contact.phone) } }
            }
        }
    }
}

pub struct PublicPage<'a> {
    pub locale: Locale,
    pub dict: &'a Dictionary,
    pub meta: &'a PageMeta,
    pub current_path: &'a str,
    pub contact: &'a ContactSettings,
    pub notice: Option<&'a Notice>,
}

pub fn public_layout(page: &PublicPage<'_>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(page.locale.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (seo::head_tags(page.meta))
                style { (maud::PreEscaped(SITE_CSS)) }
            }
            body {
                (site_header(page.locale, page.dict, page.current_path))
                @if page.notice.is_some() {
                    div.container { (notice_banner(page.notice)) }
                }
                main { (content) }
                (floating_contact(page.dict, page.contact))
            }
        }
    }
}

pub fn admin_layout(title: &str, notice: Option<&Notice>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="th" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="robots" content="noindex";
                title { (title) " | Admin" }
                style { (maud::PreEscaped(SITE_CSS)) }
            }
            body {
                main.container {
                    (notice_banner(notice))
                    (content)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_switch_path() {
        assert_eq!(language_switch_path("/th/blog/x", Locale::En), "/en/blog/x");
        assert_eq!(language_switch_path("/en", Locale::Th), "/th");
        assert_eq!(language_switch_path("/thai", Locale::En), "/en/thai");
    }

    #[test]
    fn test_with_notice_encodes_message() {
        assert_eq!(
            with_notice("/admin/blog", &Notice::success("บันทึกแล้ว ok")),
            "/admin/blog?notice=%E0%B8%9A%E0%B8%B1%E0%B8%99%E0%B8%97%E0%B8%B6%E0%B8%81%E0%B9%81%E0%B8%A5%E0%B9%89%E0%B8%A7%20ok"
        );
        assert_eq!(
            with_notice("/admin/quotes?status=new", &Notice::error("x")),
            "/admin/quotes?status=new&error=x"
        );
    }

    #[test]
    fn test_notice_params_prefer_error() {
        let params = NoticeParams {
            notice: Some("saved".to_string()),
            error: Some("failed".to_string()),
        };
        assert_eq!(params.into_notice(), Some(Notice::error("failed")));
        assert_eq!(NoticeParams::default().into_notice(), None);
    }

    #[test]
    fn test_admin_layout_escapes_notice() {
        let page = admin_layout("t", Some(&Notice::error("<script>")), html! {}).into_string();
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }
}
