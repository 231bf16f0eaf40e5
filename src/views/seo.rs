//! Page metadata and schema.org JSON-LD.

use maud::{html, Markup, PreEscaped};
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::db::models::{ContactSettings, Post};
use crate::i18n::{Dictionary, Locale};

pub const SITE_NAME: &str = "SofaClean Pro";

#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    /// `(hreflang, absolute url)` per language version of the page.
    pub alternates: Vec<(&'static str, String)>,
    pub image: Option<String>,
    pub json_ld: Vec<Value>,
}

impl PageMeta {
    fn for_path(
        config: &SiteConfig,
        locale: Locale,
        path: &str,
        title: String,
        description: String,
    ) -> Self {
        Self {
            title,
            description,
            canonical: config.absolute_url(&format!("/{}{}", locale, path)),
            alternates: Locale::ALL
                .iter()
                .map(|l| (l.hreflang(), config.absolute_url(&format!("/{}{}", l, path))))
                .collect(),
            image: None,
            json_ld: Vec::new(),
        }
    }

    /// Metadata for pages that only need a title, e.g. the 404 page.
    pub fn simple(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            canonical: String::new(),
            alternates: Vec::new(),
            image: None,
            json_ld: Vec::new(),
        }
    }
}

pub fn post_path(slug: &str) -> String {
    format!("/blog/{}", urlencoding::encode(slug))
}

pub fn home_meta(
    config: &SiteConfig,
    locale: Locale,
    dict: &Dictionary,
    contact: &ContactSettings,
) -> PageMeta {
    let mut meta = PageMeta::for_path(
        config,
        locale,
        "",
        dict.meta.title.clone(),
        dict.meta.description.clone(),
    );
    meta.json_ld = vec![
        organization_schema(config, dict, contact),
        faq_schema(dict),
    ];
    meta
}

pub fn blog_index_meta(config: &SiteConfig, locale: Locale, dict: &Dictionary) -> PageMeta {
    PageMeta::for_path(
        config,
        locale,
        "/blog",
        dict.blog_index.title.clone(),
        dict.blog_index.description.clone(),
    )
}

pub fn post_meta(config: &SiteConfig, locale: Locale, post: &Post) -> PageMeta {
    let mut meta = PageMeta::for_path(
        config,
        locale,
        &post_path(&post.slug),
        format!("{} | {}", post.seo_title(), SITE_NAME),
        post.seo_description().to_string(),
    );
    meta.image = Some(post.image.clone()).filter(|i| !i.is_empty());
    meta.json_ld = vec![article_schema(config, locale, post, &meta.canonical)];
    meta
}

pub fn organization_schema(
    config: &SiteConfig,
    dict: &Dictionary,
    contact: &ContactSettings,
) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Organization",
        "name": SITE_NAME,
        "url": config.site_url,
        "logo": config.absolute_url("/logo.png"),
        "contactPoint": {
            "@type": "ContactPoint",
            "telephone": contact.international_phone(),
            "contactType": "Customer Service"
        },
        "address": {
            "@type": "PostalAddress",
            "addressLocality": "Bangkok",
            "addressCountry": "TH"
        },
        "description": dict.meta.description,
        "sameAs": [contact.facebook_url, contact.line_url]
    })
}

pub fn faq_schema(dict: &Dictionary) -> Value {
    let questions: Vec<Value> = dict
        .faq_data
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": { "@type": "Answer", "text": faq.answer }
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": questions
    })
}

pub fn article_schema(config: &SiteConfig, locale: Locale, post: &Post, canonical: &str) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "mainEntityOfPage": { "@type": "WebPage", "@id": canonical },
        "headline": post.title,
        "description": post.description,
        "image": post.image,
        "author": { "@type": "Organization", "name": SITE_NAME },
        "publisher": {
            "@type": "Organization",
            "name": SITE_NAME,
            "logo": { "@type": "ImageObject", "url": config.absolute_url("/logo.png") }
        },
        "datePublished": post.date,
        "inLanguage": locale.as_str()
    })
}

/// `<head>` tags for a page.
pub fn head_tags(meta: &PageMeta) -> Markup {
    html! {
        title { (meta.title) }
        meta name="description" content=(meta.description);
        @if !meta.canonical.is_empty() {
            link rel="canonical" href=(meta.canonical);
            meta property="og:url" content=(meta.canonical);
        }
        @for (hreflang, url) in &meta.alternates {
            link rel="alternate" hreflang=(hreflang) href=(url);
        }
        meta property="og:title" content=(meta.title);
        meta property="og:description" content=(meta.description);
        @if let Some(image) = &meta.image {
            meta property="og:image" content=(image);
        }
        @for schema in &meta.json_ld {
            script type="application/ld+json" { (json_ld_script(schema)) }
        }
    }
}

/// Serialises for a `<script>` body; `</` is escaped so content cannot close
/// the tag.
fn json_ld_script(value: &Value) -> PreEscaped<String> {
    PreEscaped(value.to_string().replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::dictionary;

    #[test]
    fn test_post_meta_prefers_meta_fields_and_encodes_slug() {
        let config = SiteConfig::default();
        let post = Post {
            title: "Title".to_string(),
            slug: "ซักโซฟา".to_string(),
            meta_title: Some("Meta title".to_string()),
            description: "Desc".to_string(),
            date: "2025-08-13".to_string(),
            ..Default::default()
        };
        let meta = post_meta(&config, Locale::Th, &post);
        assert_eq!(meta.title, "Meta title | SofaClean Pro");
        assert_eq!(meta.description, "Desc");
        assert!(meta.canonical.starts_with("http://localhost:9002/th/blog/%E0%B8%8B"));
        assert_eq!(meta.alternates.len(), 2);
        assert!(meta.alternates.iter().any(|(lang, url)| *lang == "en-US" && url.contains("/en/blog/")));
        assert_eq!(meta.json_ld[0]["@type"], "Article");
        assert_eq!(meta.json_ld[0]["inLanguage"], "th");
    }

    #[test]
    fn test_home_meta_has_organization_and_faq() {
        let config = SiteConfig::default();
        let dict = dictionary(Locale::En);
        let meta = home_meta(&config, Locale::En, dict, &config.defaults.contact);
        assert_eq!(meta.canonical, "http://localhost:9002/en");
        assert_eq!(meta.json_ld[0]["contactPoint"]["telephone"], "+66-812345678");
        assert_eq!(
            meta.json_ld[1]["mainEntity"].as_array().unwrap().len(),
            dict.faq_data.len()
        );
    }

    #[test]
    fn test_json_ld_cannot_close_script_tag() {
        let rendered = json_ld_script(&json!({"headline": "</script><b>"})).into_string();
        assert!(!rendered.contains("</script>"));
    }
}
