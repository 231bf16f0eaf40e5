//! Site configuration, built once at startup and shared through `AppState`.
//!
//! Every literal default the site relies on (placeholder imagery, the
//! fallback contact details, the curated sitemap) lives here instead of at
//! the call sites that need it.

use bcrypt::{hash, DEFAULT_COST};
use chrono::NaiveDate;

use crate::db::models::{ContactSettings, HomePageData};

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEV_SITE_URL: &str = "http://localhost:9002";
const PROD_SITE_URL: &str = "https://psychic-glider-453312-k0.firebaseapp.com";
const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_email: String,
    /// bcrypt hash of the admin password.
    pub admin_password_hash: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

/// Values used when a singleton document has never been written.
#[derive(Debug, Clone)]
pub struct ContentDefaults {
    pub home: HomePageData,
    pub contact: ContactSettings,
    /// Image stored on posts created without one.
    pub post_image: String,
}

impl Default for ContentDefaults {
    fn default() -> Self {
        Self {
            home: HomePageData {
                hero_image_url: "https://placehold.co/1920x1080.png".to_string(),
                before_image_url: "https://placehold.co/600x400.png".to_string(),
                after_image_url: "https://placehold.co/600x400.png".to_string(),
            },
            contact: ContactSettings {
                phone: "0812345678".to_string(),
                facebook_url: "https://www.facebook.com/your-page".to_string(),
                line_url: "https://line.me/ti/p/~yourlineid".to_string(),
            },
            post_image: "https://placehold.co/800x400.png".to_string(),
        }
    }
}

/// A hand-maintained sitemap entry for a blog post.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapPost {
    pub lang: &'static str,
    pub slug: String,
    pub last_modified: NaiveDate,
}

fn curated_sitemap_posts() -> Vec<SitemapPost> {
    let entry = |lang, slug: &str, (y, m, d)| SitemapPost {
        lang,
        slug: slug.to_string(),
        last_modified: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
    };
    vec![
        entry("en", "how-to-clean-fabric-sofa", (2024, 7, 21)),
        entry("th", "how-to-clean-fabric-sofa", (2024, 7, 21)),
        entry("en", "when-to-clean-car-seats", (2024, 7, 18)),
        entry("th", "when-to-clean-car-seats", (2024, 7, 18)),
        entry(
            "th",
            "บริการซักเบาะโซฟา-ทำความสะอาดถึงบ้าน-สะอาด-ปลอดภัย-เหมือนใหม่",
            (2025, 8, 13),
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub environment: Environment,
    /// Base URL for canonical links, hreflang alternates and the sitemap.
    pub site_url: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    pub defaults: ContentDefaults,
    pub geocoder_url: String,
    pub sitemap_posts: Vec<SitemapPost>,
}

impl Default for SiteConfig {
    /// Development configuration. Does not read the environment.
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            site_url: DEV_SITE_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 9002,
            database_url: None,
            auth: AuthConfig {
                admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
                // Low cost keeps development logins and tests fast.
                admin_password_hash: hash(DEFAULT_ADMIN_PASSWORD, 4).unwrap_or_default(),
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                session_ttl_hours: 12,
            },
            defaults: ContentDefaults::default(),
            geocoder_url: NOMINATIM_REVERSE_URL.to_string(),
            sitemap_posts: curated_sitemap_posts(),
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let defaults = Self::default();

        let site_url = std::env::var("SITE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| match environment {
                Environment::Development => DEV_SITE_URL.to_string(),
                Environment::Production => PROD_SITE_URL.to_string(),
            })
            .trim_end_matches('/')
            .to_string();

        let admin_password_hash = if let Ok(hashed) = std::env::var("ADMIN_HASH_PASSWORD") {
            hashed
        } else if let Ok(plain) = std::env::var("ADMIN_PASSWORD") {
            hash(&plain, DEFAULT_COST).unwrap_or_default()
        } else {
            defaults.auth.admin_password_hash.clone()
        };

        Self {
            environment,
            site_url,
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").ok(),
            auth: AuthConfig {
                admin_email: std::env::var("ADMIN_EMAIL").unwrap_or(defaults.auth.admin_email),
                admin_password_hash,
                jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.auth.jwt_secret),
                session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|h: &i64| *h > 0)
                    .unwrap_or(defaults.auth.session_ttl_hours),
            },
            defaults: defaults.defaults,
            geocoder_url: std::env::var("GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            sitemap_posts: defaults.sitemap_posts,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Problems that must stop a production start.
    pub fn production_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.is_production() {
            return errors;
        }
        if self.auth.jwt_secret.is_empty() || self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            errors.push(
                "JWT_SECRET must be set to a secure, unique value in production".to_string(),
            );
        }
        if self.auth.admin_password_hash.is_empty() {
            errors.push("ADMIN_HASH_PASSWORD or ADMIN_PASSWORD could not be used".to_string());
        }
        errors
    }

    /// Absolute URL for a site path.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_development_with_local_url() {
        let config = SiteConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.site_url, "http://localhost:9002");
        assert!(config.production_errors().is_empty());
        assert!(bcrypt::verify("admin123", &config.auth.admin_password_hash).unwrap());
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = SiteConfig {
            environment: Environment::Production,
            ..SiteConfig::default()
        };
        let errors = config.production_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("JWT_SECRET"));
    }

    #[test]
    fn test_absolute_url() {
        let config = SiteConfig::default();
        assert_eq!(config.absolute_url("/th/blog"), "http://localhost:9002/th/blog");
    }

    #[test]
    fn test_curated_sitemap_has_both_languages() {
        let posts = curated_sitemap_posts();
        assert!(posts.iter().any(|p| p.lang == "en"));
        assert!(posts.iter().any(|p| p.lang == "th"));
    }
}
