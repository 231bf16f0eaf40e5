//! Database Models - typed views over the documents in each collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const POSTS: &str = "posts";
pub const QUOTES: &str = "quotes";
pub const PAGES: &str = "pages";
pub const SETTINGS: &str = "settings";

/// Key of the homepage imagery singleton in `pages`.
pub const HOME_KEY: &str = "home";
/// Key of the contact settings singleton in `settings`.
pub const CONTACT_KEY: &str = "contact";

/// Most images a single quote may carry.
pub const MAX_QUOTE_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    #[default]
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            PostStatus::Published => PostStatus::Draft,
            PostStatus::Draft => PostStatus::Published,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "published" => Some(PostStatus::Published),
            "draft" => Some(PostStatus::Draft),
            _ => None,
        }
    }
}

/// Blog post
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub image: String,
    pub image_hint: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category: String,
    pub description: String,
    /// Sanitised HTML body.
    pub content: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// SEO title, falling back to the post title when unset or blank.
    pub fn seo_title(&self) -> &str {
        self.meta_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }

    pub fn seo_description(&self) -> &str {
        self.meta_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    New,
    Contacted,
    Completed,
    Cancelled,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::New,
        QuoteStatus::Contacted,
        QuoteStatus::Completed,
        QuoteStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::New => "new",
            QuoteStatus::Contacted => "contacted",
            QuoteStatus::Completed => "completed",
            QuoteStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Label shown on the admin screens.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::New => "ใหม่",
            QuoteStatus::Contacted => "ติดต่อแล้ว",
            QuoteStatus::Completed => "สำเร็จ",
            QuoteStatus::Cancelled => "ยกเลิก",
        }
    }
}

/// Customer quote request (lead)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    /// `data:` URIs, at most [`MAX_QUOTE_IMAGES`].
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: QuoteStatus,
}

/// Singleton `pages/home`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomePageData {
    pub hero_image_url: String,
    pub before_image_url: String,
    pub after_image_url: String,
}

/// Singleton `settings/contact`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSettings {
    pub phone: String,
    pub facebook_url: String,
    pub line_url: String,
}

impl ContactSettings {
    /// Thai number in international form: `0812345678` becomes `+66-812345678`.
    pub fn international_phone(&self) -> String {
        match self.phone.strip_prefix('0') {
            Some(rest) => format!("+66-{}", rest),
            None => format!("+{}", self.phone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_missing_optional_fields_default() {
        let post: Post = serde_json::from_value(json!({
            "title": "T",
            "slug": "t",
            "status": "published"
        }))
        .unwrap();
        assert!(post.is_published());
        assert_eq!(post.meta_title, None);
        assert_eq!(post.seo_title(), "T");
        assert!(post.image.is_empty());
    }

    #[test]
    fn test_blank_meta_title_falls_back() {
        let post = Post {
            title: "Title".to_string(),
            meta_title: Some("  ".to_string()),
            description: "Desc".to_string(),
            meta_description: Some("Meta".to_string()),
            ..Default::default()
        };
        assert_eq!(post.seo_title(), "Title");
        assert_eq!(post.seo_description(), "Meta");
    }

    #[test]
    fn test_post_serializes_camel_case_without_empty_id() {
        let post = Post {
            image_hint: "sofa".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["imageHint"], "sofa");
        assert_eq!(value["status"], "draft");
        assert!(value.get("id").is_none());
        assert!(value.get("metaTitle").is_none());
    }

    #[test]
    fn test_quote_status_parse_round_trips_names() {
        for status in QuoteStatus::ALL {
            assert_eq!(QuoteStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QuoteStatus::parse("archived"), None);
    }

    #[test]
    fn test_international_phone() {
        let contact = ContactSettings {
            phone: "0812345678".to_string(),
            ..Default::default()
        };
        assert_eq!(contact.international_phone(), "+66-812345678");
    }
}
