//! UI dictionaries for the two site languages.
//!
//! The JSON files are embedded at compile time and parsed once on first use.

use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Th,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Th, Locale::En];
    pub const DEFAULT: Locale = Locale::Th;

    /// Exact match on the lowercase language tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "th" => Some(Locale::Th),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Th => "th",
            Locale::En => "en",
        }
    }

    /// Region-qualified tag used for hreflang alternates.
    pub fn hreflang(&self) -> &'static str {
        match self {
            Locale::Th => "th-TH",
            Locale::En => "en-US",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct MetaText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct NavText {
    pub home: String,
    pub services: String,
    pub blog: String,
    pub contact: String,
    pub quote: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct HeroText {
    pub title: String,
    pub subtitle: String,
    pub cta: String,
}

#[derive(Debug, Deserialize)]
pub struct SectionText {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct BeforeAfterText {
    pub title: String,
    pub subtitle: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogText {
    pub title: String,
    pub subtitle: String,
    pub read_more: String,
    pub view_all: String,
    pub no_posts: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogIndexText {
    pub title: String,
    pub description: String,
    pub header: String,
    pub subheader: String,
    pub no_posts: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostText {
    pub back: String,
    pub related: String,
    pub published_on: String,
}

#[derive(Debug, Deserialize)]
pub struct PricePlan {
    pub name: String,
    pub price: String,
    pub features: Vec<String>,
    pub cta: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceTable {
    pub title: String,
    pub subtitle: String,
    pub car: PricePlan,
    pub sofa: PricePlan,
    pub other: PricePlan,
}

#[derive(Debug, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteText {
    pub title: String,
    pub description: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub use_location: String,
    pub details: String,
    pub images: String,
    pub images_hint: String,
    pub submit: String,
    pub cancel: String,
    pub success: String,
    pub missing_fields: String,
    pub too_many_images: String,
    pub unsupported_image: String,
    pub failed: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactText {
    pub title: String,
    pub phone: String,
    pub facebook: String,
    pub line: String,
}

#[derive(Debug, Deserialize)]
pub struct NotFoundText {
    pub title: String,
    pub message: String,
    pub back: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerErrorText {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub meta: MetaText,
    pub nav: NavText,
    pub hero: HeroText,
    pub why_us: SectionText,
    pub why_us_data: Vec<Feature>,
    pub before_after: BeforeAfterText,
    pub blog: BlogText,
    pub blog_index: BlogIndexText,
    pub blog_post: BlogPostText,
    pub price_table: PriceTable,
    pub faq: SectionText,
    pub faq_data: Vec<Faq>,
    pub quote: QuoteText,
    pub contact: ContactText,
    pub not_found: NotFoundText,
    pub server_error: ServerErrorText,
}

static TH: Lazy<Dictionary> = Lazy::new(|| {
    serde_json::from_str(include_str!("th.json")).expect("embedded th.json must parse")
});

static EN: Lazy<Dictionary> = Lazy::new(|| {
    serde_json::from_str(include_str!("en.json")).expect("embedded en.json must parse")
});

/// UI strings for `locale`.
pub fn dictionary(locale: Locale) -> &'static Dictionary {
    match locale {
        Locale::Th => &TH,
        Locale::En => &EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_dictionaries_parse() {
        for locale in Locale::ALL {
            let dict = dictionary(locale);
            assert!(!dict.meta.title.is_empty());
            assert!(!dict.faq_data.is_empty());
            assert_eq!(dict.why_us_data.len(), 3);
        }
    }

    #[test]
    fn test_dictionaries_differ_by_language() {
        assert_ne!(dictionary(Locale::Th).hero.cta, dictionary(Locale::En).hero.cta);
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("th"), Some(Locale::Th));
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse("EN"), None);
    }
}
