use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped};

use super::seo::post_path;
use crate::db::models::{HomePageData, Post};
use crate::i18n::{Dictionary, Locale, PricePlan};
use crate::intake::QuoteDraft;

/// Display form of a stored `YYYY-MM-DD` date.
pub fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn post_card(locale: Locale, dict: &Dictionary, post: &Post) -> Markup {
    let href = format!("/{}{}", locale, post_path(&post.slug));
    html! {
        article.card {
            a href=(href) {
                img src=(post.image) alt=(post.title) loading="lazy" data-ai-hint=[(!post.image_hint.is_empty()).then_some(&post.image_hint)];
            }
            div.body {
                p.muted { (post.category) " · " (display_date(&post.date)) }
                h3 { a href=(href) { (post.title) } }
                p { (post.description) }
                a href=(href) { (dict.blog.read_more) " →" }
            }
        }
    }
}

fn price_plan(locale: Locale, plan: &PricePlan) -> Markup {
    html! {
        div.card {
            div.body {
                h3 { (plan.name) }
                p { strong { (plan.price) } }
                ul {
                    @for feature in &plan.features {
                        li { (feature) }
                    }
                }
                a.button href={ "/" (locale) "/quote" } { (plan.cta) }
            }
        }
    }
}

pub fn home(locale: Locale, dict: &Dictionary, home: &HomePageData, posts: &[Post]) -> Markup {
    html! {
        section.hero style={ "background-image: linear-gradient(rgba(0,0,0,.4), rgba(0,0,0,.4)), url('" (home.hero_image_url) "')" } {
            div.container {
                h1 { (dict.hero.title) }
                p { (dict.hero.subtitle) }
                a.button href="#services" { (dict.hero.cta) }
                " "
                a.button.secondary href={ "/" (locale) "/quote" } { (dict.nav.quote) }
            }
        }

        section.container #why-us {
            h2 { (dict.why_us.title) }
            p.muted { (dict.why_us.subtitle) }
            div.grid {
                @for feature in &dict.why_us_data {
                    div.card { div.body {
                        h3 { (feature.title) }
                        p { (feature.description) }
                    } }
                }
            }
        }

        section.container #services {
            h2 { (dict.price_table.title) }
            p.muted { (dict.price_table.subtitle) }
            div.grid {
                (price_plan(locale, &dict.price_table.car))
                (price_plan(locale, &dict.price_table.sofa))
                (price_plan(locale, &dict.price_table.other))
            }
        }

        section.container #before-after {
            h2 { (dict.before_after.title) }
            p.muted { (dict.before_after.subtitle) }
            div.grid {
                figure.card {
                    img src=(home.before_image_url) alt=(dict.before_after.before);
                    figcaption.body { (dict.before_after.before) }
                }
                figure.card {
                    img src=(home.after_image_url) alt=(dict.before_after.after);
                    figcaption.body { (dict.before_after.after) }
                }
            }
        }

        section.container #blog {
            h2 { (dict.blog.title) }
            p.muted { (dict.blog.subtitle) }
            @if posts.is_empty() {
                p { (dict.blog.no_posts) }
            } @else {
                div.grid {
                    @for post in posts {
                        (post_card(locale, dict, post))
                    }
                }
                p { a href={ "/" (locale) "/blog" } { (dict.blog.view_all) } }
            }
        }

        section.container #faq {
            h2 { (dict.faq.title) }
            p.muted { (dict.faq.subtitle) }
            @for faq in &dict.faq_data {
                details {
                    summary { (faq.question) }
                    p { (faq.answer) }
                }
            }
        }
    }
}

pub fn blog_index(locale: Locale, dict: &Dictionary, posts: &[Post]) -> Markup {
    html! {
        section.container {
            h1 { (dict.blog_index.header) }
            p.muted { (dict.blog_index.subheader) }
            @if posts.is_empty() {
                p { (dict.blog_index.no_posts) }
            } @else {
                div.grid {
                    @for post in posts {
                        (post_card(locale, dict, post))
                    }
                }
            }
        }
    }
}

pub fn blog_post(locale: Locale, dict: &Dictionary, post: &Post, related: &[Post]) -> Markup {
    html! {
        article.container {
            p { a href={ "/" (locale) "/blog" } { "← " (dict.blog_post.back) } }
            h1 { (post.title) }
            p.muted {
                (post.category) " · " (dict.blog_post.published_on) " "
                time datetime=(post.date) { (display_date(&post.date)) }
            }
            @if !post.image.is_empty() {
                img src=(post.image) alt=(post.title) style="max-width:100%;border-radius:.5rem";
            }
            div.prose { (PreEscaped(ammonia::clean(&post.content))) }
        }
        @if !related.is_empty() {
            section.container {
                h2 { (dict.blog_post.related) }
                div.grid {
                    @for other in related {
                        (post_card(locale, dict, other))
                    }
                }
            }
        }
    }
}

const LOCATION_SCRIPT: &str = r#"
document.getElementById('use-location')?.addEventListener('click', function () {
  var address = document.getElementById('address');
  if (!navigator.geolocation) { return; }
  navigator.geolocation.getCurrentPosition(function (pos) {
    var lat = pos.coords.latitude, lon = pos.coords.longitude;
    fetch('/api/geocode?lat=' + lat + '&lon=' + lon)
      .then(function (r) { return r.json(); })
      .then(function (data) { address.value = data.address; })
      .catch(function () { address.value = 'Lat: ' + lat + ', Lon: ' + lon; });
  });
});
"#;

pub fn quote_form(locale: Locale, dict: &Dictionary, draft: &QuoteDraft) -> Markup {
    let text = &dict.quote;
    html! {
        section.container {
            h1 { (text.title) }
            p.muted { (text.description) }
            form method="post" action={ "/" (locale) "/quote" } enctype="multipart/form-data" {
                label for="name" { (text.name) " *" }
                input #name type="text" name="name" value=(draft.name) required;

                label for="phone" { (text.phone) " *" }
                input #phone type="tel" name="phone" value=(draft.phone) required;

                label for="address" { (text.address) }
                textarea #address name="address" rows="2" { (draft.address) }
                button.button.secondary #use-location type="button" { (text.use_location) }

                label for="description" { (text.details) " *" }
                textarea #description name="description" rows="4" required { (draft.description) }

                label for="images" { (text.images) }
                input #images type="file" name="images" accept="image/*" multiple;
                p.muted { (text.images_hint) }

                p {
                    button.button type="submit" { (text.submit) }
                    " "
                    a.button.secondary href={ "/" (locale) } { (text.cancel) }
                }
            }
        }
        script { (PreEscaped(LOCATION_SCRIPT)) }
    }
}

pub fn not_found(locale: Locale, dict: &Dictionary) -> Markup {
    html! {
        section.container {
            h1 { (dict.not_found.title) }
            p { (dict.not_found.message) }
            a.button href={ "/" (locale) } { (dict.not_found.back) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::dictionary;

    fn post(slug: &str) -> Post {
        Post {
            title: format!("Title {}", slug),
            slug: slug.to_string(),
            date: "2024-07-21".to_string(),
            content: "<p>Hello</p><script>alert(1)</script>".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-07-21"), "21/07/2024");
        assert_eq!(display_date("soon"), "soon");
    }

    #[test]
    fn test_blog_post_strips_scripts() {
        let html = blog_post(Locale::En, dictionary(Locale::En), &post("a"), &[]).into_string();
        assert!(html.contains("<p>Hello</p>"));
        assert!(!html.contains("alert(1)"));
    }

    #[test]
    fn test_home_lists_posts_with_locale_links() {
        let dict = dictionary(Locale::Th);
        let html = home(Locale::Th, dict, &HomePageData::default(), &[post("x")]).into_string();
        assert!(html.contains("href=\"/th/blog/x\""));
        assert!(html.contains(&dict.hero.title));
    }

    #[test]
    fn test_quote_form_keeps_values() {
        let draft = QuoteDraft {
            name: "Somchai".to_string(),
            description: "two sofas".to_string(),
            ..Default::default()
        };
        let html = quote_form(Locale::En, dictionary(Locale::En), &draft).into_string();
        assert!(html.contains("value=\"Somchai\""));
        assert!(html.contains(">two sofas</textarea>"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }
}
