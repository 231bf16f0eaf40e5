/**
 * Admin Blog Routes
 * Create, edit, publish and delete posts
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{load_failed, page, redirect_with, write_failed};
use crate::analytics::site_offset;
use crate::db::models::{Post, PostStatus, POSTS};
use crate::db::{Direction, DocumentStore, Query as StoreQuery, StoreError, WriteMode};
use crate::views::{admin as screens, Notice, NoticeParams};
use crate::AppState;

const LIST_PATH: &str = "/admin/blog";

// ============================================================================
// Form
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostForm {
    pub title: String,
    pub slug: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub image_hint: String,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub status: Option<String>,
}

impl PostForm {
    /// The post as typed, for re-rendering after a rejected save.
    fn as_post(&self, id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            image: self.image.clone(),
            image_hint: self.image_hint.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            status: self.status(),
            meta_title: Some(self.meta_title.clone()),
            meta_description: Some(self.meta_description.clone()),
            ..Default::default()
        }
    }

    fn status(&self) -> PostStatus {
        self.status
            .as_deref()
            .and_then(PostStatus::parse)
            .unwrap_or_default()
    }

    /// Slug as entered, or derived from the title when left blank.
    fn resolved_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            slugify(&self.slug)
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    /// Anything other than Thai script, lowercase ASCII letters, digits and hyphens
    static ref DISALLOWED: Regex = Regex::new(r"[^\x{0E00}-\x{0E7F}a-z0-9-]").unwrap();
    static ref REPEATED_HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// URL slug for a title. Thai characters are kept as-is.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let cleaned = DISALLOWED.replace_all(&hyphenated, "");
    REPEATED_HYPHENS.replace_all(&cleaned, "-").into_owned()
}

fn require(fields: &[(&str, &str)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("กรุณากรอกข้อมูลให้ครบ: {}", missing.join(", ")))
    }
}

/// Fails when another post already uses `slug`.
async fn ensure_unique_slug(
    store: &dyn DocumentStore,
    slug: &str,
    own_id: Option<&str>,
) -> Result<Result<(), String>, StoreError> {
    let query = StoreQuery::new().where_eq("slug", slug);
    let taken = store
        .find(POSTS, &query)
        .await?
        .iter()
        .any(|doc| Some(doc.id.as_str()) != own_id);
    Ok(if taken {
        Err(format!("Slug \"{}\" ถูกใช้แล้ว", slug))
    } else {
        Ok(())
    })
}

fn rejected(heading: &str, action: &str, post: &Post, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        page(
            heading,
            Some(&Notice::error(message)),
            screens::post_form(heading, action, post, true),
        ),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/blog
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Response {
    let query = StoreQuery::new().order_by("date", Direction::Desc);
    let posts: Result<Vec<Post>, StoreError> = match state.store.find(POSTS, &query).await {
        Ok(docs) => docs.into_iter().map(|doc| doc.decode()).collect(),
        Err(e) => Err(e),
    };

    match posts {
        Ok(posts) => page(
            "จัดการบทความ",
            params.into_notice().as_ref(),
            screens::blog_list(&posts),
        )
        .into_response(),
        Err(e) => load_failed("จัดการบทความ", e),
    }
}

/// GET /admin/blog/new
pub async fn new_form() -> Response {
    let heading = "สร้างบทความใหม่";
    page(
        heading,
        None,
        screens::post_form(heading, "/admin/blog/new", &Post::default(), true),
    )
    .into_response()
}

/// POST /admin/blog/new
pub async fn create(State(state): State<AppState>, Form(form): Form<PostForm>) -> Response {
    let heading = "สร้างบทความใหม่";
    let action = "/admin/blog/new";
    let slug = form.resolved_slug();

    if let Err(message) = require(&[
        ("ชื่อบทความ", form.title.as_str()),
        ("Slug", slug.as_str()),
        ("เนื้อหา", form.content.as_str()),
        ("คำอธิบายสั้น", form.description.as_str()),
        ("หมวดหมู่", form.category.as_str()),
    ]) {
        return rejected(heading, action, &form.as_post(""), message);
    }

    match ensure_unique_slug(state.store.as_ref(), &slug, None).await {
        Ok(Ok(())) => {}
        Ok(Err(message)) => return rejected(heading, action, &form.as_post(""), message),
        Err(e) => return write_failed(LIST_PATH, "create_post", e),
    }

    let post = Post {
        slug,
        image: if form.image.trim().is_empty() {
            state.config.defaults.post_image.clone()
        } else {
            form.image.trim().to_string()
        },
        date: Utc::now()
            .with_timezone(&site_offset())
            .format("%Y-%m-%d")
            .to_string(),
        content: ammonia::clean(&form.content),
        ..form.as_post("")
    };

    let data = match serde_json::to_value(&post) {
        Ok(data) => data,
        Err(e) => return write_failed(LIST_PATH, "create_post", e.into()),
    };
    match state.store.add(POSTS, data).await {
        Ok(id) => {
            tracing::info!(post_id = %id, slug = %post.slug, "post created");
            redirect_with(LIST_PATH, Notice::success("สร้างบทความเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(LIST_PATH, "create_post", e),
    }
}

/// GET /admin/blog/edit/{id}
pub async fn edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let post = match state.store.get(POSTS, &id).await {
        Ok(Some(doc)) => doc.decode::<Post>(),
        Ok(None) => return redirect_with(LIST_PATH, Notice::error("ไม่พบบทความที่ต้องการแก้ไข")),
        Err(e) => Err(e),
    };

    match post {
        Ok(post) => {
            let heading = "แก้ไขบทความ";
            let action = format!("/admin/blog/edit/{}", id);
            page(heading, None, screens::post_form(heading, &action, &post, true)).into_response()
        }
        Err(e) => load_failed("แก้ไขบทความ", e),
    }
}

/// Fields an edit overwrites. Date and id stay as stored.
fn edited_fields(form: &PostForm, slug: String) -> Value {
    json!({
        "title": form.title.trim(),
        "slug": slug,
        "category": form.category.trim(),
        "description": form.description.trim(),
        "image": form.image.trim(),
        "imageHint": form.image_hint.trim(),
        "content": ammonia::clean(&form.content),
        "metaTitle": form.meta_title.trim(),
        "metaDescription": form.meta_description.trim(),
        "status": form.status().as_str(),
    })
}

/// POST /admin/blog/edit/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> Response {
    let heading = "แก้ไขบทความ";
    let action = format!("/admin/blog/edit/{}", id);
    let slug = slugify(&form.slug);

    if let Err(message) = require(&[
        ("ชื่อบทความ", form.title.as_str()),
        ("Slug", slug.as_str()),
        ("เนื้อหา", form.content.as_str()),
    ]) {
        return rejected(heading, &action, &form.as_post(&id), message);
    }

    match state.store.get(POSTS, &id).await {
        Ok(Some(_)) => {}
        Ok(None) => return redirect_with(LIST_PATH, Notice::error("ไม่พบบทความที่ต้องการแก้ไข")),
        Err(e) => return write_failed(LIST_PATH, "update_post", e),
    }

    match ensure_unique_slug(state.store.as_ref(), &slug, Some(&id)).await {
        Ok(Ok(())) => {}
        Ok(Err(message)) => return rejected(heading, &action, &form.as_post(&id), message),
        Err(e) => return write_failed(LIST_PATH, "update_post", e),
    }

    let data = edited_fields(&form, slug);
    match state.store.set(POSTS, &id, data, WriteMode::Merge).await {
        Ok(()) => {
            tracing::info!(post_id = %id, "post updated");
            redirect_with(LIST_PATH, Notice::success("บันทึกการแก้ไขเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(LIST_PATH, "update_post", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /admin/blog/{id}/status
///
/// Writes the `status` field and nothing else.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Some(status) = PostStatus::parse(&form.status) else {
        return redirect_with(LIST_PATH, Notice::error("สถานะไม่ถูกต้อง"));
    };

    let mut fields = Map::new();
    fields.insert("status".to_string(), Value::from(status.as_str()));
    match state.store.update(POSTS, &id, fields).await {
        Ok(()) => {
            tracing::info!(post_id = %id, status = status.as_str(), "post status changed");
            let message = match status {
                PostStatus::Published => "เผยแพร่บทความแล้ว",
                PostStatus::Draft => "ซ่อนบทความแล้ว",
            };
            redirect_with(LIST_PATH, Notice::success(message))
        }
        Err(e) => write_failed(LIST_PATH, "set_post_status", e),
    }
}

/// POST /admin/blog/{id}/delete
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(POSTS, &id).await {
        Ok(()) => {
            tracing::info!(post_id = %id, "post deleted");
            redirect_with(LIST_PATH, Notice::success("ลบบทความเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(LIST_PATH, "delete_post", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tests::seed_post;
    use crate::routes::admin::tests::{admin_get, admin_post, test_app};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("How To Clean  a Sofa!"), "how-to-clean-a-sofa");
        assert_eq!(slugify("ซักโซฟา ที่บ้าน"), "ซักโซฟา-ที่บ้าน");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("Café 2024"), "caf-2024");
    }

    #[tokio::test]
    async fn test_toggle_changes_only_status() {
        let (app, store, token) = test_app();
        let id = seed_post(store.as_ref(), "sofa", "2024-07-21", PostStatus::Draft).await;
        let before = store.get(POSTS, &id).await.unwrap().unwrap().data;

        let (status, location) = admin_post(
            app,
            &token,
            &format!("/admin/blog/{}/status", id),
            "status=published",
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.unwrap().starts_with("/admin/blog?notice="));

        let mut after = store.get(POSTS, &id).await.unwrap().unwrap().data;
        assert_eq!(after["status"], "published");
        after["status"] = before["status"].clone();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let (app, store, token) = test_app();
        let form = "title=Deep+Clean&slug=&category=tips&description=d&content=%3Cp%3Ehi%3C%2Fp%3E%3Cscript%3Ex%3C%2Fscript%3E&status=draft";
        let (status, _) = admin_post(app, &token, "/admin/blog/new", form).await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let docs = store.find(POSTS, &StoreQuery::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
        let post: Post = docs[0].clone().decode().unwrap();
        assert_eq!(post.slug, "deep-clean");
        assert_eq!(post.image, "https://placehold.co/800x400.png");
        assert_eq!(post.content, "<p>hi</p>");
        assert_eq!(post.date.len(), 10);
        assert_eq!(post.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_missing_fields_writes_nothing() {
        let (app, store, token) = test_app();
        let (status, _) =
            admin_post(app, &token, "/admin/blog/new", "title=Only+title&content=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.count(POSTS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_date_and_rejects_taken_slug() {
        let (app, store, token) = test_app();
        let id = seed_post(store.as_ref(), "first", "2024-07-21", PostStatus::Published).await;
        seed_post(store.as_ref(), "second", "2024-07-22", PostStatus::Published).await;

        let uri = format!("/admin/blog/edit/{}", id);
        let (status, _) =
            admin_post(app.clone(), &token, &uri, "title=T&slug=second&content=c").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = admin_post(
            app,
            &token,
            &uri,
            "title=Renamed&slug=first&content=c&status=published",
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let post: Post = store.get(POSTS, &id).await.unwrap().unwrap().decode().unwrap();
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.date, "2024-07-21");
    }

    #[tokio::test]
    async fn test_edit_missing_post_redirects_to_list() {
        let (app, _, token) = test_app();
        let (status, _) = admin_get(app, &token, "/admin/blog/edit/nope").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_delete_removes_post() {
        let (app, store, token) = test_app();
        let id = seed_post(store.as_ref(), "gone", "2024-07-21", PostStatus::Draft).await;
        admin_post(app, &token, &format!("/admin/blog/{}/delete", id), "").await;
        assert!(store.get(POSTS, &id).await.unwrap().is_none());
    }
}
