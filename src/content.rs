//! Content fetchers feeding the public pages.
//!
//! Only published posts ever leave this module; the publication predicate is
//! part of the store query for every list.

use crate::config::ContentDefaults;
use crate::db::models::{
    ContactSettings, HomePageData, Post, PostStatus, CONTACT_KEY, HOME_KEY, PAGES, POSTS,
    SETTINGS,
};
use crate::db::{Direction, DocumentStore, Query, StoreError};

/// Posts shown on the home page.
pub const HOME_RECENT_POSTS: usize = 3;
/// Posts listed under "related" on a post page.
pub const RELATED_POSTS: usize = 2;

fn published_by_date() -> Query {
    Query::new()
        .where_eq("status", PostStatus::Published.as_str())
        .order_by("date", Direction::Desc)
}

/// Published post with this exact slug, or `None`.
pub async fn get_post(store: &dyn DocumentStore, slug: &str) -> Result<Option<Post>, StoreError> {
    let query = Query::new().where_eq("slug", slug).limit(1);
    let Some(doc) = store.find(POSTS, &query).await?.into_iter().next() else {
        return Ok(None);
    };

    let post: Post = doc.decode()?;
    if !post.is_published() {
        tracing::debug!(slug = %slug, "post exists but is not published");
        return Ok(None);
    }
    Ok(Some(post))
}

/// Every published post, newest first.
pub async fn get_posts(store: &dyn DocumentStore) -> Result<Vec<Post>, StoreError> {
    store
        .find(POSTS, &published_by_date())
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

/// The `limit` newest published posts.
pub async fn get_recent_posts(
    store: &dyn DocumentStore,
    limit: usize,
) -> Result<Vec<Post>, StoreError> {
    store
        .find(POSTS, &published_by_date().limit(limit))
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

/// Newest published posts other than `current_id`.
pub async fn get_related_posts(
    store: &dyn DocumentStore,
    current_id: &str,
) -> Result<Vec<Post>, StoreError> {
    let candidates = get_recent_posts(store, RELATED_POSTS + 1).await?;
    Ok(candidates
        .into_iter()
        .filter(|p| p.id != current_id)
        .take(RELATED_POSTS)
        .collect())
}

pub async fn get_home_page_data(
    store: &dyn DocumentStore,
    defaults: &ContentDefaults,
) -> Result<HomePageData, StoreError> {
    match store.get(PAGES, HOME_KEY).await? {
        Some(doc) => doc.decode(),
        None => Ok(defaults.home.clone()),
    }
}

pub async fn get_contact_settings(
    store: &dyn DocumentStore,
    defaults: &ContentDefaults,
) -> Result<ContactSettings, StoreError> {
    match store.get(SETTINGS, CONTACT_KEY).await? {
        Some(doc) => doc.decode(),
        None => Ok(defaults.contact.clone()),
    }
}
