//! In-process document store used when no DATABASE_URL is configured, and by tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{sort_order, strip_id, Direction, Document, DocumentStore, Query, StoreError, WriteMode};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_into(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Document> = docs
            .iter()
            .filter(|(_, data)| query.matches(data))
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        if let Some((field, direction)) = &query.order_by {
            found.sort_by(|a, b| {
                let ord = sort_order(a.data.get(field), b.data.get(field));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            found.truncate(limit);
        }

        Ok(found)
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), strip_id(data));
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let data = strip_id(data);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if mode == WriteMode::Merge {
            if let Some(existing) = docs.get_mut(id) {
                merge_into(existing, data);
                return Ok(());
            }
        }
        docs.insert(id.to_string(), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_into(existing, Value::Object(fields));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        let _ = self.collections.read().await;
        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_then_get_strips_id() {
        let store = MemoryStore::new();
        let id = store
            .add("posts", json!({"id": "ignored", "title": "Hello"}))
            .await
            .unwrap();
        let doc = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.data, json!({"title": "Hello"}));
    }

    #[tokio::test]
    async fn test_find_orders_filters_and_limits() {
        let store = MemoryStore::new();
        for (date, status) in [
            ("2024-01-01", "published"),
            ("2024-03-01", "draft"),
            ("2024-02-01", "published"),
            ("2024-04-01", "published"),
        ] {
            store
                .add("posts", json!({"date": date, "status": status}))
                .await
                .unwrap();
        }

        let query = Query::new()
            .where_eq("status", "published")
            .order_by("date", Direction::Desc)
            .limit(2);
        let docs = store.find("posts", &query).await.unwrap();
        let dates: Vec<_> = docs.iter().map(|d| d.data["date"].clone()).collect();
        assert_eq!(dates, vec![json!("2024-04-01"), json!("2024-02-01")]);
    }

    #[tokio::test]
    async fn test_set_merge_keeps_unmentioned_fields() {
        let store = MemoryStore::new();
        store
            .set("settings", "contact", json!({"phone": "1", "lineUrl": "l"}), WriteMode::Replace)
            .await
            .unwrap();
        store
            .set("settings", "contact", json!({"phone": "2"}), WriteMode::Merge)
            .await
            .unwrap();
        let doc = store.get("settings", "contact").await.unwrap().unwrap();
        assert_eq!(doc.data, json!({"phone": "2", "lineUrl": "l"}));
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let result = store.update("quotes", "nope", Map::new()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let store = MemoryStore::new();
        let id = store.add("quotes", json!({})).await.unwrap();
        store.add("quotes", json!({})).await.unwrap();
        assert_eq!(store.count("quotes").await.unwrap(), 2);
        store.delete("quotes", &id).await.unwrap();
        assert_eq!(store.count("quotes").await.unwrap(), 1);
        assert_eq!(store.count("posts").await.unwrap(), 0);
    }
}
