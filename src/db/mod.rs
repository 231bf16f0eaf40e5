//! Document store - collections of JSON documents addressed by id.
//!
//! Public pages and admin screens talk to the store only through the
//! [`DocumentStore`] trait. Two backends exist: [`postgres::PgStore`] keeps
//! every document in a single JSONB table, [`memory::MemoryStore`] keeps them
//! in process for development and tests.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("invalid document data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored document: its id plus the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode into a typed model. The document id is injected as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id));
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Merge,
}

/// Selection criteria pushed down to the store.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    pub fn where_gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when `data` satisfies every filter.
    pub fn matches(&self, data: &Value) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(field, expected) => data.get(field) == Some(expected),
            Filter::Gte(field, bound) => data
                .get(field)
                .and_then(|v| compare_values(v, bound))
                .is_some_and(|ord| ord != Ordering::Less),
        })
    }
}

/// Ordering between two JSON scalars of the same kind.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Sort key ordering: missing or null fields sort before everything else.
pub(crate) fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

/// Removes the `id` key models carry, so it is never stored in the body.
pub(crate) fn strip_id(mut data: Value) -> Value {
    if let Value::Object(map) = &mut data {
        map.remove("id");
    }
    data
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Creates a document with a generated id and returns that id.
    async fn add(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Overwrites the given fields of an existing document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn count(&self, collection: &str) -> Result<usize, StoreError>;

    /// Round-trip latency check used by the health endpoints.
    async fn ping(&self) -> Result<Duration, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_matches_eq_and_gte() {
        let query = Query::new()
            .where_eq("status", "published")
            .where_gte("date", "2024-07-01");
        assert!(query.matches(&json!({"status": "published", "date": "2024-07-21"})));
        assert!(!query.matches(&json!({"status": "draft", "date": "2024-07-21"})));
        assert!(!query.matches(&json!({"status": "published", "date": "2024-06-30"})));
        assert!(!query.matches(&json!({"status": "published"})));
    }

    #[test]
    fn test_gte_never_matches_across_types() {
        let query = Query::new().where_gte("n", 3);
        assert!(query.matches(&json!({"n": 3})));
        assert!(!query.matches(&json!({"n": "3"})));
    }

    #[test]
    fn test_sort_order_puts_missing_first() {
        assert_eq!(sort_order(None, Some(&json!("a"))), Ordering::Less);
        assert_eq!(sort_order(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
    }

    #[test]
    fn test_decode_injects_id() {
        #[derive(serde::Deserialize)]
        struct Named {
            id: String,
            name: String,
        }
        let doc = Document {
            id: "abc".to_string(),
            data: json!({"name": "x"}),
        };
        let named: Named = doc.decode().unwrap();
        assert_eq!(named.id, "abc");
        assert_eq!(named.name, "x");
    }
}
