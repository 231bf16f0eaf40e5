//! PostgreSQL backend: every collection lives in one JSONB `documents` table.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{strip_id, Direction, Document, DocumentStore, Filter, Query, StoreError, WriteMode};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/sofaclean".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    let config = config.unwrap_or_default();

    tracing::info!("Initializing database connection pool...");
    tracing::debug!(
        "Database URL: {}",
        config.url.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '@' && c != '.',
            "*"
        )
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (collection, id)
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_data ON documents USING GIN(data)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_post_slug
            ON documents ((data ->> 'slug'))
            WHERE collection = 'posts'
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            data: row.data.0,
        }
    }
}

pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Eq(field, value) => {
            builder
                .push(" AND data -> ")
                .push_bind(field.clone())
                .push(" = ")
                .push_bind(Json(value.clone()));
        }
        Filter::Gte(field, Value::String(bound)) => {
            builder
                .push(" AND data ->> ")
                .push_bind(field.clone())
                .push(" >= ")
                .push_bind(bound.clone());
        }
        Filter::Gte(field, Value::Number(bound)) => {
            builder
                .push(" AND (data ->> ")
                .push_bind(field.clone())
                .push(")::double precision >= ")
                .push_bind(bound.as_f64().unwrap_or(f64::MIN));
        }
        Filter::Gte(field, bound) => {
            builder
                .push(" AND data -> ")
                .push_bind(field.clone())
                .push(" >= ")
                .push_bind(Json(bound.clone()));
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(row.map(Document::from))
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());

        for filter in &query.filters {
            push_filter(&mut builder, filter);
        }

        if let Some((field, direction)) = &query.order_by {
            builder.push(" ORDER BY data -> ").push_bind(field.clone());
            builder.push(match direction {
                Direction::Asc => " ASC NULLS FIRST",
                Direction::Desc => " DESC NULLS LAST",
            });
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(strip_id(data)))
            .execute(self.pool.as_ref())
            .await?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let sql = match mode {
            WriteMode::Replace => {
                r#"
                INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
                ON CONFLICT (collection, id) DO UPDATE SET
                    data = EXCLUDED.data,
                    updated_at = now()
                "#
            }
            WriteMode::Merge => {
                r#"
                INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
                ON CONFLICT (collection, id) DO UPDATE SET
                    data = documents.data || EXCLUDED.data,
                    updated_at = now()
                "#
            }
        };
        sqlx::query(sql)
            .bind(collection)
            .bind(id)
            .bind(Json(strip_id(data)))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(total.0.max(0) as usize)
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default_uses_env_or_fallback() {
        let config = DbConfig::default();
        assert!(config.max_connections >= 1);
        assert!(config.connect_timeout_secs >= 1);
        assert!(config.idle_timeout_secs >= 1);
        assert!(!config.url.is_empty());
    }

    #[test]
    fn test_find_sql_binds_every_field() {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind("posts".to_string());
        push_filter(
            &mut builder,
            &Filter::Eq("status".to_string(), Value::String("published".to_string())),
        );
        push_filter(
            &mut builder,
            &Filter::Gte("date".to_string(), Value::String("2024-01-01".to_string())),
        );
        let sql = builder.sql();
        assert!(sql.contains("data -> $2 = $3"));
        assert!(sql.contains("data ->> $4 >= $5"));
        assert!(!sql.contains("status"));
    }

    fn decodes_from_pg_row<T: for<'r> FromRow<'r, sqlx::postgres::PgRow>>() {}

    #[test]
    fn test_document_row_decodes_from_postgres_rows() {
        decodes_from_pg_row::<DocumentRow>();
        let doc = Document::from(DocumentRow {
            id: "abc".to_string(),
            data: Json(serde_json::json!({"slug": "s"})),
        });
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.data["slug"], "s");
    }
}
