/**
 * Admin Quote Routes
 * Filtered list, status changes and deletion of customer quote requests
 */
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{load_failed, page, redirect_with, write_failed};
use crate::analytics::{list_quotes, DaysFilter, StatusFilter};
use crate::db::models::{QuoteStatus, QUOTES};
use crate::views::{admin as screens, Notice, NoticeParams};
use crate::AppState;

const LIST_PATH: &str = "/admin/quotes";

#[derive(Debug, Default, Deserialize)]
pub struct QuoteListQuery {
    pub status: Option<String>,
    pub days: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// GET /admin/quotes?status=&days=
pub async fn list(State(state): State<AppState>, Query(query): Query<QuoteListQuery>) -> Response {
    let status = StatusFilter::parse(query.status.as_deref());
    let days = DaysFilter::parse(query.days.as_deref());

    match list_quotes(state.store.as_ref(), status, days, Utc::now()).await {
        Ok(quotes) => page(
            "รายการใบเสนอราคา",
            NoticeParams {
                notice: query.notice,
                error: query.error,
            }
            .into_notice()
            .as_ref(),
            screens::quotes_list(&quotes, status, days),
        )
        .into_response(),
        Err(e) => load_failed("รายการใบเสนอราคา", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /admin/quotes/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Some(status) = QuoteStatus::parse(&form.status) else {
        return redirect_with(LIST_PATH, Notice::error("สถานะไม่ถูกต้อง"));
    };

    let mut fields = Map::new();
    fields.insert("status".to_string(), Value::from(status.as_str()));
    match state.store.update(QUOTES, &id, fields).await {
        Ok(()) => {
            tracing::info!(quote_id = %id, status = status.as_str(), "quote status changed");
            redirect_with(
                LIST_PATH,
                Notice::success(format!("เปลี่ยนสถานะเป็น \"{}\" แล้ว", status.label())),
            )
        }
        Err(e) => write_failed(LIST_PATH, "set_quote_status", e),
    }
}

/// POST /admin/quotes/{id}/delete
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(QUOTES, &id).await {
        Ok(()) => {
            tracing::info!(quote_id = %id, "quote deleted");
            redirect_with(LIST_PATH, Notice::success("ลบใบเสนอราคาเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(LIST_PATH, "delete_quote", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Quote;
    use crate::db::DocumentStore;
    use crate::routes::admin::tests::{admin_get, admin_post, test_app};
    use axum::http::StatusCode;
    use chrono::Duration;

    async fn seed_quote(store: &dyn DocumentStore, name: &str, age: Duration, status: QuoteStatus) -> String {
        let quote = Quote {
            name: name.to_string(),
            phone: "0812345678".to_string(),
            description: "sofa".to_string(),
            created_at: Some(Utc::now() - age),
            status,
            ..Default::default()
        };
        store
            .add(QUOTES, serde_json::to_value(&quote).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_days() {
        let (app, store, token) = test_app();
        seed_quote(store.as_ref(), "Fresh", Duration::hours(1), QuoteStatus::New).await;
        seed_quote(store.as_ref(), "Called", Duration::hours(2), QuoteStatus::Contacted).await;
        seed_quote(store.as_ref(), "Ancient", Duration::days(60), QuoteStatus::New).await;

        let (status, body) = admin_get(app.clone(), &token, "/admin/quotes?status=new&days=30").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Fresh"));
        assert!(!body.contains("Called"));
        assert!(!body.contains("Ancient"));

        let (_, body) = admin_get(app, &token, "/admin/quotes?status=all&days=all").await;
        assert!(body.contains("Fresh") && body.contains("Called") && body.contains("Ancient"));
    }

    #[tokio::test]
    async fn test_oversized_days_lists_everything() {
        let (app, store, token) = test_app();
        seed_quote(store.as_ref(), "Fresh", Duration::hours(1), QuoteStatus::New).await;
        seed_quote(store.as_ref(), "Ancient", Duration::days(600), QuoteStatus::New).await;

        let (status, body) = admin_get(app, &token, "/admin/quotes?days=100000000").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Fresh") && body.contains("Ancient"));
    }

    #[tokio::test]
    async fn test_status_change_and_delete() {
        let (app, store, token) = test_app();
        let id = seed_quote(store.as_ref(), "A", Duration::hours(1), QuoteStatus::New).await;

        let (status, _) = admin_post(
            app.clone(),
            &token,
            &format!("/admin/quotes/{}/status", id),
            "status=completed",
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let quote: Quote = store.get(QUOTES, &id).await.unwrap().unwrap().decode().unwrap();
        assert_eq!(quote.status, QuoteStatus::Completed);
        assert_eq!(quote.name, "A");

        let (_, location) = admin_post(
            app.clone(),
            &token,
            &format!("/admin/quotes/{}/status", id),
            "status=bogus",
        )
        .await;
        assert!(location.unwrap().contains("error="));

        admin_post(app, &token, &format!("/admin/quotes/{}/delete", id), "").await;
        assert_eq!(store.count(QUOTES).await.unwrap(), 0);
    }
}
