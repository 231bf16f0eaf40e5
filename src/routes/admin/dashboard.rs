/**
 * Admin Dashboard Routes
 */
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;

use super::{load_failed, page};
use crate::analytics::{self, DEFAULT_RANGE};
use crate::routes::auth::CurrentAdmin;
use crate::views::{admin as screens, NoticeParams};
use crate::AppState;

/// GET /admin/dashboard
pub async fn dashboard(
    Extension(admin): Extension<CurrentAdmin>,
    Query(params): Query<NoticeParams>,
) -> Response {
    page(
        "Dashboard",
        params.into_notice().as_ref(),
        screens::dashboard(&admin.email),
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub range: Option<String>,
}

/// GET /admin/analytics?range=7|30|90
pub async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    let range = query
        .range
        .and_then(|r| r.parse::<i64>().ok())
        .unwrap_or(DEFAULT_RANGE);

    match analytics::overview(state.store.as_ref(), range, Utc::now()).await {
        Ok(overview) => page("Analytics", None, screens::analytics(&overview)).into_response(),
        Err(e) => load_failed("Analytics", e),
    }
}
