/**
 * Admin Settings Routes
 * Contact details and homepage imagery singletons
 */
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::{load_failed, page, redirect_with, write_failed};
use crate::content::{get_contact_settings, get_home_page_data};
use crate::db::models::{ContactSettings, HomePageData, CONTACT_KEY, HOME_KEY, PAGES, SETTINGS};
use crate::db::{StoreError, WriteMode};
use crate::views::{admin as screens, Notice, NoticeParams};
use crate::AppState;

const CONTACT_PATH: &str = "/admin/settings/contact";
const HOMEPAGE_PATH: &str = "/admin/homepage";
const CONTACT_TITLE: &str = "ตั้งค่าข้อมูลติดต่อ";
const HOMEPAGE_TITLE: &str = "จัดการหน้าแรก";
const MISSING_FIELDS: &str = "กรุณากรอกข้อมูลให้ครบทุกช่อง";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub phone: String,
    pub facebook_url: String,
    pub line_url: String,
}

impl ContactForm {
    fn into_settings(self) -> ContactSettings {
        ContactSettings {
            phone: self.phone.trim().to_string(),
            facebook_url: self.facebook_url.trim().to_string(),
            line_url: self.line_url.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomepageForm {
    pub hero_image_url: String,
    pub before_image_url: String,
    pub after_image_url: String,
}

impl HomepageForm {
    fn into_data(self) -> HomePageData {
        HomePageData {
            hero_image_url: self.hero_image_url.trim().to_string(),
            before_image_url: self.before_image_url.trim().to_string(),
            after_image_url: self.after_image_url.trim().to_string(),
        }
    }
}

fn any_blank(values: &[&str]) -> bool {
    values.iter().any(|v| v.is_empty())
}

/// Merge-writes a singleton document.
async fn save_singleton<T: serde::Serialize>(
    state: &AppState,
    collection: &str,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let data = serde_json::to_value(value)?;
    state.store.set(collection, key, data, WriteMode::Merge).await
}

/// GET /admin/settings/contact
pub async fn contact_form(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Response {
    match get_contact_settings(state.store.as_ref(), &state.config.defaults).await {
        Ok(contact) => page(
            CONTACT_TITLE,
            params.into_notice().as_ref(),
            screens::contact_settings(&contact),
        )
        .into_response(),
        Err(e) => load_failed(CONTACT_TITLE, e),
    }
}

/// POST /admin/settings/contact
pub async fn save_contact(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let contact = form.into_settings();
    if any_blank(&[
        contact.phone.as_str(),
        contact.facebook_url.as_str(),
        contact.line_url.as_str(),
    ]) {
        return (
            StatusCode::BAD_REQUEST,
            page(
                CONTACT_TITLE,
                Some(&Notice::error(MISSING_FIELDS)),
                screens::contact_settings(&contact),
            ),
        )
            .into_response();
    }

    match save_singleton(&state, SETTINGS, CONTACT_KEY, &contact).await {
        Ok(()) => {
            tracing::info!("contact settings updated");
            redirect_with(CONTACT_PATH, Notice::success("บันทึกข้อมูลติดต่อเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(CONTACT_PATH, "save_contact", e),
    }
}

/// GET /admin/homepage
pub async fn homepage_form(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> Response {
    match get_home_page_data(state.store.as_ref(), &state.config.defaults).await {
        Ok(home) => page(
            HOMEPAGE_TITLE,
            params.into_notice().as_ref(),
            screens::homepage_settings(&home),
        )
        .into_response(),
        Err(e) => load_failed(HOMEPAGE_TITLE, e),
    }
}

/// POST /admin/homepage
pub async fn save_homepage(
    State(state): State<AppState>,
    Form(form): Form<HomepageForm>,
) -> Response {
    let home = form.into_data();
    if any_blank(&[
        home.hero_image_url.as_str(),
        home.before_image_url.as_str(),
        home.after_image_url.as_str(),
    ]) {
        return (
            StatusCode::BAD_REQUEST,
            page(
                HOMEPAGE_TITLE,
                Some(&Notice::error(MISSING_FIELDS)),
                screens::homepage_settings(&home),
            ),
        )
            .into_response();
    }

    match save_singleton(&state, PAGES, HOME_KEY, &home).await {
        Ok(()) => {
            tracing::info!("homepage imagery updated");
            redirect_with(HOMEPAGE_PATH, Notice::success("บันทึกข้อมูลหน้าแรกเรียบร้อยแล้ว"))
        }
        Err(e) => write_failed(HOMEPAGE_PATH, "save_homepage", e),
    }
}
