/**
 * Routes Module
 * Page, admin and API route handlers
 */
use serde::{Deserialize, Serialize};

pub mod admin;
pub mod auth;
pub mod health;
pub mod locale;
pub mod logs;
pub mod pages;
pub mod quote;
pub mod sitemap;

/// JSON error body shared by the API endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
