/**
 * Quote Request Routes
 * Public quote form, its multipart submit, and the reverse-geocoding helper
 */
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::i18n::Dictionary;
use crate::intake::geocode::ResolvedAddress;
use crate::intake::{submit_quote, DialogState, IntakeError, QuoteDraft};
use crate::routes::pages::PageContext;
use crate::views::seo::PageMeta;
use crate::views::{public, with_notice, Notice};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{lang}/quote", get(form).post(submit))
        .route("/api/geocode", get(geocode))
}

/// Message shown to the visitor for a failed submission.
fn intake_message<'a>(dict: &'a Dictionary, error: &IntakeError) -> &'a str {
    match error {
        IntakeError::MissingFields => &dict.quote.missing_fields,
        IntakeError::TooManyImages => &dict.quote.too_many_images,
        IntakeError::UnsupportedImage(_) => &dict.quote.unsupported_image,
        IntakeError::Image(_) | IntakeError::Store(_) => &dict.quote.failed,
    }
}

fn form_page(
    ctx: &PageContext,
    status: StatusCode,
    draft: &QuoteDraft,
    dialog: &DialogState,
) -> Response {
    let meta = PageMeta::simple(&ctx.dict.quote.title, &ctx.dict.quote.description);
    let path = format!("/{}/quote", ctx.locale);
    let notice = dialog.error().map(Notice::error);
    (
        status,
        ctx.page(
            &meta,
            &path,
            notice.as_ref(),
            public::quote_form(ctx.locale, ctx.dict, draft),
        ),
    )
        .into_response()
}

/// GET /{lang}/quote
pub async fn form(State(state): State<AppState>, Path(lang): Path<String>) -> Response {
    match PageContext::load(&state, &lang).await {
        Ok(ctx) => form_page(
            &ctx,
            StatusCode::OK,
            &QuoteDraft::default(),
            &DialogState::Idle.open(),
        ),
        Err(e) => e.render(&state),
    }
}

/// Reads the form fields. Empty file inputs arrive as zero-length parts and
/// are skipped.
async fn read_draft(
    multipart: &mut Multipart,
) -> Result<QuoteDraft, MultipartError> {
    let mut draft = QuoteDraft::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = field.text().await?,
            "phone" => draft.phone = field.text().await?,
            "address" => draft.address = field.text().await?,
            "description" => draft.description = field.text().await?,
            "images" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    draft.images.push(bytes.to_vec());
                }
            }
            other => tracing::debug!(field = %other, "ignoring unknown quote form field"),
        }
    }
    Ok(draft)
}

/// POST /{lang}/quote
pub async fn submit(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let ctx = match PageContext::load(&state, &lang).await {
        Ok(ctx) => ctx,
        Err(e) => return e.render(&state),
    };
    let dialog = DialogState::Idle.open();

    let draft = match read_draft(&mut multipart).await {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable quote form");
            let dialog = dialog.reject(ctx.dict.quote.failed.as_str());
            return form_page(&ctx, StatusCode::BAD_REQUEST, &QuoteDraft::default(), &dialog);
        }
    };

    // What the form shows again if the request is not accepted.
    let entered = QuoteDraft {
        name: draft.name.clone(),
        phone: draft.phone.clone(),
        address: draft.address.clone(),
        description: draft.description.clone(),
        images: Vec::new(),
    };

    if let Err(e) = draft.validate() {
        tracing::debug!(error = %e, "quote form rejected");
        let dialog = dialog.reject(intake_message(ctx.dict, &e));
        return form_page(&ctx, StatusCode::BAD_REQUEST, &entered, &dialog);
    }

    let dialog = dialog.submit();
    let result = submit_quote(state.store.as_ref(), draft).await;
    let dialog = dialog.finish(&result);

    match result {
        Ok(_) => {
            let home = format!("/{}", ctx.locale);
            Redirect::to(&with_notice(&home, &Notice::success(&ctx.dict.quote.success)))
                .into_response()
        }
        Err(e) => {
            let status = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(error = %e, "quote submission failed");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let dialog = match dialog {
                DialogState::Failed { .. } => DialogState::Failed {
                    error: intake_message(ctx.dict, &e).to_string(),
                },
                other => other,
            };
            form_page(&ctx, status, &entered, &dialog)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/geocode?lat=..&lon=..
///
/// Always answers with something to put in the address box; lookup failures
/// come back as raw coordinates plus a warning.
pub async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<ResolvedAddress>, AppError> {
    let GeocodeQuery { lat, lon } = query;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::Validation(
            "lat must be within ±90 and lon within ±180".to_string(),
        ));
    }
    Ok(Json(state.geocoder.resolve(lat, lon).await))
}
