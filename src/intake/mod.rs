//! Quote intake: the lead-capture flow behind the public quote form.

pub mod geocode;
pub mod images;

use chrono::{SubsecRound, Utc};

use crate::db::models::{Quote, QuoteStatus, MAX_QUOTE_IMAGES, QUOTES};
use crate::db::{DocumentStore, StoreError};

/// Where the quote form is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Idle,
    Collecting { error: Option<String> },
    Submitting,
    /// Sent; the form is closed and its fields reset.
    Closed,
    /// Sending failed; the form stays open with the entered data.
    Failed { error: String },
}

impl DialogState {
    pub fn open(self) -> Self {
        match self {
            DialogState::Idle | DialogState::Closed => DialogState::Collecting { error: None },
            other => other,
        }
    }

    /// Rejected before sending; nothing was written.
    pub fn reject(self, error: impl Into<String>) -> Self {
        match self {
            DialogState::Collecting { .. } | DialogState::Failed { .. } => {
                DialogState::Collecting {
                    error: Some(error.into()),
                }
            }
            other => other,
        }
    }

    pub fn submit(self) -> Self {
        match self {
            DialogState::Collecting { .. } | DialogState::Failed { .. } => DialogState::Submitting,
            other => other,
        }
    }

    pub fn finish(self, result: &Result<String, IntakeError>) -> Self {
        match (self, result) {
            (DialogState::Submitting, Ok(_)) => DialogState::Closed,
            (DialogState::Submitting, Err(e)) => DialogState::Failed {
                error: e.to_string(),
            },
            (other, _) => other,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DialogState::Collecting { error } => error.as_deref(),
            DialogState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("name, phone and job details are required")]
    MissingFields,

    #[error("at most {MAX_QUOTE_IMAGES} images may be attached")]
    TooManyImages,

    #[error("attachment {0} is not a supported image")]
    UnsupportedImage(usize),

    #[error("could not prepare attachment: {0}")]
    Image(#[from] images::ImageError),

    #[error("could not save the request: {0}")]
    Store(#[from] StoreError),
}

impl IntakeError {
    /// Problems the visitor can fix by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IntakeError::MissingFields | IntakeError::TooManyImages | IntakeError::UnsupportedImage(_)
        )
    }
}

/// Fields entered on the quote form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteDraft {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    /// Raw uploaded files, in the order attached.
    pub images: Vec<Vec<u8>>,
}

impl QuoteDraft {
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.name.trim().is_empty()
            || self.phone.trim().is_empty()
            || self.description.trim().is_empty()
        {
            return Err(IntakeError::MissingFields);
        }
        if self.images.len() > MAX_QUOTE_IMAGES {
            return Err(IntakeError::TooManyImages);
        }
        if let Some(index) = self
            .images
            .iter()
            .position(|bytes| images::sniff_mime(bytes).is_none())
        {
            return Err(IntakeError::UnsupportedImage(index + 1));
        }
        Ok(())
    }
}

/// Validates, encodes the photos, and writes one `quotes` document.
///
/// Every check runs before the single write, so a rejected draft leaves the
/// store untouched.
pub async fn submit_quote(
    store: &dyn DocumentStore,
    draft: QuoteDraft,
) -> Result<String, IntakeError> {
    draft.validate()?;

    let mut encoded = Vec::with_capacity(draft.images.len());
    for bytes in draft.images {
        encoded.push(images::prepare(bytes).await?);
    }

    let quote = Quote {
        id: String::new(),
        name: draft.name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        address: draft.address.trim().to_string(),
        description: draft.description.trim().to_string(),
        images: encoded,
        created_at: Some(Utc::now().trunc_subsecs(0)),
        status: QuoteStatus::New,
    };

    let data = serde_json::to_value(&quote).map_err(StoreError::from)?;
    let id = store.add(QUOTES, data).await?;
    tracing::info!(quote_id = %id, images = quote.images.len(), "quote request received");
    Ok(id)
}
