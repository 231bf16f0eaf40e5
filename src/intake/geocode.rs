//! Reverse geocoding for the "use my location" button on the quote form.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned status {0}")]
    Status(u16),

    #[error("geocoder response has no address")]
    MissingAddress,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Address lookup result. Always carries something usable in `address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    pub address: String,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn fallback_address(lat: f64, lon: f64) -> String {
    format!("Lat: {}, Lon: {}", lat, lon)
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl Geocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default geocoder client");
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Human-readable address for a coordinate pair, in Thai.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("accept-language", "th".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        response
            .json::<ReverseResponse>()
            .await?
            .display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(GeocodeError::MissingAddress)
    }

    /// Like [`reverse`](Self::reverse), but degrades to raw coordinates.
    pub async fn resolve(&self, lat: f64, lon: f64) -> ResolvedAddress {
        match self.reverse(lat, lon).await {
            Ok(address) => ResolvedAddress {
                address,
                resolved: true,
                warning: None,
            },
            Err(e) => {
                tracing::warn!(lat, lon, error = %e, "reverse geocoding failed");
                ResolvedAddress {
                    address: fallback_address(lat, lon),
                    resolved: false,
                    warning: Some(
                        "Could not look up the address, please check or type it manually"
                            .to_string(),
                    ),
                }
            }
        }
    }
}
