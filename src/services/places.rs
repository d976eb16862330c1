use crate::config::PlacesSettings;
use crate::models::AddressQuery;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the address autocomplete provider
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Places API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Google Places autocomplete client
///
/// Suggestions are restricted to street addresses. The provider's JSON is
/// handed back untouched; callers relay it to the browser as-is.
pub struct PlacesClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PlacesClient {
    /// Create a new Places client from its settings
    pub fn new(settings: &PlacesSettings) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    /// Fetch address suggestions for a free-text fragment
    pub async fn autocomplete(&self, query: &AddressQuery) -> Result<Value, PlacesError> {
        let url = format!("{}/autocomplete/json", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting address suggestions for: {}", query.input);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("input", query.input.as_str()),
                ("types", "address"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(PlacesError::ApiError(format!("{} - {}", status, body)));
        }

        let body = response.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| PlacesError::InvalidResponse(format!("Failed to parse suggestions: {}", e)))
    }
}
