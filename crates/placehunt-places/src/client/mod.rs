//! HTTP client for the Places nearby-search and place-details endpoints.
//!
//! Wraps `reqwest` with API key management and typed response
//! deserialization. Result-status values in the JSON body (`ZERO_RESULTS`,
//! `REQUEST_DENIED`, ...) are returned to the caller untouched; only transport
//! failures and non-2xx HTTP statuses become errors.

mod details;

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::types::{
    NearbySearchResponse, PlaceDetail, PlaceDetailsResponse, QueryParameters, SearchPage,
};

pub use placehunt_core::config::DEFAULT_PLACES_BASE_URL;

const NEARBY_SEARCH_PATH: &str = "place/nearbysearch/json";
const PLACE_DETAILS_PATH: &str = "place/details/json";

/// Default number of detail lookups kept in flight per page.
pub const DEFAULT_DETAIL_MAX_CONCURRENT: usize = 10;

/// Client for the Places web service.
///
/// Cheap to share behind an `Arc`: the inner `reqwest::Client` pools
/// connections and is safe for concurrent use by the detail fan-out and by
/// several traversals at once.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    search_url: Url,
    details_url: Url,
    detail_max_concurrent: usize,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_PLACES_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A single trailing slash makes `Url::join` append rather than
        // replace the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, &e))?;
        let search_url = base
            .join(NEARBY_SEARCH_PATH)
            .map_err(|e| invalid_base_url(base_url, &e))?;
        let details_url = base
            .join(PLACE_DETAILS_PATH)
            .map_err(|e| invalid_base_url(base_url, &e))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            search_url,
            details_url,
            detail_max_concurrent: DEFAULT_DETAIL_MAX_CONCURRENT,
        })
    }

    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// See [`PlacesClient::with_base_url`].
    pub fn from_app_config(config: &placehunt_core::AppConfig) -> Result<Self, PlacesError> {
        Ok(Self::with_base_url(
            &config.places_api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
        )?
        .with_detail_concurrency(config.detail_max_concurrent))
    }

    /// Sets how many detail lookups may run at once for one page. Values below
    /// one are clamped to one.
    #[must_use]
    pub fn with_detail_concurrency(mut self, max_concurrent: usize) -> Self {
        self.detail_max_concurrent = max_concurrent.max(1);
        self
    }

    /// Fetches one nearby-search page.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] for any non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn search_page(&self, params: &QueryParameters) -> Result<SearchPage, PlacesError> {
        let url = self.search_request_url(params);
        let (status, status_text, body) = self.get_text(url, NEARBY_SEARCH_PATH).await?;

        let data = serde_json::from_str::<NearbySearchResponse>(&body).map_err(|e| {
            PlacesError::Deserialize {
                context: format!("nearby search at {}", params.location),
                source: e,
            }
        })?;

        tracing::debug!(
            location = %params.location,
            results = data.results.len(),
            res_status = ?data.status,
            has_next_page = data.next_page_token.is_some(),
            "nearby search page fetched"
        );

        Ok(SearchPage {
            status,
            status_text,
            data,
        })
    }

    /// Fetches the detail record for one place. Returns `Ok(None)` when the
    /// response carries no `result` object.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::search_page`].
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetail>, PlacesError> {
        let url = self.details_request_url(place_id);
        let (_, _, body) = self.get_text(url, PLACE_DETAILS_PATH).await?;

        let parsed = serde_json::from_str::<PlaceDetailsResponse>(&body).map_err(|e| {
            PlacesError::Deserialize {
                context: format!("place details for {place_id}"),
                source: e,
            }
        })?;

        if parsed.result.is_none() {
            tracing::debug!(place_id, res_status = ?parsed.status, "place details without result");
        }
        Ok(parsed.result)
    }

    fn search_request_url(&self, params: &QueryParameters) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params.query_pairs() {
                pairs.append_pair(k, &v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    fn details_request_url(&self, place_id: &str) -> Url {
        let mut url = self.details_url.clone();
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("key", &self.api_key);
        url
    }

    /// Sends a GET request and returns the status code, its canonical reason
    /// and the body text. `endpoint` names the request in errors so the API
    /// key never ends up in logs.
    async fn get_text(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<(u16, String, String), PlacesError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        let status = response.status();

        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
            });
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_owned();
        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        Ok((status.as_u16(), status_text, body))
    }
}

fn invalid_base_url(base_url: &str, err: &dyn std::fmt::Display) -> PlacesError {
    PlacesError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
