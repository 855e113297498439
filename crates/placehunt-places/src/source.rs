//! The two collaborators a traversal drives: one paged search call and one
//! batch of detail lookups per page.
//!
//! [`PlacesClient`] implements both. Tests and alternative backends plug in
//! their own implementations.

use async_trait::async_trait;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::{DetailRecord, QueryParameters, SearchPage};

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Issues one nearby-search request. `params.pagetoken` selects the page.
    async fn nearby_search(&self, params: &QueryParameters) -> Result<SearchPage, PlacesError>;
}

#[async_trait]
pub trait DetailFetcher: Send + Sync {
    /// Returns the detail records that carry a phone number, in the order of
    /// `place_ids`. Empty identifiers are never looked up.
    async fn fetch_details(&self, place_ids: &[String]) -> Result<Vec<DetailRecord>, PlacesError>;
}

#[async_trait]
impl SearchClient for PlacesClient {
    async fn nearby_search(&self, params: &QueryParameters) -> Result<SearchPage, PlacesError> {
        self.search_page(params).await
    }
}

#[async_trait]
impl DetailFetcher for PlacesClient {
    async fn fetch_details(&self, place_ids: &[String]) -> Result<Vec<DetailRecord>, PlacesError> {
        Ok(self.fetch_phone_details(place_ids).await)
    }
}
