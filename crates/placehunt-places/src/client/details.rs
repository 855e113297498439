//! Concurrent detail lookups for one page of search results.

use futures::stream::{self, StreamExt};

use crate::types::DetailRecord;

use super::PlacesClient;

impl PlacesClient {
    /// Fetches details for every identifier concurrently and keeps the ones
    /// that carry a phone number.
    ///
    /// Output order follows `place_ids`, not completion order. Empty
    /// identifiers are skipped without a request, so an all-empty input
    /// returns an empty `Vec` and touches the network zero times.
    ///
    /// A failed lookup is logged and dropped like a detail without a phone
    /// number; one bad identifier never fails the whole page.
    pub async fn fetch_phone_details(&self, place_ids: &[String]) -> Vec<DetailRecord> {
        let ids: Vec<String> = place_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();

        if ids.is_empty() {
            return Vec::new();
        }

        let lookups: Vec<Option<DetailRecord>> = stream::iter(ids)
            .map(|place_id: String| async move {
                let place_id = place_id.as_str();
                match self.place_details(place_id).await {
                    Ok(Some(detail)) => {
                        let record = DetailRecord::from_detail(detail);
                        if record.is_none() {
                            tracing::debug!(place_id, "dropping place without phone number");
                        }
                        record
                    }
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!(place_id, error = %e, "place details lookup failed, skipping");
                        None
                    }
                }
            })
            .buffered(self.detail_max_concurrent)
            .collect()
            .await;

        lookups.into_iter().flatten().collect()
    }
}
