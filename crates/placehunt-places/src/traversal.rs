//! Cursor-driven traversal of nearby-search pages.
//!
//! Each step fetches one search page, looks up details for every result on
//! it, and emits a [`PageResult`]. A `next_page_token` schedules another step;
//! its absence, the depth bound, cancellation or an error ends the sequence.
//!
//! ## Pacing
//!
//! Upstream page tokens become valid a short while after they are issued, so
//! the request that follows a token waits `page_delay` first. The wait is
//! taken at the start of the next step, after the depth check: a traversal
//! that stops on its depth bound never sleeps for a page it will not fetch.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::PlacesError;
use crate::sink::PageSink;
use crate::source::{DetailFetcher, SearchClient};
use crate::types::{NearbySearchResponse, PageResult, QueryParameters, SearchPage};

pub const DEFAULT_MAX_DEPTH: u32 = 3;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Upper bound on page numbers; the traversal fetches pages
    /// `current_depth + 1 ..= max_depth` at most.
    pub max_depth: u32,
    /// Pages already consumed by an earlier traversal. Page numbers continue
    /// from here.
    pub current_depth: u32,
    pub page_delay: Duration,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            current_depth: 0,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl TraversalOptions {
    #[must_use]
    pub fn from_app_config(config: &placehunt_core::AppConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            current_depth: 0,
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }
}

/// One traversal over the pages of a nearby search.
///
/// Consume it either by pulling from [`PageTraversal::into_stream`] or by
/// pushing into a callback with [`PageTraversal::for_each_page`].
pub struct PageTraversal<S: ?Sized, D: ?Sized> {
    search: Arc<S>,
    details: Arc<D>,
    params: QueryParameters,
    options: TraversalOptions,
    cancel: CancellationToken,
}

impl<S, D> PageTraversal<S, D>
where
    S: SearchClient + ?Sized + 'static,
    D: DetailFetcher + ?Sized + 'static,
{
    pub fn new(
        search: Arc<S>,
        details: Arc<D>,
        params: QueryParameters,
        options: TraversalOptions,
    ) -> Self {
        Self {
            search,
            details,
            params,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the traversal's cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that stops the traversal before its next page request.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Pull-based consumption: a stream yielding one item per fetched page.
    ///
    /// Nothing is requested until the stream is polled. An `Err` item is
    /// always the last one. Dropping the stream stops the traversal at its
    /// next suspension point.
    pub fn into_stream(self) -> BoxStream<'static, Result<PageResult, PlacesError>> {
        let state = TraversalState {
            search: self.search,
            details: self.details,
            params: self.params,
            depth: self.options.current_depth,
            max_depth: self.options.max_depth,
            page_delay: self.options.page_delay,
            cancel: self.cancel,
            pacing_due: false,
            finished: false,
        };
        stream::unfold(state, TraversalState::advance).boxed()
    }

    /// Push-based consumption: calls `on_page` once per page number, in page
    /// order, as soon as each page is ready.
    ///
    /// Returns the number of pages delivered.
    ///
    /// # Errors
    ///
    /// Returns the first search or detail failure. Pages delivered before the
    /// failure have already reached `on_page`.
    pub async fn for_each_page<F>(self, on_page: F) -> Result<usize, PlacesError>
    where
        F: FnMut(PageResult),
    {
        let mut sink = PageSink::new(on_page);
        let mut pages = self.into_stream();
        while let Some(page) = pages.next().await {
            sink.accept(page?);
        }
        Ok(sink.delivered())
    }
}

struct TraversalState<S: ?Sized, D: ?Sized> {
    search: Arc<S>,
    details: Arc<D>,
    params: QueryParameters,
    depth: u32,
    max_depth: u32,
    page_delay: Duration,
    cancel: CancellationToken,
    /// Set once a page returned a token; the next fetch must wait first.
    pacing_due: bool,
    finished: bool,
}

impl<S, D> TraversalState<S, D>
where
    S: SearchClient + ?Sized,
    D: DetailFetcher + ?Sized,
{
    async fn advance(mut self) -> Option<(Result<PageResult, PlacesError>, Self)> {
        if self.finished {
            return None;
        }

        if self.depth >= self.max_depth {
            if self.pacing_due {
                tracing::info!(
                    max_depth = self.max_depth,
                    "maximum depth reached, remaining pages not fetched"
                );
            }
            return None;
        }

        if self.cancel.is_cancelled() {
            tracing::debug!(depth = self.depth, "traversal cancelled");
            return None;
        }

        if self.pacing_due && !self.page_delay.is_zero() {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!(depth = self.depth, "traversal cancelled during page delay");
                    return None;
                }
                () = tokio::time::sleep(self.page_delay) => {}
            }
        }
        self.pacing_due = false;

        match self.fetch_page().await {
            Ok(page) => {
                if let Some(token) = &page.next_page_token {
                    self.params = self.params.with_page_token(token.clone());
                    self.depth += 1;
                    self.pacing_due = true;
                } else {
                    self.finished = true;
                }
                Some((Ok(page), self))
            }
            Err(e) => {
                tracing::warn!(
                    page_number = self.depth + 1,
                    error = %e,
                    "page fetch failed, aborting traversal"
                );
                self.finished = true;
                Some((Err(e), self))
            }
        }
    }

    async fn fetch_page(&self) -> Result<PageResult, PlacesError> {
        let page_number = self.depth + 1;

        let SearchPage {
            status,
            status_text,
            data,
        } = self.search.nearby_search(&self.params).await?;
        let NearbySearchResponse {
            results,
            next_page_token,
            error_message,
            status: res_status,
        } = data;

        let place_ids: Vec<String> = results
            .iter()
            .map(|r| r.place_id.clone().unwrap_or_default())
            .collect();
        let single_location = self.details.fetch_details(&place_ids).await?;

        let next_page_token = next_page_token.filter(|t| !t.is_empty());

        tracing::info!(
            page_number,
            results = results.len(),
            with_phone = single_location.len(),
            has_next_page = next_page_token.is_some(),
            "page fetched"
        );

        Ok(PageResult {
            status,
            status_text,
            res_status,
            next_page_token,
            error_message,
            results,
            single_location,
            page_number,
        })
    }
}

#[cfg(test)]
#[path = "traversal_test.rs"]
mod tests;
