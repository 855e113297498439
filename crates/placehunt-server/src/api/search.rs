//! Streaming nearby search.
//!
//! `GET /api/v1/search` answers with `application/x-ndjson`: one serialized
//! page per line, written as soon as that page is ready. A failed page request
//! becomes a final `{"error":..,"meta":..}` line and the body ends there.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use futures::StreamExt;
use placehunt_places::{
    parse_location, retain_mobile, PageResult, PageTraversal, PlacesError, QueryParameters, RankBy,
    TraversalOptions,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Upper bound for a per-request `max_depth` override.
const MAX_REQUEST_DEPTH: u32 = 10;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    /// `lat,lng` or a JSON object string.
    location: String,
    radius: Option<u32>,
    keyword: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    place_type: Option<String>,
    rankby: Option<RankBy>,
    language: Option<String>,
    minprice: Option<u8>,
    maxprice: Option<u8>,
    #[serde(default)]
    opennow: bool,
    pagetoken: Option<String>,
    max_depth: Option<u32>,
    #[serde(default)]
    all_numbers: bool,
}

impl SearchQuery {
    fn to_params(&self) -> Result<QueryParameters, PlacesError> {
        let params = QueryParameters {
            radius: self.radius,
            keyword: self.keyword.clone(),
            name: self.name.clone(),
            place_type: self.place_type.clone(),
            rankby: self.rankby,
            language: self.language.clone(),
            minprice: self.minprice,
            maxprice: self.maxprice,
            opennow: self.opennow.then_some(true),
            pagetoken: self.pagetoken.clone(),
            ..QueryParameters::new(parse_location(&self.location)?)
        };
        params.validate()?;
        Ok(params)
    }
}

pub(super) fn normalize_depth(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).min(MAX_REQUEST_DEPTH)
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    let params = query
        .to_params()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let options = TraversalOptions {
        max_depth: normalize_depth(query.max_depth, state.traversal.max_depth),
        ..state.traversal.clone()
    };
    tracing::info!(
        request_id = %req_id.0,
        location = %params.location,
        max_depth = options.max_depth,
        resumed = params.pagetoken.is_some(),
        "search stream started"
    );

    let all_numbers = query.all_numbers;
    let request_id = req_id.0;
    let pages = PageTraversal::new(
        Arc::clone(&state.client),
        Arc::clone(&state.client),
        params,
        options,
    )
    .with_cancellation(state.shutdown.child_token())
    .into_stream()
    .map(move |item| Ok::<_, Infallible>(ndjson_line(item, all_numbers, &request_id)));

    Ok((
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(pages),
    )
        .into_response())
}

/// Encodes one stream item as a newline-terminated JSON line.
fn ndjson_line(
    item: Result<PageResult, PlacesError>,
    all_numbers: bool,
    request_id: &str,
) -> String {
    let encoded = match item {
        Ok(mut page) => {
            if !all_numbers {
                page.single_location = retain_mobile(page.single_location);
            }
            serde_json::to_string(&page)
        }
        Err(e) => {
            tracing::warn!(request_id, error = %e, "search stream ended with an error");
            serde_json::to_string(&ApiError::new(request_id, "upstream_error", e.to_string()))
        }
    };

    let mut line = encoded.unwrap_or_else(|e| {
        tracing::error!(request_id, error = %e, "failed to encode search stream line");
        r#"{"error":{"code":"internal_error","message":"failed to encode page"}}"#.to_owned()
    });
    line.push('\n');
    line
}
