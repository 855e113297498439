//! Places web-service request and response types.
//!
//! ## Observed shape of `place/nearbysearch/json`
//!
//! ```text
//! { "html_attributions": [], "results": [...], "next_page_token": "...", "status": "OK" }
//! ```
//!
//! `next_page_token` is omitted on the last page. `error_message` only appears
//! alongside a non-`OK` status. A token is not usable for roughly two seconds
//! after it is issued; early requests come back as `INVALID_REQUEST`.
//!
//! ### Result entries
//! Every field of a nearby-search result is optional in practice. Entries
//! without a `place_id` have been seen for permanently closed businesses.
//!
//! ## Observed shape of `place/details/json`
//!
//! ```text
//! { "html_attributions": [], "result": { ... }, "status": "OK" }
//! ```
//!
//! `result` is absent for `NOT_FOUND` / `INVALID_REQUEST`. Phone numbers come
//! back in national format with spaces, e.g. `"06 12 34 56 78"`.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    Prominence,
    Distance,
}

impl RankBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RankBy::Prominence => "prominence",
            RankBy::Distance => "distance",
        }
    }
}

impl std::str::FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prominence" => Ok(RankBy::Prominence),
            "distance" => Ok(RankBy::Distance),
            other => Err(format!("unknown ranking '{other}'")),
        }
    }
}

/// Parameters for one nearby-search request.
///
/// A traversal derives the parameters for page `n + 1` from page `n` by
/// overlaying the returned `next_page_token` via [`QueryParameters::with_page_token`];
/// every other field is carried over untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub location: LatLng,
    /// Search radius in metres. Must be omitted when ranking by distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rankby: Option<RankBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minprice: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxprice: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opennow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagetoken: Option<String>,
}

/// Status values carried in the body of every Places response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    MaxWaypointsExceeded,
    MaxRouteLengthExceeded,
    OverDailyLimit,
    NotFound,
    #[serde(other)]
    UnknownError,
}

impl ResultStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Ok => "OK",
            ResultStatus::ZeroResults => "ZERO_RESULTS",
            ResultStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ResultStatus::RequestDenied => "REQUEST_DENIED",
            ResultStatus::InvalidRequest => "INVALID_REQUEST",
            ResultStatus::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            ResultStatus::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED",
            ResultStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            ResultStatus::NotFound => "NOT_FOUND",
            ResultStatus::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// One place as listed on a nearby-search page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Short address; nearby search returns this instead of `formatted_address`.
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

/// Top-level body of `GET place/nearbysearch/json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub results: Vec<SummaryRecord>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub status: Option<ResultStatus>,
}

/// One search response together with its transport status.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub status: u16,
    pub status_text: String,
    pub data: NearbySearchResponse,
}

/// `result` object of `GET place/details/json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetail {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Top-level body of `GET place/details/json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceDetail>,
    #[serde(default)]
    pub status: Option<ResultStatus>,
}

/// A place detail that is known to carry a phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DetailRecord {
    /// Returns `None` when the detail has no phone number or a blank one.
    #[must_use]
    pub fn from_detail(detail: PlaceDetail) -> Option<Self> {
        let phone = detail
            .formatted_phone_number
            .filter(|p| !p.trim().is_empty())?;
        Some(Self {
            place_id: detail.place_id,
            name: detail.name,
            formatted_address: detail.formatted_address,
            formatted_phone_number: phone,
            international_phone_number: detail.international_phone_number,
            website: detail.website,
            url: detail.url,
        })
    }
}

/// One emitted page of a traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub status: u16,
    pub status_text: String,
    pub res_status: Option<ResultStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub results: Vec<SummaryRecord>,
    pub single_location: Vec<DetailRecord>,
    pub page_number: u32,
}

impl PageResult {
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_page_token.is_some()
    }
}
