pub mod client;
pub mod error;
pub mod mobile;
pub mod params;
pub mod sink;
pub mod source;
pub mod traversal;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use mobile::{is_mobile_number, retain_mobile, select_for_display};
pub use params::parse_location;
pub use sink::PageSink;
pub use source::{DetailFetcher, SearchClient};
pub use traversal::{PageTraversal, TraversalOptions};
pub use types::{
    DetailRecord, LatLng, NearbySearchResponse, PageResult, PlaceDetail, QueryParameters, RankBy,
    ResultStatus, SearchPage, SummaryRecord,
};
