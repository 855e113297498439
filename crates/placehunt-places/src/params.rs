//! Building, validating and encoding [`QueryParameters`].

use crate::error::PlacesError;
use crate::types::{LatLng, QueryParameters, RankBy};

/// Largest radius accepted by nearby search, in metres.
pub const MAX_RADIUS_METRES: u32 = 50_000;

impl QueryParameters {
    #[must_use]
    pub fn new(location: LatLng) -> Self {
        Self {
            location,
            radius: None,
            keyword: None,
            name: None,
            place_type: None,
            rankby: None,
            language: None,
            minprice: None,
            maxprice: None,
            opennow: None,
            pagetoken: None,
        }
    }

    /// Returns a copy of these parameters with `pagetoken` replaced.
    #[must_use]
    pub fn with_page_token(&self, token: impl Into<String>) -> Self {
        Self {
            pagetoken: Some(token.into()),
            ..self.clone()
        }
    }

    /// Checks the combinations nearby search rejects with `INVALID_REQUEST`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::InvalidParameters`] describing the first problem found.
    pub fn validate(&self) -> Result<(), PlacesError> {
        let LatLng { lat, lng } = self.location;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(PlacesError::InvalidParameters(format!(
                "location {lat},{lng} is out of range"
            )));
        }

        if self.rankby == Some(RankBy::Distance) {
            if self.radius.is_some() {
                return Err(PlacesError::InvalidParameters(
                    "radius must not be set when ranking by distance".to_owned(),
                ));
            }
            if self.keyword.is_none() && self.name.is_none() && self.place_type.is_none() {
                return Err(PlacesError::InvalidParameters(
                    "ranking by distance requires a keyword, name or type".to_owned(),
                ));
            }
        } else {
            match self.radius {
                None => {
                    return Err(PlacesError::InvalidParameters(
                        "radius is required unless ranking by distance".to_owned(),
                    ))
                }
                Some(0) => {
                    return Err(PlacesError::InvalidParameters(
                        "radius must be greater than zero".to_owned(),
                    ))
                }
                Some(r) if r > MAX_RADIUS_METRES => {
                    return Err(PlacesError::InvalidParameters(format!(
                        "radius {r} exceeds the {MAX_RADIUS_METRES} m maximum"
                    )))
                }
                Some(_) => {}
            }
        }

        for (label, price) in [("minprice", self.minprice), ("maxprice", self.maxprice)] {
            if let Some(p) = price {
                if p > 4 {
                    return Err(PlacesError::InvalidParameters(format!(
                        "{label} must be between 0 and 4, got {p}"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.minprice, self.maxprice) {
            if min > max {
                return Err(PlacesError::InvalidParameters(format!(
                    "minprice {min} is greater than maxprice {max}"
                )));
            }
        }

        Ok(())
    }

    /// Query-string pairs for the nearby-search endpoint, excluding the API key.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("location", self.location.to_string())];
        if let Some(radius) = self.radius {
            pairs.push(("radius", radius.to_string()));
        }
        if let Some(keyword) = non_empty(self.keyword.as_deref()) {
            pairs.push(("keyword", keyword.to_owned()));
        }
        if let Some(name) = non_empty(self.name.as_deref()) {
            pairs.push(("name", name.to_owned()));
        }
        if let Some(place_type) = non_empty(self.place_type.as_deref()) {
            pairs.push(("type", place_type.to_owned()));
        }
        if let Some(rankby) = self.rankby {
            pairs.push(("rankby", rankby.as_str().to_owned()));
        }
        if let Some(language) = non_empty(self.language.as_deref()) {
            pairs.push(("language", language.to_owned()));
        }
        if let Some(minprice) = self.minprice {
            pairs.push(("minprice", minprice.to_string()));
        }
        if let Some(maxprice) = self.maxprice {
            pairs.push(("maxprice", maxprice.to_string()));
        }
        if self.opennow == Some(true) {
            pairs.push(("opennow", "true".to_owned()));
        }
        if let Some(token) = non_empty(self.pagetoken.as_deref()) {
            pairs.push(("pagetoken", token.to_owned()));
        }
        pairs
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a location given either as a JSON object (`{"lat":48.85,"lng":2.35}`)
/// or as a `lat,lng` pair.
///
/// # Errors
///
/// Returns [`PlacesError::InvalidParameters`] if neither form parses.
pub fn parse_location(raw: &str) -> Result<LatLng, PlacesError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<LatLng>(trimmed).map_err(|e| {
            PlacesError::InvalidParameters(format!("location \"{trimmed}\" is not valid JSON: {e}"))
        });
    }

    let invalid = || {
        PlacesError::InvalidParameters(format!(
            "location \"{trimmed}\" must be \"lat,lng\" or {{\"lat\":..,\"lng\":..}}"
        ))
    };
    let (lat, lng) = trimmed.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(LatLng { lat, lng })
}
