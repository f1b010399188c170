//! Source catalog: where each itinerary category comes from
//!
//! Each web source is a base URL, the selector of the subtree holding the
//! useful content, and optionally the soft-404 marker of that site. The
//! catalog turns a [`TripRequest`] into one [`SourceQuery`] per category.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::existence::FailureMarker;
use crate::itinerary::TripRequest;
use crate::pipeline::{SourceQuery, SourceTarget};

/// Itinerary categories, one per source pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Summary,
    Routes,
    Events,
    Hotels,
    Attractions,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Summary,
        Category::Routes,
        Category::Events,
        Category::Hotels,
        Category::Attractions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Routes => "routes",
            Self::Events => "events",
            Self::Hotels => "hotels",
            Self::Attractions => "attractions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A website the pipeline scrapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSource {
    pub base_url: String,
    pub selector: String,
    pub failure_marker: Option<FailureMarker>,
}

impl SiteSource {
    pub fn new(base_url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            selector: selector.into(),
            failure_marker: None,
        }
    }

    pub fn with_failure_marker(mut self, message: &str, selector: &str) -> Self {
        self.failure_marker = Some(FailureMarker::new(message, selector));
        self
    }

    fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.base_url, e)))
    }

    /// Base URL with `segments` appended as percent-encoded path segments
    fn url_with_segments(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn target(&self, url: String) -> SourceTarget {
        SourceTarget::Page {
            url,
            selector: self.selector.clone(),
            existence_check: self.failure_marker.clone(),
        }
    }
}

/// Per-category source definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCatalog {
    /// Destination guide article
    pub summary: SiteSource,
    /// Origin to destination route planner
    pub routes: SiteSource,
    /// Local event listings
    pub events: SiteSource,
    /// Hotel search results
    pub hotels: SiteSource,
    /// Most attractions kept from the direct prompt
    pub max_attractions: usize,
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self {
            summary: SiteSource::new("https://en.wikivoyage.org/wiki/", ".mw-content-ltr")
                .with_failure_marker("There is currently no text in this page.", ".noarticletext"),
            routes: SiteSource::new("https://www.rome2rio.com/map/", ".rounded-tr-md"),
            events: SiteSource::new(
                "https://www.eventbrite.com/d/",
                ".SearchResultPanelContentEventCardList-module__eventList___2wk-D",
            )
            .with_failure_marker(
                "Whoops, the page or event you are looking for was not found.",
                "h1",
            ),
            hotels: SiteSource::new("https://www.booking.com/searchresults.html", ".cca574b93c"),
            max_attractions: 10,
        }
    }
}

impl SourceCatalog {
    /// Build the query for `category` from a trip request
    pub fn query(&self, category: Category, trip: &TripRequest) -> Result<SourceQuery> {
        match category {
            Category::Summary => self.summary_query(trip),
            Category::Routes => self.routes_query(trip),
            Category::Events => self.events_query(trip),
            Category::Hotels => self.hotels_query(trip),
            Category::Attractions => Ok(self.attractions_query(trip)),
        }
    }

    pub fn summary_query(&self, trip: &TripRequest) -> Result<SourceQuery> {
        let url = self
            .summary
            .url_with_segments(&[&underscore_slug(&trip.destination)])?;

        Ok(SourceQuery {
            category: Category::Summary,
            target: self.summary.target(url),
            instruction: format!(
                "Extract a short summary from the article about the destination's history \
                 (\"history\"), transportation (\"transportation\"), things to do \
                 (\"things_to_do\"), food (\"food\"), and hotels (\"hotels\"). If there is no \
                 or insufficient information on a topic, use '{}' as the summary for that \
                 topic.",
                crate::extract::LITTLE_INFORMATION
            ),
            max_items: None,
        })
    }

    pub fn routes_query(&self, trip: &TripRequest) -> Result<SourceQuery> {
        let url = self.routes.url_with_segments(&[
            &hyphen_slug(&trip.origin),
            &hyphen_slug(&trip.destination),
        ])?;

        Ok(SourceQuery {
            category: Category::Routes,
            target: self.routes.target(url),
            instruction: format!(
                "For each listed way to travel, extract the travel methods (\"methods\"), the \
                 predicted time spent (\"time\"), and the cost range (\"price_range\"). Mark \
                 the route as relevant (\"relevant\") if it especially suits the traveller's \
                 purpose of visiting, which is: {}",
                trip.purpose
            ),
            max_items: None,
        })
    }

    pub fn events_query(&self, trip: &TripRequest) -> Result<SourceQuery> {
        let url = self.events.url_with_segments(&[
            &hyphen_slug(&trip.destination).to_lowercase(),
            "all-events",
            "",
        ])?;

        Ok(SourceQuery {
            category: Category::Events,
            target: self.events.target(url),
            instruction: format!(
                "Extract the name (\"name\"), time (\"time\"), and area (\"area\") of each \
                 listed event. Mark the event as relevant (\"relevant\") if it especially \
                 aligns with the user's purpose of visiting, which is: {}",
                trip.purpose
            ),
            max_items: None,
        })
    }

    pub fn hotels_query(&self, trip: &TripRequest) -> Result<SourceQuery> {
        let checkin = trip.stay_start.to_string();
        let checkout = trip.stay_end.to_string();
        let adults = trip.party_size.to_string();
        let rooms = trip.room_count.to_string();
        let url = Url::parse_with_params(
            &self.hotels.base_url,
            &[
                ("ss", trip.destination.as_str()),
                ("dest_type", "city"),
                ("checkin", checkin.as_str()),
                ("checkout", checkout.as_str()),
                ("group_adults", adults.as_str()),
                ("no_rooms", rooms.as_str()),
                ("group_children", "0"),
            ],
        )
        .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.hotels.base_url, e)))?;

        Ok(SourceQuery {
            category: Category::Hotels,
            target: self.hotels.target(url.into()),
            instruction: format!(
                "For each listed hotel, extract its name (\"name\"), review score out of 10 \
                 (\"review_score\"), prices (\"per_night_price\" and \"total_price\"), distance \
                 from downtown (\"distance\"), and any extra info that might be important \
                 (\"extra_info\"). Mark the hotel as relevant (\"relevant\") if it especially \
                 aligns with the user's purpose of visiting, which is: {}",
                trip.purpose
            ),
            max_items: None,
        })
    }

    pub fn attractions_query(&self, trip: &TripRequest) -> SourceQuery {
        SourceQuery {
            category: Category::Attractions,
            target: SourceTarget::Prompt,
            instruction: format!(
                "Describe {} (or less, depends on what is available) different attractions at \
                 {} that align with the user's goal of visiting, which is: {}. For each give \
                 its name (\"name\"), location (\"location\"), and a short description \
                 (\"description\").",
                self.max_attractions, trip.destination, trip.purpose
            ),
            max_items: Some(self.max_attractions),
        }
    }
}

fn words(place: &str) -> impl Iterator<Item = &str> {
    place
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
}

/// `"Carson City"` -> `"Carson_City"`
fn underscore_slug(place: &str) -> String {
    words(place).collect::<Vec<_>>().join("_")
}

/// `"Carson City"` -> `"Carson-City"`
fn hyphen_slug(place: &str) -> String {
    words(place).collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(destination: &str) -> TripRequest {
        TripRequest {
            destination: destination.to_string(),
            origin: "Washington DC".to_string(),
            party_size: 3,
            stay_start: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            stay_end: NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
            room_count: 1,
            purpose: "to embrace the arts".to_string(),
        }
    }

    fn page_url(query: &SourceQuery) -> &str {
        match &query.target {
            SourceTarget::Page { url, .. } => url,
            SourceTarget::Prompt => panic!("expected a page target"),
        }
    }

    #[test]
    fn test_slugs() {
        assert_eq!(underscore_slug(" Carson  City "), "Carson_City");
        assert_eq!(hyphen_slug("Bowie, Maryland"), "Bowie-Maryland");
        assert_eq!(hyphen_slug("Bowie"), "Bowie");
    }

    #[test]
    fn test_summary_query() {
        let catalog = SourceCatalog::default();
        let query = catalog.summary_query(&trip("Carson City")).unwrap();

        assert_eq!(page_url(&query), "https://en.wikivoyage.org/wiki/Carson_City");
        assert_eq!(
            query.existence_check(),
            Some(&FailureMarker::new(
                "There is currently no text in this page.",
                ".noarticletext"
            ))
        );
        assert!(query.instruction.contains("\"things_to_do\""));
        assert!(query.instruction.contains("Little information."));
    }

    #[test]
    fn test_routes_query() {
        let query = SourceCatalog::default().routes_query(&trip("Bowie")).unwrap();

        assert_eq!(page_url(&query), "https://www.rome2rio.com/map/Washington-DC/Bowie");
        assert_eq!(query.existence_check(), None);
        assert!(query.instruction.contains("\"price_range\""));
    }

    #[test]
    fn test_events_query() {
        let query = SourceCatalog::default().events_query(&trip("Carson City")).unwrap();

        assert_eq!(
            page_url(&query),
            "https://www.eventbrite.com/d/carson-city/all-events/"
        );
        assert!(query.existence_check().is_some());
        assert!(query.instruction.ends_with("to embrace the arts"));
    }

    #[test]
    fn test_hotels_query() {
        let query = SourceCatalog::default().hotels_query(&trip("Carson City")).unwrap();
        let url = Url::parse(page_url(&query)).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/searchresults.html");
        assert!(params.contains(&("ss".to_string(), "Carson City".to_string())));
        assert!(params.contains(&("checkin".to_string(), "2025-10-01".to_string())));
        assert!(params.contains(&("checkout".to_string(), "2025-10-07".to_string())));
        assert!(params.contains(&("group_adults".to_string(), "3".to_string())));
        assert!(params.contains(&("no_rooms".to_string(), "1".to_string())));
        assert!(params.contains(&("group_children".to_string(), "0".to_string())));
        assert!(params.contains(&("dest_type".to_string(), "city".to_string())));
        assert_eq!(query.existence_check(), None);
    }

    #[test]
    fn test_attractions_query_is_a_prompt() {
        let query = SourceCatalog::default().attractions_query(&trip("Carson City"));

        assert_eq!(query.target, SourceTarget::Prompt);
        assert_eq!(query.max_items, Some(10));
        assert!(query.instruction.contains("attractions at Carson City"));
        assert!(query.instruction.contains("to embrace the arts"));
    }

    #[test]
    fn test_query_dispatch_matches_category() {
        let catalog = SourceCatalog::default();
        for category in Category::ALL {
            let query = catalog.query(category, &trip("Bowie")).unwrap();
            assert_eq!(query.category, category);
        }
    }

    #[test]
    fn test_bad_base_url() {
        let mut catalog = SourceCatalog::default();
        catalog.summary.base_url = "not a url".to_string();
        assert!(matches!(
            catalog.summary_query(&trip("Bowie")),
            Err(Error::Config(_))
        ));
    }
}
