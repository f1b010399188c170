//! # Itinerary Aggregator
//!
//! Runs every source pipeline for one trip request and merges the outcomes
//! into an [`ItineraryResponse`]. A category that fails never affects the
//! others: its slot just holds `Unavailable`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::extract::{
    AttractionList, EventList, ExtractionResult, ExtractionSchema, ExtractionService, HotelList,
    Summary, TravelPathList, UnavailableReason,
};
use crate::fetch::PageFetcher;
use crate::pipeline::SourcePipeline;
use crate::sources::{Category, SourceCatalog};

/// What the traveller asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub origin: String,
    /// Number of adults travelling
    pub party_size: u32,
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
    pub room_count: u32,
    /// Free-text reason for the trip, used to flag relevant results
    pub purpose: String,
}

impl TripRequest {
    /// Reject requests no source can answer
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("destination", &self.destination),
            ("origin", &self.origin),
            ("purpose", &self.purpose),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidRequest(format!("{} must not be blank", field)));
            }
        }
        if self.party_size == 0 {
            return Err(Error::InvalidRequest("party size must be at least 1".to_string()));
        }
        if self.room_count == 0 {
            return Err(Error::InvalidRequest("room count must be at least 1".to_string()));
        }
        if self.stay_end < self.stay_start {
            return Err(Error::InvalidRequest(format!(
                "stay ends ({}) before it starts ({})",
                self.stay_end, self.stay_start
            )));
        }
        Ok(())
    }
}

/// One extraction result per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub summary: ExtractionResult<Summary>,
    pub routes: ExtractionResult<TravelPathList>,
    pub events: ExtractionResult<EventList>,
    pub hotels: ExtractionResult<HotelList>,
    pub attractions: ExtractionResult<AttractionList>,
}

impl ItineraryResponse {
    /// Categories that produced data
    pub fn available(&self) -> Vec<Category> {
        let flags = [
            (Category::Summary, self.summary.is_available()),
            (Category::Routes, self.routes.is_available()),
            (Category::Events, self.events.is_available()),
            (Category::Hotels, self.hotels.is_available()),
            (Category::Attractions, self.attractions.is_available()),
        ];
        flags
            .into_iter()
            .filter_map(|(category, available)| available.then_some(category))
            .collect()
    }
}

/// Builds itineraries from the configured sources
#[derive(Debug, Clone)]
pub struct Aggregator<F, S> {
    pipeline: SourcePipeline<F, S>,
    catalog: SourceCatalog,
    concurrent: bool,
}

impl<F, S> Aggregator<F, S>
where
    F: PageFetcher,
    S: ExtractionService,
{
    pub fn new(pipeline: SourcePipeline<F, S>, catalog: SourceCatalog) -> Self {
        Self {
            pipeline,
            catalog,
            concurrent: false,
        }
    }

    /// Run the category pipelines concurrently
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn pipeline(&self) -> &SourcePipeline<F, S> {
        &self.pipeline
    }

    /// Build the itinerary for `trip`
    ///
    /// Only an invalid request is an error. Every source failure ends up as
    /// `Unavailable` in its own slot.
    #[instrument(skip(self, trip), fields(destination = %trip.destination))]
    pub async fn build_itinerary(&self, trip: &TripRequest) -> Result<ItineraryResponse> {
        trip.validate()?;
        info!(concurrent = self.concurrent, "Building itinerary");

        let response = if self.concurrent {
            let (summary, routes, events, hotels, attractions) = futures::join!(
                self.run(Category::Summary, trip),
                self.run(Category::Routes, trip),
                self.run(Category::Events, trip),
                self.run(Category::Hotels, trip),
                self.run(Category::Attractions, trip),
            );
            ItineraryResponse {
                summary,
                routes,
                events,
                hotels,
                attractions,
            }
        } else {
            ItineraryResponse {
                summary: self.run(Category::Summary, trip).await,
                routes: self.run(Category::Routes, trip).await,
                events: self.run(Category::Events, trip).await,
                hotels: self.run(Category::Hotels, trip).await,
                attractions: self.run(Category::Attractions, trip).await,
            }
        };

        info!(available = ?response.available(), "Itinerary ready");
        Ok(response)
    }

    async fn run<T: ExtractionSchema>(
        &self,
        category: Category,
        trip: &TripRequest,
    ) -> ExtractionResult<T> {
        match self.catalog.query(category, trip) {
            Ok(query) => self.pipeline.run_source(&query).await,
            Err(e) => {
                warn!(%category, error = %e, "Could not build source query");
                ExtractionResult::unavailable(UnavailableReason::FetchFailed)
            }
        }
    }
}
