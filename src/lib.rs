//! # Wayfarer - Travel Itinerary Builder
//!
//! Wayfarer builds a travel itinerary by scraping a handful of public travel
//! sites and asking an LLM to turn each page into structured data. Every
//! source category is independent: one site being down or changing its
//! layout only empties its own section of the itinerary.
//!
//! ## Features
//!
//! - Page fetching restricted to a CSS selector subtree (spider or reqwest)
//! - Soft-404 detection through per-site marker text
//! - Structured extraction with rig-core, validated against typed schemas
//! - Token-estimated chunking for large pages
//! - Client-side rate limiting of LLM requests
//! - Sequential or concurrent fan-out over the source categories
//!
//! ## Example
//!
//! ```rust,no_run
//! # #![recursion_limit = "256"]
//! use chrono::NaiveDate;
//! use wayfarer::config::AppConfig;
//! use wayfarer::extract::RigExtractionService;
//! use wayfarer::fetch::Fetcher;
//! use wayfarer::itinerary::{Aggregator, TripRequest};
//! use wayfarer::model::Client;
//! use wayfarer::pipeline::SourcePipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let fetcher = Fetcher::from_config(config.fetch.clone())?;
//!     let client = Client::new_gemini(&config.gemini_api_key, &config.model);
//!     let service = RigExtractionService::new(client);
//!
//!     let pipeline = SourcePipeline::new(fetcher, service, config.pipeline.chunk_token_threshold);
//!     let aggregator = Aggregator::new(pipeline, config.sources.clone());
//!
//!     let trip = TripRequest {
//!         destination: "Carson City".to_string(),
//!         origin: "Washington DC".to_string(),
//!         party_size: 2,
//!         stay_start: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
//!         stay_end: NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
//!         room_count: 1,
//!         purpose: "sightseeing".to_string(),
//!     };
//!
//!     let itinerary = aggregator.build_itinerary(&trip).await?;
//!     println!("{}", serde_json::to_string_pretty(&itinerary)?);
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod config;
pub mod existence;
pub mod extract;
pub mod fetch;
pub mod itinerary;
pub mod pipeline;
pub mod sources;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use error::Result;

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::extract::{ExtractionResult, UnavailableReason};
    pub use crate::itinerary::{Aggregator, ItineraryResponse, TripRequest};
    pub use crate::pipeline::SourcePipeline;
}
