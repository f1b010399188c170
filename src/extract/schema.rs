//! Extraction schemas
//!
//! One canonical schema per source category. The JSON schema handed to the
//! extraction service is derived from these types with `schemars`, and the
//! service's answer is deserialised back into them, so field presence and
//! types are enforced by serde. [`ExtractionSchema::validate`] adds the value
//! checks serde cannot express.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::extract::error::ExtractError;

/// Literal used by the summary instruction for topics the article does not cover
pub const LITTLE_INFORMATION: &str = "Little information.";

/// A type the extraction service can be asked to produce
pub trait ExtractionSchema:
    JsonSchema + for<'a> Deserialize<'a> + Serialize + Clone + Send + Sync + 'static
{
    /// Name used in logs and error messages
    const NAME: &'static str;

    /// Check the values serde cannot check
    fn validate(&self) -> Result<(), ExtractError>;

    /// Combine the results of two content chunks
    fn merge(self, other: Self) -> Self;

    /// Whether the value carries no usable data
    fn is_empty(&self) -> bool {
        false
    }

    /// Keep at most `max` entries
    fn truncate(&mut self, _max: usize) {}
}

fn require(schema: &str, field: &str, value: &str) -> Result<(), ExtractError> {
    if value.trim().is_empty() {
        return Err(ExtractError::Invalid(format!(
            "{} has a blank '{}'",
            schema, field
        )));
    }
    Ok(())
}

/// Destination overview from the travel wiki
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub history: String,
    pub transportation: String,
    pub things_to_do: String,
    pub food: String,
    pub hotels: String,
}

impl Summary {
    fn fields(&self) -> [(&'static str, &String); 5] {
        [
            ("history", &self.history),
            ("transportation", &self.transportation),
            ("things_to_do", &self.things_to_do),
            ("food", &self.food),
            ("hotels", &self.hotels),
        ]
    }
}

/// Prefer whichever topic summary actually says something
fn informative(current: String, next: String) -> String {
    let current_is_filler = current.trim().is_empty() || current.trim() == LITTLE_INFORMATION;
    let next_is_filler = next.trim().is_empty() || next.trim() == LITTLE_INFORMATION;
    match (current_is_filler, next_is_filler) {
        (true, false) => next,
        (false, false) if current.trim() != next.trim() => {
            format!("{} {}", current.trim_end(), next.trim_start())
        }
        _ => current,
    }
}

impl ExtractionSchema for Summary {
    const NAME: &'static str = "summary";

    fn validate(&self) -> Result<(), ExtractError> {
        for (field, value) in self.fields() {
            require(Self::NAME, field, value)?;
        }
        Ok(())
    }

    fn merge(self, other: Self) -> Self {
        Self {
            history: informative(self.history, other.history),
            transportation: informative(self.transportation, other.transportation),
            things_to_do: informative(self.things_to_do, other.things_to_do),
            food: informative(self.food, other.food),
            hotels: informative(self.hotels, other.hotels),
        }
    }

    fn is_empty(&self) -> bool {
        self.fields()
            .iter()
            .all(|(_, value)| value.trim() == LITTLE_INFORMATION)
    }
}

/// A local event listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    pub name: String,
    pub time: String,
    pub area: String,
    /// Whether the event suits the traveller's purpose
    pub relevant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventList {
    pub events: Vec<Event>,
}

/// One way of getting from the origin to the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TravelPath {
    /// Modes of transport, e.g. "Fly, train"
    pub methods: String,
    pub time: String,
    pub price_range: String,
    pub relevant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TravelPathList {
    pub paths: Vec<TravelPath>,
}

/// A hotel search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hotel {
    pub name: String,
    /// Guest review score out of 10
    pub review_score: f32,
    pub total_price: String,
    pub per_night_price: String,
    /// Distance from downtown
    pub distance: String,
    pub extra_info: String,
    pub relevant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HotelList {
    pub hotels: Vec<Hotel>,
}

/// A sight worth visiting at the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attraction {
    pub name: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttractionList {
    pub attractions: Vec<Attraction>,
}

macro_rules! list_schema {
    ($list:ty, $field:ident, $name:literal, |$item:ident| $check:block) => {
        impl ExtractionSchema for $list {
            const NAME: &'static str = $name;

            fn validate(&self) -> Result<(), ExtractError> {
                for $item in &self.$field $check
                Ok(())
            }

            fn merge(mut self, other: Self) -> Self {
                self.$field.extend(other.$field);
                self
            }

            fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            fn truncate(&mut self, max: usize) {
                self.$field.truncate(max);
            }
        }
    };
}

list_schema!(EventList, events, "events", |event| {
    require("event", "name", &event.name)?;
});

list_schema!(TravelPathList, paths, "routes", |path| {
    require("route", "methods", &path.methods)?;
});

list_schema!(HotelList, hotels, "hotels", |hotel| {
    require("hotel", "name", &hotel.name)?;
    if !hotel.review_score.is_finite() || !(0.0..=10.0).contains(&hotel.review_score) {
        return Err(ExtractError::Invalid(format!(
            "hotel '{}' has review score {} outside 0-10",
            hotel.name, hotel.review_score
        )));
    }
});

list_schema!(AttractionList, attractions, "attractions", |attraction| {
    require("attraction", "name", &attraction.name)?;
    require("attraction", "description", &attraction.description)?;
});
