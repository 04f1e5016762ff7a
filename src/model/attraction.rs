use super::Location;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point of interest that users can be rewarded for visiting.
///
/// Attractions are loaded once at startup (see [`AttractionCatalog`](crate::catalog::AttractionCatalog))
/// and never change for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Attraction {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            city: city.into(),
            state: state.into(),
            latitude,
            longitude,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// One entry of the "nearby attractions" view for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAttraction {
    pub attraction_name: String,
    pub attraction_location: Location,
    pub user_location: Location,
    pub distance_miles: f64,
    pub reward_points: u32,
}
