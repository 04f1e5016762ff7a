use super::{Attraction, VisitedLocation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked user.
///
/// # Actor Framework
/// Each registered user is owned by its own [`EntityActor`](crate::framework::EntityActor);
/// see [`impl ActorEntity for User`](crate::user_actor) for the actions it accepts.
///
/// The visit history is append-only and the reward ledger holds at most one
/// reward per attraction name. Both are only reachable through methods that keep
/// those rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub preferences: UserPreferences,
    visited_locations: Vec<VisitedLocation>,
    rewards: Vec<UserReward>,
}

/// Trip preferences. Only consumed by trip pricing, which lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub number_of_adults: u32,
    pub number_of_children: u32,
    pub trip_duration: u32,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            number_of_adults: 1,
            number_of_children: 0,
            trip_duration: 1,
        }
    }
}

/// A reward earned by visiting close enough to an attraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReward {
    pub visited_location: VisitedLocation,
    pub attraction: Attraction,
    pub reward_points: u32,
}

impl UserReward {
    pub fn new(visited_location: VisitedLocation, attraction: Attraction, reward_points: u32) -> Self {
        Self {
            visited_location,
            attraction,
            reward_points,
        }
    }
}

impl User {
    /// Creates a new User with an empty history and no rewards.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            preferences: UserPreferences::default(),
            visited_locations: Vec::new(),
            rewards: Vec::new(),
        }
    }

    pub fn visited_locations(&self) -> &[VisitedLocation] {
        &self.visited_locations
    }

    /// The user's current position: the most recent visit.
    pub fn last_visited_location(&self) -> Option<&VisitedLocation> {
        self.visited_locations.last()
    }

    pub fn add_visited_location(&mut self, visited: VisitedLocation) {
        self.visited_locations.push(visited);
    }

    pub fn rewards(&self) -> &[UserReward] {
        &self.rewards
    }

    /// Whether the ledger already holds a reward for an attraction with this name.
    pub fn has_reward_for(&self, attraction_name: &str) -> bool {
        self.rewards
            .iter()
            .any(|r| r.attraction.name == attraction_name)
    }

    /// Appends `reward` unless one for the same attraction name exists.
    ///
    /// Returns `true` if the reward was added.
    pub fn add_reward(&mut self, reward: UserReward) -> bool {
        if self.has_reward_for(&reward.attraction.name) {
            return false;
        }
        self.rewards.push(reward);
        true
    }

    /// Sum of all reward points earned so far.
    pub fn total_reward_points(&self) -> u64 {
        self.rewards.iter().map(|r| u64::from(r.reward_points)).sum()
    }
}
