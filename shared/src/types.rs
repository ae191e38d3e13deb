//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Opaque farmer identity issued by the identity provider.
///
/// The platform never interprets the value; it is only compared and stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmerId(String);

impl FarmerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FarmerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// City used when a free-text region has no known mapping
pub const FALLBACK_WEATHER_CITY: &str = "Mumbai,IN";

/// Farming regions. Only used for the weather lookup, never for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "north",
            Region::South => "south",
            Region::East => "east",
            Region::West => "west",
        }
    }

    /// City queried at the weather provider for this region
    pub fn weather_city(&self) -> &'static str {
        match self {
            Region::North => "Delhi,IN",
            Region::South => "Chennai,IN",
            Region::East => "Kolkata,IN",
            Region::West => "Mumbai,IN",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" => Ok(Region::North),
            "south" => Ok(Region::South),
            "east" => Ok(Region::East),
            "west" => Ok(Region::West),
            _ => Err(ValidationError::new(
                "region",
                "must be one of: north, south, east, west",
            )),
        }
    }
}

/// Resolve the weather city for a free-text region such as a profile field.
pub fn weather_city_for(region: &str) -> &'static str {
    region
        .parse::<Region>()
        .map(|r| r.weather_city())
        .unwrap_or(FALLBACK_WEATHER_CITY)
}

/// Pagination-style bound on history queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub limit: u32,
}

impl HistoryWindow {
    pub const MAX_LIMIT: u32 = 365;

    /// Cap a requested limit at `MAX_LIMIT`. A limit of 0 is an empty window.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.min(Self::MAX_LIMIT),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self { limit: 12 }
    }
}
