// Planet domain model - the nine rulers of the Vimshottari periods
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display color for anything outside the planet table
pub const NEUTRAL_COLOR: &str = "#E0E0E0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Moon,
    Mars,
    Mercury,
    Jupiter,
    Venus,
    Saturn,
    Rahu,
    Ketu,
}

impl Planet {
    pub const ALL: [Planet; 9] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mars,
        Planet::Mercury,
        Planet::Jupiter,
        Planet::Venus,
        Planet::Saturn,
        Planet::Rahu,
        Planet::Ketu,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mars => "Mars",
            Planet::Mercury => "Mercury",
            Planet::Jupiter => "Jupiter",
            Planet::Venus => "Venus",
            Planet::Saturn => "Saturn",
            Planet::Rahu => "Rahu",
            Planet::Ketu => "Ketu",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Planet::Sun => "#FDB813",
            Planet::Moon => "#C0C0C0",
            Planet::Mars => "#CD5C5C",
            Planet::Mercury => "#90EE90",
            Planet::Jupiter => "#FFD700",
            Planet::Venus => "#FFB6C1",
            Planet::Saturn => "#4682B4",
            Planet::Rahu => "#708090",
            Planet::Ketu => "#A0522D",
        }
    }
}

/// Color lookup by body name, falling back to the neutral color
pub fn color_for_name(name: &str) -> &'static str {
    name.parse::<Planet>()
        .map(|p| p.color())
        .unwrap_or(NEUTRAL_COLOR)
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown planet '{0}'")]
pub struct UnknownPlanet(pub String);

impl FromStr for Planet {
    type Err = UnknownPlanet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Planet::ALL
            .iter()
            .copied()
            .find(|p| p.name() == trimmed)
            .ok_or_else(|| UnknownPlanet(trimmed.to_string()))
    }
}
