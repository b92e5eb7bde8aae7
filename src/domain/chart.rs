// Birth data and chart domain models (produced by the external chart service)
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar birth date, the only part of the birth record the Dasha service needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Full birth record as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub mins: u32,
    pub secs: u32,
    pub lat: f64,
    pub lon: f64,
    pub tzoffset: f64,
    /// House system code, e.g. "W" for whole sign
    pub hsys: String,
}

impl BirthData {
    pub fn birth_date(&self) -> BirthDate {
        BirthDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanetPosition {
    #[serde(default)]
    pub degree: Option<f64>,
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(default)]
    pub degree_in_sign: Option<f64>,
    #[serde(default)]
    pub nakshatra: Option<String>,
    #[serde(default)]
    pub degree_in_nak: Option<f64>,
    #[serde(default)]
    pub pada: Option<u8>,
    #[serde(default)]
    pub dignity: Option<String>,
    #[serde(default)]
    pub strength_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub ascendant: Option<f64>,
    #[serde(default)]
    pub planets: BTreeMap<String, PlanetPosition>,
}

/// Moon anchor of the Dasha sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoonPosition {
    pub nakshatra: String,
    pub degree_in_nakshatra: f64,
}

impl ChartData {
    /// Present only when both the Moon's nakshatra and its degree within it are known
    pub fn moon_position(&self) -> Option<MoonPosition> {
        let moon = self.planets.get("Moon")?;
        Some(MoonPosition {
            nakshatra: moon.nakshatra.clone()?,
            degree_in_nakshatra: moon.degree_in_nak?,
        })
    }
}

/// Everything a period request is scoped by
#[derive(Debug, Clone, PartialEq)]
pub struct DashaContext {
    pub birth: BirthDate,
    pub moon: MoonPosition,
}

impl DashaContext {
    pub fn from_chart(birth: BirthDate, chart: &ChartData) -> Option<Self> {
        chart.moon_position().map(|moon| Self { birth, moon })
    }
}
