// Period node domain model - one time period at any level of the Dasha tree
use super::error::DashaError;
use super::planet::Planet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashaLevel {
    Mahadasha,
    Antardasha,
    Pratyantardasha,
}

impl DashaLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashaLevel::Mahadasha => "mahadasha",
            DashaLevel::Antardasha => "antardasha",
            DashaLevel::Pratyantardasha => "pratyantardasha",
        }
    }

    /// Number of enclosing periods above a node of this level
    pub fn depth(&self) -> usize {
        match self {
            DashaLevel::Mahadasha => 0,
            DashaLevel::Antardasha => 1,
            DashaLevel::Pratyantardasha => 2,
        }
    }

    pub fn child(&self) -> Option<DashaLevel> {
        match self {
            DashaLevel::Mahadasha => Some(DashaLevel::Antardasha),
            DashaLevel::Antardasha => Some(DashaLevel::Pratyantardasha),
            DashaLevel::Pratyantardasha => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.child().is_none()
    }
}

impl fmt::Display for DashaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashaLevel {
    type Err = DashaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mahadasha" => Ok(DashaLevel::Mahadasha),
            "antardasha" => Ok(DashaLevel::Antardasha),
            "pratyantardasha" => Ok(DashaLevel::Pratyantardasha),
            other => Err(DashaError::MalformedPeriod(format!("unknown level '{}'", other))),
        }
    }
}

/// Stable node identity, used as cache key and rendering key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(String);

impl PeriodId {
    /// Build the id from level, parent chain, planet and start date.
    /// The same logical period always yields the same id.
    pub fn derive(level: DashaLevel, lineage: &[Planet], planet: Planet, start: NaiveDate) -> Self {
        let mut id = String::from(level.as_str());
        for ancestor in lineage {
            id.push('_');
            id.push_str(ancestor.name());
        }
        id.push('_');
        id.push_str(planet.name());
        id.push('_');
        id.push_str(&start.format("%Y%m%d").to_string());
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeriodId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeriodId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Duration figures as reported by the service. Months and days are only
/// sent below the Mahadasha level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodDuration {
    pub years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<f64>,
}

impl PeriodDuration {
    pub fn new(years: f64, months: Option<f64>, days: Option<f64>) -> Self {
        Self { years, months, days }
    }

    /// Years first, then months, then days. A unit the service did not
    /// report is skipped, and fractional years are shown when nothing finer exists.
    pub fn label(&self) -> String {
        if self.years >= 1.0 {
            return format!("{} years", self.years);
        }
        match (self.months, self.days) {
            (Some(months), _) if months >= 1.0 => format!("{} months", months),
            (_, Some(days)) => format!("{} days", days),
            (Some(months), None) => format!("{} months", months),
            (None, None) => format!("{} years", self.years),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodNode {
    pub id: PeriodId,
    pub level: DashaLevel,
    pub planet: Planet,
    /// Rulers of the enclosing periods, outermost first
    pub lineage: Vec<Planet>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: PeriodDuration,
}

impl PeriodNode {
    pub fn parent_planet(&self) -> Option<Planet> {
        self.lineage.last().copied()
    }

    /// Parent chain as the service spells it, e.g. "Mercury-Venus"
    pub fn parent_label(&self) -> Option<String> {
        if self.lineage.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.lineage.iter().map(|p| p.name()).collect();
        Some(names.join("-"))
    }

    /// Map one raw period from a response scoped to `lineage`
    pub fn from_raw(
        raw: RawPeriod,
        expected: DashaLevel,
        lineage: &[Planet],
    ) -> Result<Self, DashaError> {
        let planet_name = required(raw.planet, "planet")?;
        let planet = planet_name
            .parse::<Planet>()
            .map_err(|e| DashaError::MalformedPeriod(e.to_string()))?;

        let level: DashaLevel = required(raw.level, "level")?.parse()?;
        if level != expected {
            return Err(DashaError::MalformedPeriod(format!(
                "{} period returned where {} was requested",
                level, expected
            )));
        }
        if lineage.len() != expected.depth() {
            return Err(DashaError::MalformedPeriod(format!(
                "{} period needs {} ancestors, got {}",
                expected,
                expected.depth(),
                lineage.len()
            )));
        }

        // Children must belong to exactly the period they were requested for
        if let (Some(parent), Some(expected_parent)) = (raw.parent.as_deref(), lineage.last()) {
            let direct = parent.rsplit('-').next().unwrap_or(parent).trim();
            if direct != expected_parent.name() {
                return Err(DashaError::MalformedPeriod(format!(
                    "{} period belongs to '{}', expected {}",
                    planet, parent, expected_parent
                )));
            }
        }

        let start_date = parse_date(required(raw.start_date, "start_date")?, "start_date")?;
        let end_date = parse_date(required(raw.end_date, "end_date")?, "end_date")?;
        let years = required(raw.years, "years")?;

        Ok(Self {
            id: PeriodId::derive(level, lineage, planet, start_date),
            level,
            planet,
            lineage: lineage.to_vec(),
            start_date,
            end_date,
            duration: PeriodDuration::new(years, raw.months, raw.days),
        })
    }
}

/// A period exactly as it appears on the wire, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPeriod {
    pub planet: Option<String>,
    pub parent: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub years: Option<f64>,
    pub months: Option<f64>,
    pub days: Option<f64>,
    pub level: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, DashaError> {
    value.ok_or_else(|| DashaError::MalformedPeriod(format!("missing field `{}`", field)))
}

fn parse_date(value: String, field: &str) -> Result<NaiveDate, DashaError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DashaError::MalformedPeriod(format!("invalid `{}` '{}': {}", field, value, e))
    })
}

/// Map a response batch, keeping the valid subset.
/// Fails only when a non-empty batch contains no valid period at all.
pub fn unpack_periods(
    values: Vec<serde_json::Value>,
    expected: DashaLevel,
    lineage: &[Planet],
) -> Result<Vec<PeriodNode>, DashaError> {
    let total = values.len();
    let mut nodes = Vec::with_capacity(total);
    let mut last_error = None;

    for (index, value) in values.into_iter().enumerate() {
        let mapped = serde_json::from_value::<RawPeriod>(value)
            .map_err(|e| DashaError::MalformedPeriod(e.to_string()))
            .and_then(|raw| PeriodNode::from_raw(raw, expected, lineage));

        match mapped {
            Ok(node) => nodes.push(node),
            Err(e) => {
                tracing::warn!(level = %expected, index, error = %e, "Skipping malformed period");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if nodes.is_empty() => Err(e),
        _ => {
            if nodes.len() < total {
                tracing::warn!(
                    level = %expected,
                    accepted = nodes.len(),
                    rejected = total - nodes.len(),
                    "Accepted partial period batch"
                );
            }
            Ok(nodes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_level_parsing_ignores_case() {
        assert_eq!("Mahadasha".parse::<DashaLevel>(), Ok(DashaLevel::Mahadasha));
        assert_eq!("antardasha".parse::<DashaLevel>(), Ok(DashaLevel::Antardasha));
        assert_eq!("PRATYANTARDASHA".parse::<DashaLevel>(), Ok(DashaLevel::Pratyantardasha));
        assert!("sookshma".parse::<DashaLevel>().is_err());
    }

    #[test]
    fn test_level_hierarchy() {
        assert_eq!(DashaLevel::Mahadasha.child(), Some(DashaLevel::Antardasha));
        assert_eq!(DashaLevel::Antardasha.child(), Some(DashaLevel::Pratyantardasha));
        assert!(DashaLevel::Pratyantardasha.is_terminal());
        assert!(!DashaLevel::Mahadasha.is_terminal());
    }

    #[test]
    fn test_duration_label_priority() {
        assert_eq!(PeriodDuration::new(0.12, Some(0.0), Some(45.0)).label(), "45 days");
        assert_eq!(PeriodDuration::new(0.3, Some(3.0), Some(10.0)).label(), "3 months");
        assert_eq!(PeriodDuration::new(2.0, Some(6.0), Some(0.0)).label(), "2 years");
        assert_eq!(PeriodDuration::new(16.234, None, None).label(), "16.234 years");
        assert_eq!(PeriodDuration::new(0.9, Some(10.8), None).label(), "10.8 months");
        assert_eq!(PeriodDuration::new(0.05, Some(0.6), None).label(), "0.6 months");
    }

    #[test]
    fn test_short_mahadasha_keeps_reported_years() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "planet": "Mercury",
            "start_date": "2000-06-16",
            "end_date": "2001-01-12",
            "years": 0.57,
            "level": "mahadasha"
        }))
        .unwrap();

        let node = PeriodNode::from_raw(raw, DashaLevel::Mahadasha, &[]).unwrap();
        assert_eq!(node.duration, PeriodDuration::new(0.57, None, None));
        assert_eq!(node.duration.label(), "0.57 years");
    }

    #[test]
    fn test_id_is_derived_from_lineage_and_start() {
        let id = PeriodId::derive(
            DashaLevel::Pratyantardasha,
            &[Planet::Mercury, Planet::Venus],
            Planet::Sun,
            date("2010-01-01"),
        );
        assert_eq!(id.as_str(), "pratyantardasha_Mercury_Venus_Sun_20100101");
    }

    #[test]
    fn test_from_raw_mahadasha_without_months_or_days() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "id": "maha_Mercury_20000616",
            "planet": "Mercury",
            "start_date": "2000-06-16",
            "end_date": "2012-03-02",
            "years": 11.71,
            "level": "mahadasha"
        }))
        .unwrap();

        let node = PeriodNode::from_raw(raw, DashaLevel::Mahadasha, &[]).unwrap();
        assert_eq!(node.planet, Planet::Mercury);
        assert_eq!(node.parent_planet(), None);
        assert_eq!(node.start_date, date("2000-06-16"));
        assert_eq!(node.end_date, date("2012-03-02"));
        assert_eq!(node.duration, PeriodDuration::new(11.71, None, None));
        assert_eq!(node.id.as_str(), "mahadasha_Mercury_20000616");
    }

    #[test]
    fn test_from_raw_reports_missing_field() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "planet": "Venus",
            "end_date": "2030-01-01",
            "years": 20,
            "level": "mahadasha"
        }))
        .unwrap();

        let err = PeriodNode::from_raw(raw, DashaLevel::Mahadasha, &[]).unwrap_err();
        assert_eq!(err, DashaError::MalformedPeriod("missing field `start_date`".to_string()));
    }

    #[test]
    fn test_from_raw_rejects_foreign_parent() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "planet": "Sun",
            "parent": "Mercury-Moon",
            "start_date": "2010-01-01",
            "end_date": "2010-02-01",
            "years": 0.08,
            "level": "pratyantardasha"
        }))
        .unwrap();

        let result = PeriodNode::from_raw(
            raw,
            DashaLevel::Pratyantardasha,
            &[Planet::Mercury, Planet::Venus],
        );
        assert!(matches!(result, Err(DashaError::MalformedPeriod(_))));
    }

    #[test]
    fn test_from_raw_accepts_compound_parent() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "planet": "Sun",
            "parent": "Mercury-Venus",
            "start_date": "2010-01-01",
            "end_date": "2010-02-01",
            "years": 0.08,
            "months": 0.97,
            "days": 30.0,
            "level": "pratyantardasha"
        }))
        .unwrap();

        let node = PeriodNode::from_raw(
            raw,
            DashaLevel::Pratyantardasha,
            &[Planet::Mercury, Planet::Venus],
        )
        .unwrap();
        assert_eq!(node.parent_planet(), Some(Planet::Venus));
        assert_eq!(node.parent_label().as_deref(), Some("Mercury-Venus"));
        assert_eq!(node.duration.label(), "30 days");
    }

    #[test]
    fn test_from_raw_rejects_level_mismatch() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "planet": "Sun",
            "start_date": "2010-01-01",
            "end_date": "2016-01-01",
            "years": 6,
            "level": "mahadasha"
        }))
        .unwrap();

        let result = PeriodNode::from_raw(raw, DashaLevel::Antardasha, &[Planet::Sun]);
        assert!(matches!(result, Err(DashaError::MalformedPeriod(_))));
    }

    #[test]
    fn test_unpack_keeps_valid_subset() {
        let values = vec![
            json!({"planet": "Venus", "parent": "Venus", "start_date": "2001-01-01",
                   "end_date": "2004-05-01", "years": 3.33, "level": "antardasha"}),
            json!({"planet": "Sun", "parent": "Venus", "end_date": "2005-05-01",
                   "years": 1.0, "level": "antardasha"}),
            json!({"planet": "Moon", "parent": "Venus", "start_date": "2005-05-01",
                   "end_date": "2007-01-01", "years": 1.67, "level": "antardasha"}),
        ];

        let nodes = unpack_periods(values, DashaLevel::Antardasha, &[Planet::Venus]).unwrap();
        let planets: Vec<Planet> = nodes.iter().map(|n| n.planet).collect();
        assert_eq!(planets, vec![Planet::Venus, Planet::Moon]);
    }

    #[test]
    fn test_unpack_fails_when_nothing_is_valid() {
        let values = vec![json!({"planet": 7}), json!("garbage")];
        let result = unpack_periods(values, DashaLevel::Mahadasha, &[]);
        assert!(matches!(result, Err(DashaError::MalformedPeriod(_))));
    }

    #[test]
    fn test_unpack_empty_batch_is_ok() {
        let nodes = unpack_periods(Vec::new(), DashaLevel::Mahadasha, &[]).unwrap();
        assert!(nodes.is_empty());
    }
}
