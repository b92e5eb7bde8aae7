// Chart service - Use case for calculating a chart and refreshing the timeline
use crate::application::chart_source::ChartSource;
use crate::application::timeline_controller::TimelineController;
use crate::domain::chart::{BirthData, ChartData};
use crate::domain::planet::{color_for_name, Planet};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetSummary {
    pub name: String,
    pub sign: Option<String>,
    pub degree_in_sign: Option<f64>,
    pub nakshatra: Option<String>,
    pub pada: Option<u8>,
    pub dignity: Option<String>,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub ascendant: Option<f64>,
    pub planets: Vec<PlanetSummary>,
}

impl ChartSummary {
    /// Classical bodies first in table order, anything else after by name
    pub fn from_chart(chart: &ChartData) -> Self {
        let rank = |name: &str| {
            Planet::ALL
                .iter()
                .position(|p| p.name() == name)
                .unwrap_or(Planet::ALL.len())
        };

        let mut planets: Vec<PlanetSummary> = chart
            .planets
            .iter()
            .map(|(name, position)| PlanetSummary {
                name: name.clone(),
                sign: position.sign.clone(),
                degree_in_sign: position.degree_in_sign,
                nakshatra: position.nakshatra.clone(),
                pada: position.pada,
                dignity: position.dignity.clone(),
                color: color_for_name(name),
            })
            .collect();
        planets.sort_by(|a, b| rank(&a.name).cmp(&rank(&b.name)).then_with(|| a.name.cmp(&b.name)));

        Self {
            ascendant: chart.ascendant,
            planets,
        }
    }
}

#[derive(Clone)]
pub struct ChartService {
    chart_source: Arc<dyn ChartSource>,
    timeline: Arc<TimelineController>,
}

impl ChartService {
    pub fn new(chart_source: Arc<dyn ChartSource>, timeline: Arc<TimelineController>) -> Self {
        Self {
            chart_source,
            timeline,
        }
    }

    pub async fn calculate(&self, birth: &BirthData) -> anyhow::Result<ChartSummary> {
        let chart = self
            .chart_source
            .calculate_chart(birth)
            .await
            .context("Failed to calculate chart")?;

        self.timeline.load(birth.birth_date(), &chart).await;

        Ok(ChartSummary::from_chart(&chart))
    }
}
