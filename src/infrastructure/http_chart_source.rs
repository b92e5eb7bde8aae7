// HTTP implementation of the chart source
use crate::application::chart_source::ChartSource;
use crate::domain::chart::{BirthData, ChartData};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpChartSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    chart: ChartData,
}

impl HttpChartSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn calculate_chart(&self, birth: &BirthData) -> Result<ChartData> {
        let url = format!("{}/api/chart", self.base_url);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(birth)
            .send()
            .await
            .context("Failed to send request to chart service")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read chart service response")?;
        let parsed = serde_json::from_str::<ChartResponse>(&body);

        match parsed {
            Ok(ChartResponse { success: true, chart, .. }) if status.is_success() => {
                tracing::info!(planets = chart.planets.len(), "Chart calculated");
                Ok(chart)
            }
            Ok(ChartResponse { error: Some(error), .. }) => {
                anyhow::bail!("Chart service error: {}", error)
            }
            _ => anyhow::bail!("Chart request failed with status {}: {}", status, body.trim()),
        }
    }
}
