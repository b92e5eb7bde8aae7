// HTTP implementation of the period source against the Dasha service
use crate::application::period_source::{AntardashaQuery, PeriodSource, PratyantardashaQuery};
use crate::domain::chart::{BirthDate, DashaContext};
use crate::domain::error::DashaError;
use crate::domain::period::{unpack_periods, DashaLevel, PeriodNode, DATE_FORMAT};
use crate::domain::planet::Planet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpPeriodSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MahadashaRequest<'a> {
    birth_data: &'a BirthDate,
    moon_nakshatra_degree: f64,
    moon_nakshatra: &'a str,
}

#[derive(Debug, Serialize)]
struct AntardashaRequest<'a> {
    #[serde(flatten)]
    anchor: MahadashaRequest<'a>,
    mahadasha_planet: Planet,
    start_date: String,
    mahadasha_years: f64,
}

#[derive(Debug, Serialize)]
struct PratyantardashaRequest<'a> {
    #[serde(flatten)]
    anchor: MahadashaRequest<'a>,
    mahadasha_planet: Planet,
    antardasha_planet: Planet,
    start_date: String,
    antardasha_years: f64,
}

/// Either `{ "<key>": [...] }` or `{ "error": "..." }`
#[derive(Debug, Deserialize)]
struct PeriodEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    lists: serde_json::Map<String, serde_json::Value>,
}

impl HttpPeriodSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
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

    fn anchor<'a>(ctx: &'a DashaContext) -> MahadashaRequest<'a> {
        MahadashaRequest {
            birth_data: &ctx.birth,
            moon_nakshatra_degree: ctx.moon.degree_in_nakshatra,
            moon_nakshatra: &ctx.moon.nakshatra,
        }
    }

    async fn post_periods<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        list_key: &str,
    ) -> Result<Vec<serde_json::Value>, DashaError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope = serde_json::from_str::<PeriodEnvelope>(&text);
        if let Ok(PeriodEnvelope { error: Some(error), .. }) = &envelope {
            return Err(DashaError::Service(error.clone()));
        }
        if !status.is_success() {
            return Err(DashaError::Service(format!(
                "{} returned {}: {}",
                path,
                status,
                text.trim()
            )));
        }

        let mut envelope = envelope
            .map_err(|e| DashaError::Service(format!("unreadable response from {}: {}", path, e)))?;
        match envelope.lists.remove(list_key) {
            Some(serde_json::Value::Array(values)) => Ok(values),
            Some(_) => Err(DashaError::MalformedPeriod(format!("`{}` is not a list", list_key))),
            None => Err(DashaError::MalformedPeriod(format!("response has no `{}` list", list_key))),
        }
    }
}

#[async_trait]
impl PeriodSource for HttpPeriodSource {
    async fn fetch_mahadashas(&self, ctx: &DashaContext) -> Result<Vec<PeriodNode>, DashaError> {
        let body = Self::anchor(ctx);
        let values = self
            .post_periods("/api/dashas/mahadashas", &body, "mahadashas")
            .await?;
        unpack_periods(values, DashaLevel::Mahadasha, &[])
    }

    async fn fetch_antardashas(
        &self,
        ctx: &DashaContext,
        query: &AntardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError> {
        let body = AntardashaRequest {
            anchor: Self::anchor(ctx),
            mahadasha_planet: query.mahadasha_planet,
            start_date: query.start_date.format(DATE_FORMAT).to_string(),
            mahadasha_years: query.mahadasha_years,
        };
        let values = self
            .post_periods("/api/dashas/antardashas", &body, "antardashas")
            .await?;
        unpack_periods(values, DashaLevel::Antardasha, &[query.mahadasha_planet])
    }

    async fn fetch_pratyantardashas(
        &self,
        ctx: &DashaContext,
        query: &PratyantardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError> {
        let body = PratyantardashaRequest {
            anchor: Self::anchor(ctx),
            mahadasha_planet: query.mahadasha_planet,
            antardasha_planet: query.antardasha_planet,
            start_date: query.start_date.format(DATE_FORMAT).to_string(),
            antardasha_years: query.antardasha_years,
        };
        let values = self
            .post_periods("/api/dashas/pratyantardashas", &body, "pratyantardashas")
            .await?;
        unpack_periods(
            values,
            DashaLevel::Pratyantardasha,
            &[query.mahadasha_planet, query.antardasha_planet],
        )
    }
}
