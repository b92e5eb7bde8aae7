// Port for the remote Dasha service - one round trip per call, no retries
use crate::domain::chart::DashaContext;
use crate::domain::error::DashaError;
use crate::domain::period::{DashaLevel, PeriodNode};
use crate::domain::planet::Planet;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Scope of an Antardasha request
#[derive(Debug, Clone, PartialEq)]
pub struct AntardashaQuery {
    pub mahadasha_planet: Planet,
    pub start_date: NaiveDate,
    pub mahadasha_years: f64,
}

impl AntardashaQuery {
    pub fn for_mahadasha(node: &PeriodNode) -> Self {
        Self {
            mahadasha_planet: node.planet,
            start_date: node.start_date,
            mahadasha_years: node.duration.years,
        }
    }
}

/// Scope of a Pratyantardasha request
#[derive(Debug, Clone, PartialEq)]
pub struct PratyantardashaQuery {
    pub mahadasha_planet: Planet,
    pub antardasha_planet: Planet,
    pub start_date: NaiveDate,
    pub antardasha_years: f64,
}

impl PratyantardashaQuery {
    pub fn for_antardasha(node: &PeriodNode) -> Result<Self, DashaError> {
        let mahadasha_planet = node.parent_planet().ok_or_else(|| {
            DashaError::MalformedPeriod(format!("antardasha {} has no parent period", node.id))
        })?;
        Ok(Self {
            mahadasha_planet,
            antardasha_planet: node.planet,
            start_date: node.start_date,
            antardasha_years: node.duration.years,
        })
    }
}

#[async_trait]
pub trait PeriodSource: Send + Sync {
    /// Top-level periods, in the order the service returns them
    async fn fetch_mahadashas(&self, ctx: &DashaContext) -> Result<Vec<PeriodNode>, DashaError>;

    async fn fetch_antardashas(
        &self,
        ctx: &DashaContext,
        query: &AntardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError>;

    async fn fetch_pratyantardashas(
        &self,
        ctx: &DashaContext,
        query: &PratyantardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError>;
}

/// Fetch the sub-periods of `parent` with the level-appropriate call.
/// Returns an empty list for terminal periods without touching the source.
pub async fn fetch_children(
    source: &dyn PeriodSource,
    ctx: &DashaContext,
    parent: &PeriodNode,
) -> Result<Vec<PeriodNode>, DashaError> {
    match parent.level {
        DashaLevel::Mahadasha => {
            source
                .fetch_antardashas(ctx, &AntardashaQuery::for_mahadasha(parent))
                .await
        }
        DashaLevel::Antardasha => {
            let query = PratyantardashaQuery::for_antardasha(parent)?;
            source.fetch_pratyantardashas(ctx, &query).await
        }
        DashaLevel::Pratyantardasha => Ok(Vec::new()),
    }
}
