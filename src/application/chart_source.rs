// Port for the external chart calculation service
use crate::domain::chart::{BirthData, ChartData};
use async_trait::async_trait;

#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Compute planetary positions for a birth record
    async fn calculate_chart(&self, birth: &BirthData) -> anyhow::Result<ChartData>;
}
