// Domain layer - Period tree and chart models
pub mod chart;
pub mod error;
pub mod period;
pub mod planet;
