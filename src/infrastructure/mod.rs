// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_chart_source;
pub mod http_period_source;
pub mod http_response;
