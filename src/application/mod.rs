// Application layer - Use cases and ports
pub mod chart_service;
pub mod chart_source;
pub mod expansion_cache;
pub mod period_source;
pub mod timeline_controller;
pub mod timeline_observer;
pub mod tree_renderer;

#[cfg(test)]
pub mod test_support;
