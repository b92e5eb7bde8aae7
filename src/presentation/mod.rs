// Presentation layer - HTTP surface for the host view
pub mod app_state;
pub mod handlers;
