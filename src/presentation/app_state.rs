// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::timeline_controller::TimelineController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub timeline: Arc<TimelineController>,
    pub chart_service: ChartService,
}
