// HTTP request handlers
use crate::application::chart_service::ChartSummary;
use crate::application::timeline_controller::{TimelineView, ToggleOutcome};
use crate::application::tree_renderer::render_outline;
use crate::domain::chart::{BirthData, BirthDate, ChartData};
use crate::domain::period::PeriodId;
use crate::infrastructure::http_response::{accepts_brotli, json_response, text_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct ChartReply {
    chart: ChartSummary,
    timeline: TimelineView,
}

#[derive(Serialize)]
struct ErrorReply {
    error: String,
}

/// Birth date plus an already computed chart, for hosts that own chart calculation
#[derive(Deserialize)]
pub struct TimelineRequest {
    pub birth_data: BirthDate,
    pub chart: ChartData,
}

#[derive(Serialize)]
struct ToggleReply {
    outcome: Option<ToggleOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timeline: TimelineView,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Calculate a chart for the submitted birth record and reload the timeline
pub async fn submit_chart(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(birth): Json<BirthData>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let result = match state.chart_service.calculate(&birth).await {
        Ok(chart) => {
            let reply = ChartReply {
                chart,
                timeline: state.timeline.view(),
            };
            json_response(StatusCode::OK, &reply, compress).await
        }
        Err(e) => {
            tracing::error!("Error calculating chart: {:#}", e);
            let reply = ErrorReply {
                error: format!("{:#}", e),
            };
            json_response(StatusCode::BAD_GATEWAY, &reply, compress).await
        }
    };
    into_response(result)
}

/// Load the timeline from a chart the host already holds
pub async fn load_timeline(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<TimelineRequest>,
) -> Response {
    state.timeline.load(request.birth_data, &request.chart).await;
    into_response(json_response(StatusCode::OK, &state.timeline.view(), accepts_brotli(&headers)).await)
}

pub async fn get_timeline(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    into_response(json_response(StatusCode::OK, &state.timeline.view(), accepts_brotli(&headers)).await)
}

/// Indented plain-text rendering of the visible tree
pub async fn get_outline(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let outline = render_outline(&state.timeline.view().periods);
    into_response(text_response(StatusCode::OK, outline, accepts_brotli(&headers)).await)
}

pub async fn toggle_node(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);
    let id = PeriodId::from(id);

    let (status, reply) = match state.timeline.toggle(&id).await {
        Ok(ToggleOutcome::UnknownNode) => (
            StatusCode::NOT_FOUND,
            ToggleReply {
                outcome: Some(ToggleOutcome::UnknownNode),
                error: Some(format!("no visible period with id {}", id)),
                timeline: state.timeline.view(),
            },
        ),
        Ok(outcome) => (
            StatusCode::OK,
            ToggleReply {
                outcome: Some(outcome),
                error: None,
                timeline: state.timeline.view(),
            },
        ),
        Err(e) => {
            tracing::warn!(period = %id, "Expansion failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                ToggleReply {
                    outcome: None,
                    error: Some(e.to_string()),
                    timeline: state.timeline.view(),
                },
            )
        }
    };

    into_response(json_response(status, &reply, compress).await)
}

pub async fn collapse_node(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let id = PeriodId::from(id);
    let collapsed = state.timeline.collapse(&id);
    tracing::debug!(period = %id, collapsed, "Collapse requested");

    let reply = ToggleReply {
        outcome: collapsed.then_some(ToggleOutcome::Collapsed),
        error: None,
        timeline: state.timeline.view(),
    };
    into_response(json_response(StatusCode::OK, &reply, accepts_brotli(&headers)).await)
}
