// Timeline controller - top-level load state machine and toggle orchestration
use crate::application::expansion_cache::{ExpansionCache, FetchCompletion, ToggleStep};
use crate::application::period_source::{fetch_children, PeriodSource};
use crate::application::timeline_observer::TimelineObserver;
use crate::application::tree_renderer::{render_tree, RenderedNode};
use crate::domain::chart::{BirthDate, ChartData, DashaContext};
use crate::domain::error::DashaError;
use crate::domain::period::{DashaLevel, PeriodId, PeriodNode};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TimelinePhase {
    /// No Moon position yet, nothing to fetch
    #[default]
    Idle,
    Loading,
    Ready,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    #[serde(flatten)]
    pub phase: TimelinePhase,
    pub periods: Vec<RenderedNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Collapsed,
    /// Re-expanded from the cache without a fetch
    Expanded,
    /// Expanded for the first time with freshly fetched children
    Fetched,
    Terminal,
    InFlight,
    /// The tree was replaced while the fetch was outstanding
    Stale,
    UnknownNode,
}

#[derive(Default)]
struct TimelineState {
    load_token: u64,
    context: Option<DashaContext>,
    phase: TimelinePhase,
    roots: Vec<PeriodNode>,
    cache: ExpansionCache,
}

pub struct TimelineController {
    source: Arc<dyn PeriodSource>,
    observer: Arc<dyn TimelineObserver>,
    state: Mutex<TimelineState>,
}

impl TimelineController {
    pub fn new(source: Arc<dyn PeriodSource>, observer: Arc<dyn TimelineObserver>) -> Self {
        Self {
            source,
            observer,
            state: Mutex::new(TimelineState::default()),
        }
    }

    /// React to new birth/chart data. Fetches the Mahadashas when the Moon
    /// position is available and differs from the one already loaded.
    pub async fn load(&self, birth: BirthDate, chart: &ChartData) {
        let Some(ctx) = DashaContext::from_chart(birth, chart) else {
            let mut state = self.lock();
            state.load_token += 1;
            self.discard_tree(&mut state);
            state.context = None;
            state.phase = TimelinePhase::Idle;
            tracing::debug!("Moon position unavailable, timeline idle");
            return;
        };

        let token = {
            let mut state = self.lock();
            let unchanged = state.context.as_ref() == Some(&ctx)
                && matches!(state.phase, TimelinePhase::Ready | TimelinePhase::Loading);
            if unchanged {
                tracing::debug!("Moon position unchanged, keeping current timeline");
                return;
            }
            state.load_token += 1;
            self.discard_tree(&mut state);
            state.context = Some(ctx.clone());
            state.phase = TimelinePhase::Loading;
            state.load_token
        };

        self.observer.fetch_started(DashaLevel::Mahadasha, None);
        let result = self.source.fetch_mahadashas(&ctx).await;

        let mut state = self.lock();
        if state.load_token != token {
            self.observer.stale_result(DashaLevel::Mahadasha, None);
            return;
        }

        match result {
            Ok(roots) => {
                self.observer
                    .fetch_succeeded(DashaLevel::Mahadasha, None, roots.len());
                self.discard_tree(&mut state);
                state.roots = roots;
                state.phase = TimelinePhase::Ready;
            }
            Err(e) => {
                self.observer.fetch_failed(DashaLevel::Mahadasha, None, &e);
                self.discard_tree(&mut state);
                state.phase = TimelinePhase::Error {
                    message: e.to_string(),
                };
            }
        }
    }

    /// Flip a node between collapsed and expanded, fetching its children on first expand
    pub async fn toggle(&self, id: &PeriodId) -> Result<ToggleOutcome, DashaError> {
        let (node, child_level, ctx, ticket) = {
            let mut guard = self.lock();
            let state = &mut *guard;

            let Some(node) = state.cache.locate(&state.roots, id).cloned() else {
                return Ok(ToggleOutcome::UnknownNode);
            };
            let Some(child_level) = node.level.child() else {
                return Ok(ToggleOutcome::Terminal);
            };
            let Some(ctx) = state.context.clone() else {
                return Ok(ToggleOutcome::UnknownNode);
            };

            match state.cache.begin_toggle(&node) {
                ToggleStep::Collapsed => return Ok(ToggleOutcome::Collapsed),
                ToggleStep::Reexpanded => {
                    self.observer.cache_hit(id);
                    return Ok(ToggleOutcome::Expanded);
                }
                ToggleStep::Terminal => return Ok(ToggleOutcome::Terminal),
                ToggleStep::InFlight => {
                    tracing::debug!(id = id.as_str(), "Ignoring toggle while fetch is pending");
                    return Ok(ToggleOutcome::InFlight);
                }
                ToggleStep::Fetch(ticket) => {
                    self.observer.cache_miss(id);
                    (node, child_level, ctx, ticket)
                }
            }
        };

        self.observer.fetch_started(child_level, Some(id));
        let result = fetch_children(self.source.as_ref(), &ctx, &node).await;

        let completion = self.lock().cache.complete_fetch(&ticket, &result);
        match (completion, result) {
            (FetchCompletion::Stale, _) => {
                self.observer.stale_result(child_level, Some(id));
                Ok(ToggleOutcome::Stale)
            }
            (_, Ok(children)) => {
                self.observer
                    .fetch_succeeded(child_level, Some(id), children.len());
                Ok(ToggleOutcome::Fetched)
            }
            (_, Err(e)) => {
                self.observer.fetch_failed(child_level, Some(id), &e);
                Err(e)
            }
        }
    }

    /// Collapse a node; a no-op when it is not expanded
    pub fn collapse(&self, id: &PeriodId) -> bool {
        self.lock().cache.collapse(id)
    }

    pub fn view(&self) -> TimelineView {
        let state = self.lock();
        TimelineView {
            phase: state.phase.clone(),
            periods: render_tree(&state.roots, &state.cache),
        }
    }

    fn discard_tree(&self, state: &mut TimelineState) {
        let dropped = state.cache.reset();
        state.roots.clear();
        self.observer.cache_reset(dropped);
    }

    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl TimelineController {
    fn node_state(&self, id: &PeriodId) -> crate::application::expansion_cache::NodeState {
        self.lock().cache.state(id)
    }

    fn entry(&self, id: &PeriodId) -> Option<crate::application::expansion_cache::ExpansionEntry> {
        self.lock().cache.entry(id).cloned()
    }
}
