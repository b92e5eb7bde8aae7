// Test doubles for the period source and observer
use crate::application::period_source::{AntardashaQuery, PeriodSource, PratyantardashaQuery};
use crate::application::timeline_observer::TimelineObserver;
use crate::domain::chart::{BirthDate, ChartData, DashaContext, PlanetPosition};
use crate::domain::error::DashaError;
use crate::domain::period::{DashaLevel, PeriodDuration, PeriodId, PeriodNode, DATE_FORMAT};
use crate::domain::planet::Planet;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn node(level: DashaLevel, lineage: &[Planet], planet: Planet, start: &str, years: f64) -> PeriodNode {
    let start_date = NaiveDate::parse_from_str(start, DATE_FORMAT).unwrap();
    let end_date = start_date + Duration::days((years * 365.25).round() as i64);
    PeriodNode {
        id: PeriodId::derive(level, lineage, planet, start_date),
        level,
        planet,
        lineage: lineage.to_vec(),
        start_date,
        end_date,
        duration: PeriodDuration::new(years, Some(years * 12.0), Some((years * 365.25).round())),
    }
}

pub fn mahadasha(planet: Planet, start: &str, years: f64) -> PeriodNode {
    node(DashaLevel::Mahadasha, &[], planet, start, years)
}

pub fn antardasha(maha: Planet, planet: Planet, start: &str, years: f64) -> PeriodNode {
    node(DashaLevel::Antardasha, &[maha], planet, start, years)
}

pub fn pratyantardasha(maha: Planet, antar: Planet, planet: Planet, start: &str) -> PeriodNode {
    node(DashaLevel::Pratyantardasha, &[maha, antar], planet, start, 0.1)
}

pub fn birth() -> BirthDate {
    BirthDate { year: 2000, month: 6, day: 16 }
}

pub fn chart_with_moon(nakshatra: &str, degree_in_nak: f64) -> ChartData {
    let mut chart = ChartData::default();
    chart.planets.insert(
        "Moon".to_string(),
        PlanetPosition {
            nakshatra: Some(nakshatra.to_string()),
            degree_in_nak: Some(degree_in_nak),
            ..Default::default()
        },
    );
    chart
}

pub fn context() -> DashaContext {
    DashaContext::from_chart(birth(), &chart_with_moon("Jyeshtha", 3.5)).unwrap()
}

/// Which call reached the mock, identified by the parent it was scoped to
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCall {
    Mahadashas(DashaContext),
    Antardashas(PeriodId),
    Pratyantardashas(PeriodId),
}

type Reply = Result<Vec<PeriodNode>, DashaError>;

const ROOT_KEY: &str = "root";

/// Scripted period source. Replies are keyed by parent id; unscripted parents get an empty list.
#[derive(Default)]
pub struct MockPeriodSource {
    replies: Mutex<HashMap<PeriodId, Vec<Reply>>>,
    gates: Mutex<HashMap<PeriodId, Arc<Notify>>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl MockPeriodSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roots(self, roots: Vec<PeriodNode>) -> Self {
        self.push_reply(&PeriodId::from(ROOT_KEY), Ok(roots));
        self
    }

    pub fn with_children(self, parent: &PeriodNode, children: Vec<PeriodNode>) -> Self {
        self.push_reply(&parent.id, Ok(children));
        self
    }

    /// Queue a reply for the next top-level fetch. Replies are consumed in order; the last one repeats.
    pub fn push_roots(&self, reply: Reply) {
        self.push_reply(&PeriodId::from(ROOT_KEY), reply);
    }

    pub fn push_children(&self, parent: &PeriodNode, reply: Reply) {
        self.push_reply(&parent.id, reply);
    }

    /// Make fetches scoped to `parent` wait until the returned handle is notified
    pub fn hold_children(&self, parent: &PeriodNode) -> Arc<Notify> {
        self.hold(parent.id.clone())
    }

    pub fn hold_roots(&self) -> Arc<Notify> {
        self.hold(PeriodId::from(ROOT_KEY))
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, parent: &PeriodNode) -> usize {
        self.calls()
            .iter()
            .filter(|call| match call {
                FetchCall::Antardashas(id) | FetchCall::Pratyantardashas(id) => id == &parent.id,
                FetchCall::Mahadashas(_) => false,
            })
            .count()
    }

    fn hold(&self, key: PeriodId) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(key, notify.clone());
        notify
    }

    fn push_reply(&self, key: &PeriodId, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(reply);
    }

    async fn reply(&self, key: PeriodId, call: FetchCall) -> Reply {
        self.calls.lock().unwrap().push(call);

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue.first().cloned().unwrap_or(Ok(Vec::new())),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl PeriodSource for MockPeriodSource {
    async fn fetch_mahadashas(&self, ctx: &DashaContext) -> Result<Vec<PeriodNode>, DashaError> {
        self.reply(PeriodId::from(ROOT_KEY), FetchCall::Mahadashas(ctx.clone()))
            .await
    }

    async fn fetch_antardashas(
        &self,
        _ctx: &DashaContext,
        query: &AntardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError> {
        let parent = PeriodId::derive(
            DashaLevel::Mahadasha,
            &[],
            query.mahadasha_planet,
            query.start_date,
        );
        self.reply(parent.clone(), FetchCall::Antardashas(parent)).await
    }

    async fn fetch_pratyantardashas(
        &self,
        _ctx: &DashaContext,
        query: &PratyantardashaQuery,
    ) -> Result<Vec<PeriodNode>, DashaError> {
        let parent = PeriodId::derive(
            DashaLevel::Antardasha,
            &[query.mahadasha_planet],
            query.antardasha_planet,
            query.start_date,
        );
        self.reply(parent.clone(), FetchCall::Pratyantardashas(parent)).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    FetchStarted(DashaLevel),
    FetchSucceeded(DashaLevel, usize),
    FetchFailed(DashaLevel),
    CacheHit(PeriodId),
    CacheMiss(PeriodId),
    CacheReset(usize),
    Stale(DashaLevel),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Observed) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    fn record(&self, event: Observed) {
        self.events.lock().unwrap().push(event);
    }
}

impl TimelineObserver for RecordingObserver {
    fn fetch_started(&self, level: DashaLevel, _parent: Option<&PeriodId>) {
        self.record(Observed::FetchStarted(level));
    }

    fn fetch_succeeded(&self, level: DashaLevel, _parent: Option<&PeriodId>, count: usize) {
        self.record(Observed::FetchSucceeded(level, count));
    }

    fn fetch_failed(&self, level: DashaLevel, _parent: Option<&PeriodId>, _error: &DashaError) {
        self.record(Observed::FetchFailed(level));
    }

    fn cache_hit(&self, id: &PeriodId) {
        self.record(Observed::CacheHit(id.clone()));
    }

    fn cache_miss(&self, id: &PeriodId) {
        self.record(Observed::CacheMiss(id.clone()));
    }

    fn cache_reset(&self, entries: usize) {
        self.record(Observed::CacheReset(entries));
    }

    fn stale_result(&self, level: DashaLevel, _parent: Option<&PeriodId>) {
        self.record(Observed::Stale(level));
    }
}
