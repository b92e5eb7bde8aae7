// Expansion cache - per-node toggle state and fetched children
use crate::domain::period::{PeriodId, PeriodNode};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionEntry {
    pub expanded: bool,
    /// Set once from the first successful fetch and reused afterwards
    pub children: Vec<PeriodNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unknown,
    Collapsed,
    Expanded,
}

/// Proof that a fetch was started for `id` under a given cache epoch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: PeriodId,
    epoch: u64,
}

/// What a toggle request resolved to before any network work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleStep {
    Collapsed,
    /// Re-expanded from cached children
    Reexpanded,
    /// No cache entry yet; the caller must fetch and call `complete_fetch`
    Fetch(FetchTicket),
    /// Terminal-level node, never expandable
    Terminal,
    /// A fetch for this node is already outstanding
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCompletion {
    Applied,
    Failed,
    /// The cache was reset while the fetch was outstanding
    Stale,
}

#[derive(Debug, Default)]
pub struct ExpansionCache {
    entries: HashMap<PeriodId, ExpansionEntry>,
    in_flight: HashSet<PeriodId>,
    epoch: u64,
}

impl ExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_toggle(&mut self, node: &PeriodNode) -> ToggleStep {
        if node.level.is_terminal() {
            return ToggleStep::Terminal;
        }
        if self.in_flight.contains(&node.id) {
            return ToggleStep::InFlight;
        }

        match self.entries.get_mut(&node.id) {
            Some(entry) if entry.expanded => {
                entry.expanded = false;
                ToggleStep::Collapsed
            }
            Some(entry) => {
                entry.expanded = true;
                ToggleStep::Reexpanded
            }
            None => {
                self.in_flight.insert(node.id.clone());
                ToggleStep::Fetch(FetchTicket {
                    id: node.id.clone(),
                    epoch: self.epoch,
                })
            }
        }
    }

    /// Collapse without ever fetching. Returns false when the node was not expanded.
    pub fn collapse(&mut self, id: &PeriodId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if entry.expanded => {
                entry.expanded = false;
                true
            }
            _ => false,
        }
    }

    /// Record the outcome of a fetch. Only the ticket's own entry is touched.
    pub fn complete_fetch<E>(
        &mut self,
        ticket: &FetchTicket,
        result: &Result<Vec<PeriodNode>, E>,
    ) -> FetchCompletion {
        if ticket.epoch != self.epoch {
            return FetchCompletion::Stale;
        }
        self.in_flight.remove(&ticket.id);

        match result {
            Ok(children) => {
                let entry = self
                    .entries
                    .entry(ticket.id.clone())
                    .or_insert_with(|| ExpansionEntry {
                        expanded: false,
                        children: children.clone(),
                    });
                entry.expanded = true;
                FetchCompletion::Applied
            }
            Err(_) => FetchCompletion::Failed,
        }
    }

    /// Drop every entry and invalidate outstanding fetches. Returns the number of entries dropped.
    pub fn reset(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.in_flight.clear();
        self.epoch += 1;
        dropped
    }

    pub fn entry(&self, id: &PeriodId) -> Option<&ExpansionEntry> {
        self.entries.get(id)
    }

    pub fn state(&self, id: &PeriodId) -> NodeState {
        match self.entries.get(id) {
            Some(entry) if entry.expanded => NodeState::Expanded,
            Some(_) => NodeState::Collapsed,
            None => NodeState::Unknown,
        }
    }

    pub fn is_in_flight(&self, id: &PeriodId) -> bool {
        self.in_flight.contains(id)
    }

    /// Children to display under `id`, if it is currently expanded
    pub fn visible_children(&self, id: &PeriodId) -> Option<&[PeriodNode]> {
        self.entry(id)
            .filter(|entry| entry.expanded)
            .map(|entry| entry.children.as_slice())
    }

    /// Find a known node by id among the roots and every cached child list
    pub fn locate<'a>(&'a self, roots: &'a [PeriodNode], id: &PeriodId) -> Option<&'a PeriodNode> {
        let mut pending: Vec<&'a PeriodNode> = roots.iter().collect();
        while let Some(node) = pending.pop() {
            if &node.id == id {
                return Some(node);
            }
            if let Some(entry) = self.entries.get(&node.id) {
                pending.extend(entry.children.iter());
            }
        }
        None
    }
}
