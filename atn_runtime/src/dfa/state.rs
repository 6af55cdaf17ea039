//! DFA states

use crate::action::LexerActionExecutor;
use crate::atn::INVALID_ALT;
use crate::configs::AtnConfigSet;
use crate::semantic::SemanticContext;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// State number of a state that was computed but not installed
pub const UNCACHED_STATE: usize = usize::MAX;

/// Alternative predicted under a predicate, evaluated in order at an
/// accept state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredPrediction {
    pub pred: SemanticContext,
    pub alt: usize,
}

impl fmt::Display for PredPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pred, self.alt)
    }
}

/// Target of a DFA edge. States are owned by their DFA; edges hold weak
/// references so that loops in the DFA do not keep states alive.
#[derive(Debug, Clone)]
pub enum EdgeTarget {
    State(Weak<DfaState>),
    Error,
}

/// Resolved edge lookup
#[derive(Debug, Clone)]
pub enum Edge {
    Target(Arc<DfaState>),
    Error,
}

#[derive(Debug)]
pub struct DfaState {
    pub state_number: usize,
    pub configs: AtnConfigSet,
    pub(crate) edges: Box<[OnceLock<EdgeTarget>]>,

    pub is_accept_state: bool,

    /// Predicted alternative (parser) at an accept state
    pub prediction: usize,

    /// Token type (lexer) at an accept state
    pub token_type: i32,
    pub lexer_executor: Option<Arc<LexerActionExecutor>>,

    /// SLL found a conflict here; callers fall back to full-context
    /// prediction unless running SLL only
    pub requires_full_context: bool,

    /// Predicate/alternative pairs resolving an accept state, when the
    /// conflict involved predicated configurations
    pub predicates: Option<Vec<PredPrediction>>,
}

impl DfaState {
    pub(crate) fn new(configs: AtnConfigSet, edge_count: usize) -> Self {
        Self {
            state_number: UNCACHED_STATE,
            configs,
            edges: (0..edge_count).map(|_| OnceLock::new()).collect(),
            is_accept_state: false,
            prediction: INVALID_ALT,
            token_type: 0,
            lexer_executor: None,
            requires_full_context: false,
            predicates: None,
        }
    }

    /// Whether this state lives in its DFA. Uncached states are returned
    /// once the per-decision state ceiling is reached and never get edges
    /// pointing at them.
    pub fn is_cached(&self) -> bool {
        self.state_number != UNCACHED_STATE
    }

    /// Edge for the slot at `index`, if one was written and its target is alive
    pub(crate) fn edge_at(&self, index: usize) -> Option<Edge> {
        match self.edges.get(index)?.get()? {
            EdgeTarget::State(weak) => weak.upgrade().map(Edge::Target),
            EdgeTarget::Error => Some(Edge::Error),
        }
    }

    /// Write-once; a slot that already holds a target keeps it
    pub(crate) fn set_edge_at(&self, index: usize, target: EdgeTarget) {
        if let Some(slot) = self.edges.get(index) {
            let _ = slot.set(target);
        }
    }

    /// Written edges as (slot index, target)
    pub(crate) fn written_edges(&self) -> impl Iterator<Item = (usize, &EdgeTarget)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.get().map(|t| (i, t)))
    }
}

impl PartialEq for DfaState {
    fn eq(&self, other: &Self) -> bool {
        self.configs == other.configs
    }
}

impl Eq for DfaState {}

impl fmt::Display for DfaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_accept_state {
            write!(f, ":")?;
        }
        write!(f, "s{}", self.state_number)?;
        if self.requires_full_context {
            write!(f, "^")?;
        }
        if self.is_accept_state {
            match &self.predicates {
                Some(predicates) => {
                    let parts: Vec<String> = predicates.iter().map(|p| p.to_string()).collect();
                    write!(f, "=>[{}]", parts.join(", "))?;
                }
                None => write!(f, "=>{}", self.prediction)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_write_once() {
        let target = Arc::new(DfaState::new(AtnConfigSet::new(false), 0));
        let state = DfaState::new(AtnConfigSet::new(false), 4);

        assert!(state.edge_at(2).is_none());
        state.set_edge_at(2, EdgeTarget::State(Arc::downgrade(&target)));
        state.set_edge_at(2, EdgeTarget::Error);
        assert!(matches!(state.edge_at(2), Some(Edge::Target(_))));

        // out of range slots are ignored
        state.set_edge_at(9, EdgeTarget::Error);
        assert!(state.edge_at(9).is_none());
        assert_eq!(state.written_edges().count(), 1);
    }

    #[test]
    fn test_dead_target_reads_as_missing() {
        let state = DfaState::new(AtnConfigSet::new(false), 1);
        {
            let target = Arc::new(DfaState::new(AtnConfigSet::new(false), 0));
            state.set_edge_at(0, EdgeTarget::State(Arc::downgrade(&target)));
        }
        assert!(state.edge_at(0).is_none());
    }

    #[test]
    fn test_display() {
        let mut state = DfaState::new(AtnConfigSet::new(false), 0);
        state.state_number = 3;
        assert_eq!(state.to_string(), "s3");
        state.is_accept_state = true;
        state.prediction = 2;
        state.requires_full_context = true;
        assert_eq!(state.to_string(), ":s3^=>2");
    }
}
