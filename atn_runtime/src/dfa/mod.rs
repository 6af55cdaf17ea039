//! DFA cache
//!
//! Each decision (or lexer mode) owns a [`Dfa`] built lazily from the
//! configuration sets prediction computes. States are canonical: a new
//! state whose configurations equal an existing one is replaced by it.
//! Edge reads never lock; installing a state takes the DFA's mutex.

pub mod cache;
pub mod serializer;
pub mod state;

pub use cache::{CacheGeneration, PredictionCache};
pub use state::{DfaState, Edge, EdgeTarget, PredPrediction, UNCACHED_STATE};

use crate::atn::{Atn, StateId, EOF};
use crate::config::compile_time;
use crate::configs::AtnConfigSet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

#[derive(Debug)]
pub struct Dfa {
    /// Decision number, or mode number for lexer DFAs
    pub decision: usize,
    pub atn_start_state: StateId,

    /// Symbols with edge slots: `min_symbol..=max_symbol`
    min_symbol: i32,
    max_symbol: i32,

    s0: OnceLock<Arc<DfaState>>,
    states: Mutex<DfaStates>,
    max_states: usize,
    limit_reported: AtomicBool,
}

#[derive(Debug, Default)]
struct DfaStates {
    by_hash: HashMap<u64, Vec<Arc<DfaState>>>,
    count: usize,
}

impl Dfa {
    /// DFA for a parser decision; edges cover EOF and every token type
    pub fn for_decision(atn: &Atn, decision: usize, start_state: StateId) -> Self {
        Self::with_range(decision, start_state, EOF, atn.max_token_type)
    }

    /// DFA for a lexer mode; edges cover the low code points only, wider
    /// characters are always simulated
    pub fn for_mode(mode: usize, start_state: StateId) -> Self {
        Self::with_range(mode, start_state, 0, compile_time::prediction::LEXER_DFA_MAX_EDGE)
    }

    fn with_range(decision: usize, atn_start_state: StateId, min_symbol: i32, max_symbol: i32) -> Self {
        Self {
            decision,
            atn_start_state,
            min_symbol,
            max_symbol,
            s0: OnceLock::new(),
            states: Mutex::new(DfaStates::default()),
            max_states: compile_time::prediction::MAX_DFA_STATES_PER_DECISION,
            limit_reported: AtomicBool::new(false),
        }
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    fn edge_count(&self) -> usize {
        (self.max_symbol - self.min_symbol + 1).max(0) as usize
    }

    fn edge_index(&self, symbol: i32) -> Option<usize> {
        if symbol < self.min_symbol || symbol > self.max_symbol {
            return None;
        }
        Some((symbol - self.min_symbol) as usize)
    }

    fn symbol_at(&self, index: usize) -> i32 {
        self.min_symbol + index as i32
    }

    /// Uninstalled state with edge slots sized for this DFA
    pub fn new_state(&self, configs: AtnConfigSet) -> DfaState {
        DfaState::new(configs, self.edge_count())
    }

    pub fn s0(&self) -> Option<Arc<DfaState>> {
        self.s0.get().cloned()
    }

    /// Record the start state; a start state installed concurrently wins
    pub fn set_s0(&self, state: Arc<DfaState>) -> Arc<DfaState> {
        if !state.is_cached() {
            return state;
        }
        self.s0.get_or_init(|| state).clone()
    }

    pub fn edge(&self, from: &DfaState, symbol: i32) -> Option<Edge> {
        from.edge_at(self.edge_index(symbol)?)
    }

    /// Add an edge to an installed state. Edges to uncached states and
    /// symbols outside the edge range are not recorded.
    pub fn add_edge(&self, from: &DfaState, symbol: i32, to: &Arc<DfaState>) {
        if !to.is_cached() {
            return;
        }
        if let Some(index) = self.edge_index(symbol) {
            from.set_edge_at(index, EdgeTarget::State(Arc::downgrade(to)));
        }
    }

    pub fn add_error_edge(&self, from: &DfaState, symbol: i32) {
        if let Some(index) = self.edge_index(symbol) {
            from.set_edge_at(index, EdgeTarget::Error);
        }
    }

    /// Install `state`, or return the canonical state with equal
    /// configurations. Past the state ceiling the state is handed back
    /// uncached.
    pub fn add_state(&self, mut state: DfaState) -> Arc<DfaState> {
        let hash = state.configs.content_hash();
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = states
            .by_hash
            .get(&hash)
            .and_then(|bucket| bucket.iter().find(|s| s.configs == state.configs))
        {
            return existing.clone();
        }

        if states.count >= self.max_states {
            if !self.limit_reported.swap(true, Ordering::Relaxed) {
                crate::log_warning!(
                    code = crate::logging::codes::prediction::DFA_STATE_LIMIT,
                    "DFA state ceiling reached; further states are not cached",
                    "decision" => self.decision,
                    "max_states" => self.max_states
                );
            }
            return Arc::new(state);
        }

        state.state_number = states.count;
        let state = Arc::new(state);
        states.count += 1;
        states.by_hash.entry(hash).or_default().push(state.clone());
        state
    }

    pub fn state_count(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    /// Installed states ordered by state number
    pub fn states(&self) -> Vec<Arc<DfaState>> {
        let states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Arc<DfaState>> = states.by_hash.values().flatten().cloned().collect();
        all.sort_by_key(|s| s.state_number);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::AtnConfig;
    use crate::context::{ContextArena, ContextId};

    fn configs(arena: &ContextArena, state: StateId) -> AtnConfigSet {
        let mut set = AtnConfigSet::new(false);
        set.add(AtnConfig::new(state, 1, ContextId::EMPTY), arena).unwrap();
        set
    }

    #[test]
    fn test_equal_states_are_canonical() {
        let arena = ContextArena::new();
        let dfa = Dfa::with_range(0, 0, EOF, 3);
        let a = dfa.add_state(dfa.new_state(configs(&arena, 4)));
        let b = dfa.add_state(dfa.new_state(configs(&arena, 4)));
        let c = dfa.add_state(dfa.new_state(configs(&arena, 5)));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(c.state_number, 1);
        assert_eq!(dfa.state_count(), 2);
    }

    #[test]
    fn test_edges_cover_eof() {
        let arena = ContextArena::new();
        let dfa = Dfa::with_range(0, 0, EOF, 3);
        let from = dfa.add_state(dfa.new_state(configs(&arena, 1)));
        let to = dfa.add_state(dfa.new_state(configs(&arena, 2)));

        dfa.add_edge(&from, EOF, &to);
        dfa.add_error_edge(&from, 3);
        dfa.add_edge(&from, 9, &to);

        assert!(matches!(dfa.edge(&from, EOF), Some(Edge::Target(s)) if Arc::ptr_eq(&s, &to)));
        assert!(matches!(dfa.edge(&from, 3), Some(Edge::Error)));
        assert!(dfa.edge(&from, 9).is_none());
        assert!(dfa.edge(&from, 1).is_none());
    }

    #[test]
    fn test_state_ceiling_returns_uncached_states() {
        let arena = ContextArena::new();
        let dfa = Dfa::with_range(0, 0, EOF, 3).with_max_states(1);
        let first = dfa.add_state(dfa.new_state(configs(&arena, 1)));
        let second = dfa.add_state(dfa.new_state(configs(&arena, 2)));
        assert!(first.is_cached());
        assert!(!second.is_cached());
        assert_eq!(dfa.state_count(), 1);

        dfa.add_edge(&first, 1, &second);
        assert!(dfa.edge(&first, 1).is_none());
        assert!(!dfa.set_s0(second).is_cached());
        assert!(dfa.s0().is_none());
    }
}
