//! Shared prediction cache
//!
//! One [`PredictionCache`] per compiled automaton, shared by every session
//! predicting over it. The DFAs and the context arena their configurations
//! refer to live together in a [`CacheGeneration`]; clearing the cache
//! swaps in a fresh generation while sessions holding the old one finish
//! undisturbed. A generation whose arena fills up is renewed the same way.

use super::Dfa;
use crate::atn::Atn;
use crate::config::compile_time::context::{MAX_ARENA_NODES, MAX_CONTEXT_DEPTH};
use crate::context::ContextArena;
use crate::logging::codes;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
pub struct CacheGeneration {
    /// Indexed by decision for parsers and by mode for lexers
    pub dfas: Vec<Dfa>,
    pub arena: ContextArena,
}

impl CacheGeneration {
    fn new(atn: &Atn, limits: ArenaLimits) -> Self {
        let dfas = if atn.is_lexer() {
            atn.mode_to_start_state
                .iter()
                .enumerate()
                .map(|(mode, &start)| Dfa::for_mode(mode, start))
                .collect()
        } else {
            atn.decision_to_state
                .iter()
                .enumerate()
                .map(|(decision, &start)| Dfa::for_decision(atn, decision, start))
                .collect()
        };
        Self {
            dfas,
            arena: ContextArena::with_limits(limits.max_nodes, limits.max_depth),
        }
    }

    pub fn dfa(&self, index: usize) -> Option<&Dfa> {
        self.dfas.get(index)
    }
}

#[derive(Debug, Clone, Copy)]
struct ArenaLimits {
    max_nodes: usize,
    max_depth: usize,
}

#[derive(Debug)]
pub struct PredictionCache {
    atn: Arc<Atn>,
    limits: ArenaLimits,
    generation: RwLock<Arc<CacheGeneration>>,
}

impl PredictionCache {
    pub fn new(atn: Arc<Atn>) -> Self {
        Self::with_arena_limits(atn, MAX_ARENA_NODES, MAX_CONTEXT_DEPTH)
    }

    /// Cache whose generations intern at most `max_nodes` contexts, each at
    /// most `max_depth` deep
    pub fn with_arena_limits(atn: Arc<Atn>, max_nodes: usize, max_depth: usize) -> Self {
        let limits = ArenaLimits {
            max_nodes,
            max_depth,
        };
        let generation = Arc::new(CacheGeneration::new(&atn, limits));
        Self {
            atn,
            limits,
            generation: RwLock::new(generation),
        }
    }

    pub fn atn(&self) -> &Arc<Atn> {
        &self.atn
    }

    /// Current generation; stays valid for as long as the caller holds it
    pub fn snapshot(&self) -> Arc<CacheGeneration> {
        self.generation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every cached DFA state and context node
    pub fn clear(&self) {
        let fresh = Arc::new(CacheGeneration::new(&self.atn, self.limits));
        *self.generation.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        crate::log_success!(
            codes::success::DFA_CLEARED,
            "Prediction cache cleared",
            "grammar" => &self.atn.grammar_name
        );
    }

    /// Replace `seen` with a fresh generation unless another session already
    /// has. Returns whether this call did the swap.
    pub fn renew(&self, seen: &Arc<CacheGeneration>) -> bool {
        let mut current = self.generation.write().unwrap_or_else(PoisonError::into_inner);
        if !Arc::ptr_eq(&current, seen) {
            return false;
        }
        let nodes = current.arena.node_count();
        *current = Arc::new(CacheGeneration::new(&self.atn, self.limits));
        drop(current);
        crate::log_warning!(
            code = codes::prediction::ARENA_RENEWED,
            "Context arena full, prediction cache renewed",
            "grammar" => &self.atn.grammar_name,
            "nodes" => nodes
        );
        true
    }

    /// Installed DFA states across all decisions
    pub fn state_count(&self) -> usize {
        self.snapshot().dfas.iter().map(Dfa::state_count).sum()
    }

    /// Textual dump of one decision's DFA, `None` for an unknown decision
    pub fn dump(&self, decision: usize) -> Option<String> {
        let generation = self.snapshot();
        let dfa = generation.dfa(decision)?;
        Some(super::serializer::dump(dfa, &self.atn))
    }
}
