//! ATN configurations
//!
//! A configuration is one thread of the simulated NFA: a state, the
//! alternative it predicts, the call stacks it may be running under and the
//! predicate condition it was reached under. Lexer configurations also carry
//! the actions collected so far.

pub mod conflicts;
pub mod set;

pub use set::AtnConfigSet;

use crate::action::LexerActionExecutor;
use crate::atn::StateId;
use crate::context::{ContextArena, ContextId};
use crate::semantic::SemanticContext;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AtnConfig {
    pub state: StateId,
    pub alt: usize,
    pub context: ContextId,
    pub semantic_context: SemanticContext,

    /// How many times closure followed a rule end out of the decision rule
    /// into an unknown caller. Not part of identity.
    pub reaches_into_outer_context: usize,

    pub lexer_executor: Option<Arc<LexerActionExecutor>>,
    pub passed_through_non_greedy: bool,
}

impl AtnConfig {
    pub fn new(state: StateId, alt: usize, context: ContextId) -> Self {
        Self {
            state,
            alt,
            context,
            semantic_context: SemanticContext::None,
            reaches_into_outer_context: 0,
            lexer_executor: None,
            passed_through_non_greedy: false,
        }
    }

    /// Same configuration moved to `state`
    pub fn with_state(&self, state: StateId) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Same configuration moved to `state` under `context`
    pub fn with_state_and_context(&self, state: StateId, context: ContextId) -> Self {
        Self {
            state,
            context,
            ..self.clone()
        }
    }

    /// Render as `(state,alt,[ctx],pred)` for dumps
    pub fn describe(&self, arena: &ContextArena) -> String {
        let mut out = format!("({},{},{}", self.state, self.alt, arena.describe(self.context));
        if !self.semantic_context.is_none() {
            out.push(',');
            out.push_str(&self.semantic_context.to_string());
        }
        if self.reaches_into_outer_context > 0 {
            out.push_str(&format!(",up={}", self.reaches_into_outer_context));
        }
        out.push(')');
        out
    }
}

impl PartialEq for AtnConfig {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.alt == other.alt
            && self.context == other.context
            && self.semantic_context == other.semantic_context
            && self.passed_through_non_greedy == other.passed_through_non_greedy
            && self.lexer_executor == other.lexer_executor
    }
}

impl Eq for AtnConfig {}

impl Hash for AtnConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.hash(state);
        self.alt.hash(state);
        self.context.hash(state);
        self.semantic_context.hash(state);
        self.passed_through_non_greedy.hash(state);
        self.lexer_executor.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_context_depth_is_not_identity() {
        let a = AtnConfig::new(3, 1, ContextId::EMPTY);
        let mut b = a.clone();
        b.reaches_into_outer_context = 2;
        assert_eq!(a, b);

        let c = a.with_state(4);
        assert_ne!(a, c);
    }

    #[test]
    fn test_describe() {
        let arena = ContextArena::new();
        let ctx = arena.push(ContextId::EMPTY, 9).unwrap();
        let config = AtnConfig::new(3, 2, ctx);
        assert_eq!(config.describe(&arena), "(3,2,[9])");
    }
}
