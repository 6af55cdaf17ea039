//! ATN transitions
//!
//! Every edge of the automaton is one variant of [`Transition`]. Match
//! transitions consume a symbol; the rest are epsilon moves.

use super::StateId;
use crate::semantic::SemanticContext;
use crate::utils::IntervalSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Epsilon {
        target: StateId,
    },
    Atom {
        target: StateId,
        label: i32,
    },
    Range {
        target: StateId,
        start: i32,
        stop: i32,
    },
    Set {
        target: StateId,
        set: IntervalSet,
    },
    NotSet {
        target: StateId,
        set: IntervalSet,
    },
    Wildcard {
        target: StateId,
    },
    /// Call `target` (a rule start state); resume at `follow_state` on return
    Rule {
        target: StateId,
        rule_index: usize,
        follow_state: StateId,
        precedence: i32,
    },
    Predicate {
        target: StateId,
        rule_index: usize,
        pred_index: usize,
        is_ctx_dependent: bool,
    },
    Precedence {
        target: StateId,
        precedence: i32,
    },
    /// Parser actions carry a host action index; lexer actions index the
    /// ATN's lexer action table
    Action {
        target: StateId,
        rule_index: usize,
        action_index: usize,
        is_ctx_dependent: bool,
    },
}

impl Transition {
    pub fn target(&self) -> StateId {
        match self {
            Transition::Epsilon { target }
            | Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Wildcard { target }
            | Transition::Rule { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::Precedence { target, .. }
            | Transition::Action { target, .. } => *target,
        }
    }

    pub(crate) fn target_mut(&mut self) -> &mut StateId {
        match self {
            Transition::Epsilon { target }
            | Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Wildcard { target }
            | Transition::Rule { target, .. }
            | Transition::Predicate { target, .. }
            | Transition::Precedence { target, .. }
            | Transition::Action { target, .. } => target,
        }
    }

    /// True for transitions that never consume input
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            Transition::Epsilon { .. }
                | Transition::Rule { .. }
                | Transition::Predicate { .. }
                | Transition::Precedence { .. }
                | Transition::Action { .. }
        )
    }

    /// Whether this transition consumes `symbol`, given the vocabulary bounds
    pub fn matches(&self, symbol: i32, min_vocab: i32, max_vocab: i32) -> bool {
        match self {
            Transition::Atom { label, .. } => *label == symbol,
            Transition::Range { start, stop, .. } => *start <= symbol && symbol <= *stop,
            Transition::Set { set, .. } => set.contains(symbol),
            Transition::NotSet { set, .. } => {
                symbol >= min_vocab && symbol <= max_vocab && !set.contains(symbol)
            }
            Transition::Wildcard { .. } => symbol >= min_vocab && symbol <= max_vocab,
            _ => false,
        }
    }

    /// Symbols accepted by a match transition; `None` for epsilon and wildcard
    pub fn label(&self) -> Option<IntervalSet> {
        match self {
            Transition::Atom { label, .. } => Some(IntervalSet::of(*label)),
            Transition::Range { start, stop, .. } => Some(IntervalSet::of_range(*start, *stop)),
            Transition::Set { set, .. } | Transition::NotSet { set, .. } => Some(set.clone()),
            _ => None,
        }
    }

    /// The semantic context a predicate transition guards with
    pub fn predicate(&self) -> Option<SemanticContext> {
        match self {
            Transition::Predicate {
                rule_index,
                pred_index,
                is_ctx_dependent,
                ..
            } => Some(SemanticContext::Predicate {
                rule_index: *rule_index,
                pred_index: *pred_index,
                is_ctx_dependent: *is_ctx_dependent,
            }),
            Transition::Precedence { precedence, .. } => {
                Some(SemanticContext::Precedence(*precedence))
            }
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Transition::Epsilon { .. } => "epsilon",
            Transition::Atom { .. } => "atom",
            Transition::Range { .. } => "range",
            Transition::Set { .. } => "set",
            Transition::NotSet { .. } => "not_set",
            Transition::Wildcard { .. } => "wildcard",
            Transition::Rule { .. } => "rule",
            Transition::Predicate { .. } => "predicate",
            Transition::Precedence { .. } => "precedence",
            Transition::Action { .. } => "action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_semantics() {
        let atom = Transition::Atom { target: 1, label: 4 };
        assert!(atom.matches(4, 1, 10));
        assert!(!atom.matches(5, 1, 10));

        let not_set = Transition::NotSet {
            target: 1,
            set: IntervalSet::of_range(2, 3),
        };
        assert!(not_set.matches(1, 1, 10));
        assert!(!not_set.matches(2, 1, 10));
        assert!(!not_set.matches(11, 1, 10));

        let wildcard = Transition::Wildcard { target: 1 };
        assert!(!wildcard.matches(-1, 0, 10));
    }

    #[test]
    fn test_epsilon_classification() {
        assert!(Transition::Epsilon { target: 0 }.is_epsilon());
        assert!(Transition::Rule {
            target: 0,
            rule_index: 0,
            follow_state: 1,
            precedence: 0
        }
        .is_epsilon());
        assert!(!Transition::Wildcard { target: 0 }.is_epsilon());
    }

    #[test]
    fn test_predicate_context() {
        let t = Transition::Predicate {
            target: 2,
            rule_index: 1,
            pred_index: 0,
            is_ctx_dependent: false,
        };
        assert_eq!(
            t.predicate(),
            Some(SemanticContext::Predicate {
                rule_index: 1,
                pred_index: 0,
                is_ctx_dependent: false
            })
        );
    }
}
