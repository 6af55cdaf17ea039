//! ATN states

use super::transition::Transition;
use super::StateId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Basic,
    RuleStart,
    RuleStop,
    BlockStart,
    PlusBlockStart,
    StarBlockStart,
    BlockEnd,
    StarLoopEntry,
    StarLoopBack,
    PlusLoopBack,
    LoopEnd,
    TokensStart,
}

impl StateKind {
    /// Kinds that may carry a decision number
    pub fn is_decision_kind(&self) -> bool {
        matches!(
            self,
            StateKind::BlockStart
                | StateKind::PlusBlockStart
                | StateKind::StarBlockStart
                | StateKind::StarLoopEntry
                | StateKind::PlusLoopBack
                | StateKind::TokensStart
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtnState {
    pub index: StateId,
    pub kind: StateKind,
    pub rule_index: usize,
    pub transitions: Vec<Transition>,

    /// Decision number when this state is a prediction point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<usize>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub non_greedy: bool,

    /// Block end for block starts; loop back for loop ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<StateId>,
}

impl AtnState {
    pub fn new(index: StateId, kind: StateKind, rule_index: usize) -> Self {
        Self {
            index,
            kind,
            rule_index,
            transitions: Vec::new(),
            decision: None,
            non_greedy: false,
            partner: None,
        }
    }

    pub fn is_rule_stop(&self) -> bool {
        self.kind == StateKind::RuleStop
    }

    pub fn is_decision(&self) -> bool {
        self.decision.is_some()
    }

    /// A state with no transitions counts as not epsilon-only, so closure
    /// keeps configurations that stop there.
    pub fn only_has_epsilon_transitions(&self) -> bool {
        !self.transitions.is_empty() && self.transitions.iter().all(Transition::is_epsilon)
    }

    pub fn transition(&self, i: usize) -> Option<&Transition> {
        self.transitions.get(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon_only_requires_transitions() {
        let mut state = AtnState::new(0, StateKind::RuleStop, 0);
        assert!(!state.only_has_epsilon_transitions());

        state.transitions.push(Transition::Epsilon { target: 1 });
        assert!(state.only_has_epsilon_transitions());

        state.transitions.push(Transition::Atom {
            target: 2,
            label: 1,
        });
        assert!(!state.only_has_epsilon_transitions());
    }

    #[test]
    fn test_decision_kinds() {
        assert!(StateKind::StarLoopEntry.is_decision_kind());
        assert!(!StateKind::BlockEnd.is_decision_kind());
    }
}
