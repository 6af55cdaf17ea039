//! LL(1) lookahead analysis over the automaton
//!
//! `next_tokens` answers "which symbols can follow this state inside its
//! rule", with [`EPSILON`] standing in for "the end of the rule is reachable".
//! `expected_tokens` extends that through a concrete call stack and is what
//! error messages use.

use super::{Atn, StateId, Transition, EOF, EPSILON, MAX_CHAR, MIN_CHAR, MIN_USER_TOKEN_TYPE};
use crate::utils::IntervalSet;
use std::collections::HashSet;

/// What lies below the explicit follow stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bottom {
    /// Caller unknown; reaching the rule end yields EPSILON
    Unknown,
    /// Outermost rule; reaching its end yields EOF
    Root,
}

struct Look<'a> {
    atn: &'a Atn,
    bottom: Bottom,
    follow: Vec<StateId>,
    busy: HashSet<(StateId, Vec<StateId>)>,
    called_rules: Vec<bool>,
    result: IntervalSet,
}

impl<'a> Look<'a> {
    fn new(atn: &'a Atn, bottom: Bottom, follow: Vec<StateId>) -> Self {
        Self {
            atn,
            bottom,
            follow,
            busy: HashSet::new(),
            called_rules: vec![false; atn.rule_names.len()],
            result: IntervalSet::new(),
        }
    }

    fn vocabulary(&self) -> (i32, i32) {
        if self.atn.is_lexer() {
            (MIN_CHAR, MAX_CHAR)
        } else {
            (MIN_USER_TOKEN_TYPE, self.atn.max_token_type)
        }
    }

    fn walk(&mut self, s: StateId) {
        if !self.busy.insert((s, self.follow.clone())) {
            return;
        }

        let state = self.atn.state(s);
        if state.is_rule_stop() {
            match self.follow.pop() {
                None => {
                    self.result.add(match self.bottom {
                        Bottom::Unknown => EPSILON,
                        Bottom::Root => EOF,
                    });
                }
                Some(return_state) => {
                    let rule = state.rule_index;
                    let was_called = std::mem::replace(&mut self.called_rules[rule], false);
                    self.walk(return_state);
                    self.called_rules[rule] = was_called;
                    self.follow.push(return_state);
                }
            }
            return;
        }

        for transition in &state.transitions {
            match transition {
                Transition::Rule {
                    target,
                    rule_index,
                    follow_state,
                    ..
                } => {
                    if self.called_rules[*rule_index] {
                        continue;
                    }
                    self.called_rules[*rule_index] = true;
                    self.follow.push(*follow_state);
                    self.walk(*target);
                    self.follow.pop();
                    self.called_rules[*rule_index] = false;
                }
                Transition::Wildcard { .. } => {
                    let (min, max) = self.vocabulary();
                    self.result.add_range(min, max);
                }
                Transition::NotSet { set, .. } => {
                    let (min, max) = self.vocabulary();
                    self.result.add_set(&set.complement(min, max));
                }
                t if t.is_epsilon() => self.walk(t.target()),
                t => {
                    if let Some(label) = t.label() {
                        self.result.add_set(&label);
                    }
                }
            }
        }
    }
}

impl Atn {
    /// Symbols that can follow `state` within its rule; contains [`EPSILON`]
    /// when the rule's end is reachable without consuming input
    pub fn next_tokens(&self, state: StateId) -> IntervalSet {
        let mut look = Look::new(self, Bottom::Unknown, Vec::new());
        look.walk(state);
        look.result
    }

    /// Symbols acceptable at `state` given the invoking states of the active
    /// rules (outermost first); [`EOF`] when the start rule can end here
    pub fn expected_tokens(&self, state: StateId, call_stack: &[StateId]) -> IntervalSet {
        let mut following = self.next_tokens(state);
        if !following.contains(EPSILON) {
            return following;
        }

        let mut expected = following.clone();
        expected.remove(EPSILON);

        for &invoking in call_stack.iter().rev() {
            if !following.contains(EPSILON) {
                break;
            }
            let follow_state = self.states[invoking]
                .transitions
                .iter()
                .find_map(|t| match t {
                    Transition::Rule { follow_state, .. } => Some(*follow_state),
                    _ => None,
                });
            let Some(follow_state) = follow_state else {
                break;
            };
            following = self.next_tokens(follow_state);
            expected.add_set(&following);
            expected.remove(EPSILON);
        }

        if following.contains(EPSILON) {
            expected.add(EOF);
        }
        expected
    }

    /// Symbols that can follow `state` when the invoking states are exactly
    /// `call_stack`; the outermost rule end contributes [`EOF`]
    pub fn next_tokens_in_context(&self, state: StateId, call_stack: &[StateId]) -> IntervalSet {
        let follow: Vec<StateId> = call_stack
            .iter()
            .filter_map(|&invoking| {
                self.states[invoking].transitions.iter().find_map(|t| match t {
                    Transition::Rule { follow_state, .. } => Some(*follow_state),
                    _ => None,
                })
            })
            .collect();
        let mut look = Look::new(self, Bottom::Root, follow);
        look.walk(state);
        look.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atn::{AtnBuilder, Element};

    fn grammar() -> Atn {
        // s : a 'x' EOF ;  a : 'y'? ;
        AtnBuilder::parser("T")
            .rule(
                "s",
                Element::seq(vec![
                    Element::rule("a"),
                    Element::token(1),
                    Element::token(EOF),
                ]),
            )
            .rule("a", Element::opt(Element::token(2)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_next_tokens_within_rule() {
        let atn = grammar();
        let a_start = atn.rule_to_start_state[1];
        let look = atn.next_tokens(a_start);
        assert!(look.contains(2));
        assert!(look.contains(EPSILON));
        assert!(!look.contains(1));
    }

    #[test]
    fn test_next_tokens_through_rule_call() {
        let atn = grammar();
        let s_start = atn.rule_to_start_state[0];
        let look = atn.next_tokens(s_start);
        assert!(look.contains(1));
        assert!(look.contains(2));
        assert!(!look.contains(EPSILON));
    }

    #[test]
    fn test_expected_tokens_follow_call_stack() {
        let atn = grammar();
        let invoking = atn
            .states
            .iter()
            .find(|s| matches!(s.transitions.first(), Some(Transition::Rule { .. })))
            .unwrap()
            .index;
        let a_start = atn.rule_to_start_state[1];

        let expected = atn.expected_tokens(a_start, &[invoking]);
        assert!(expected.contains(1));
        assert!(expected.contains(2));
        assert!(!expected.contains(EPSILON));
        assert!(!expected.contains(EOF));

        let in_context = atn.next_tokens_in_context(a_start, &[invoking]);
        assert!(in_context.contains(1));
    }

    #[test]
    fn test_left_recursion_terminates() {
        let atn = AtnBuilder::parser("T")
            .rule(
                "e",
                Element::alt(vec![
                    Element::seq(vec![Element::rule("e"), Element::token(1)]),
                    Element::token(2),
                ]),
            )
            .build()
            .unwrap();
        let look = atn.next_tokens(atn.rule_to_start_state[0]);
        assert!(look.contains(2));
    }
}
