//! DFA dump
//!
//! One line per edge, `s0-'a'->:s1=>1`. Accept states are prefixed with `:`
//! and followed by their prediction; `^` marks a state that requires full
//! context. Error edges are omitted.

use super::{Dfa, EdgeTarget};
use crate::atn::Atn;

pub fn dump(dfa: &Dfa, atn: &Atn) -> String {
    let mut out = String::new();
    for state in dfa.states() {
        for (index, target) in state.written_edges() {
            let EdgeTarget::State(weak) = target else {
                continue;
            };
            let Some(target) = weak.upgrade() else {
                continue;
            };
            let symbol = dfa.symbol_at(index);
            out.push_str(&format!(
                "{}-{}->{}\n",
                state,
                atn.symbol_display_name(symbol),
                target
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::{AtnConfig, AtnConfigSet};
    use crate::context::{ContextArena, ContextId};
    use crate::fixtures;

    #[test]
    fn test_dump_format() {
        let atn = fixtures::ab_ac_parser();
        let arena = ContextArena::new();
        let dfa = Dfa::for_decision(&atn, 0, atn.decision_to_state[0]);

        let mut start = AtnConfigSet::new(false);
        start.add(AtnConfig::new(2, 1, ContextId::EMPTY), &arena).unwrap();
        let s0 = dfa.add_state(dfa.new_state(start));

        let mut accept_configs = AtnConfigSet::new(false);
        accept_configs
            .add(AtnConfig::new(3, 1, ContextId::EMPTY), &arena)
            .unwrap();
        let mut accept = dfa.new_state(accept_configs);
        accept.is_accept_state = true;
        accept.prediction = 1;
        let s1 = dfa.add_state(accept);

        dfa.add_edge(&s0, 1, &s1);
        dfa.add_error_edge(&s0, 2);

        assert_eq!(dump(&dfa, &atn), "s0-'a'->:s1=>1\n");
    }
}
