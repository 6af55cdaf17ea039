//! Automaton model
//!
//! An [`Atn`] is the read-only network of states and transitions compiled
//! from a grammar. It is produced by [`AtnBuilder`] or loaded from its JSON
//! form, validated once, and then shared by every simulator and driver.

pub mod builder;
pub mod error;
pub mod ll1;
pub mod state;
pub mod transition;

pub use builder::{AtnBuilder, Element};
pub use error::{AtnError, AtnResult};
pub use state::{AtnState, StateKind};
pub use transition::Transition;

use crate::action::LexerAction;
use serde::{Deserialize, Serialize};

pub type StateId = usize;

// ============================================================================
// SYMBOL AND ALTERNATIVE CONSTANTS
// ============================================================================

/// End-of-input symbol for both characters and tokens
pub const EOF: i32 = -1;

/// Lookahead marker for "the end of the rule is reachable"
pub const EPSILON: i32 = -2;

pub const INVALID_ALT: usize = 0;
pub const INVALID_TOKEN_TYPE: i32 = 0;
pub const MIN_USER_TOKEN_TYPE: i32 = 1;
pub const MIN_CHAR: i32 = 0;
pub const MAX_CHAR: i32 = 0x10FFFF;

pub const DEFAULT_CHANNEL: i32 = 0;
pub const HIDDEN_CHANNEL: i32 = 1;
pub const DEFAULT_MODE: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarType {
    Lexer,
    Parser,
}

impl GrammarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarType::Lexer => "lexer",
            GrammarType::Parser => "parser",
        }
    }
}

// ============================================================================
// ATN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atn {
    pub grammar_type: GrammarType,
    pub grammar_name: String,

    /// Largest token type; parser DFA edges cover `EOF..=max_token_type`
    pub max_token_type: i32,

    pub states: Vec<AtnState>,
    pub decision_to_state: Vec<StateId>,

    pub rule_names: Vec<String>,
    pub rule_to_start_state: Vec<StateId>,
    pub rule_to_stop_state: Vec<StateId>,

    /// Display names for token types, indexed by type (parser vocabularies)
    #[serde(default)]
    pub token_names: Vec<String>,

    // Lexer only
    #[serde(default)]
    pub rule_to_token_type: Vec<i32>,
    #[serde(default)]
    pub mode_names: Vec<String>,
    #[serde(default)]
    pub mode_to_start_state: Vec<StateId>,
    #[serde(default)]
    pub lexer_actions: Vec<LexerAction>,
}

impl Atn {
    pub fn state(&self, id: StateId) -> &AtnState {
        &self.states[id]
    }

    pub fn number_of_decisions(&self) -> usize {
        self.decision_to_state.len()
    }

    pub fn decision_state(&self, decision: usize) -> Option<&AtnState> {
        self.decision_to_state
            .get(decision)
            .map(|&id| &self.states[id])
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_names.iter().position(|n| n == name)
    }

    pub fn rule_name(&self, rule_index: usize) -> &str {
        self.rule_names
            .get(rule_index)
            .map(String::as_str)
            .unwrap_or("<invalid>")
    }

    pub fn is_lexer(&self) -> bool {
        self.grammar_type == GrammarType::Lexer
    }

    /// Name of a symbol for diagnostics: characters for lexers, token names for parsers
    pub fn symbol_display_name(&self, symbol: i32) -> String {
        if symbol == EOF {
            return "<EOF>".to_string();
        }
        match self.grammar_type {
            GrammarType::Lexer => crate::utils::display_char(symbol),
            GrammarType::Parser => self
                .token_names
                .get(symbol as usize)
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| symbol.to_string()),
        }
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    pub fn to_json(&self) -> AtnResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> AtnResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a serialized automaton
    pub fn from_json(source: &str) -> AtnResult<Self> {
        let atn: Atn = serde_json::from_str(source)?;
        atn.validate()?;
        crate::log_success!(
            crate::logging::codes::success::ATN_LOADED,
            "Automaton loaded",
            "grammar" => &atn.grammar_name,
            "states" => atn.states.len(),
            "decisions" => atn.number_of_decisions()
        );
        Ok(atn)
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Check the structural invariants the simulators rely on. After this
    /// succeeds, every state id and rule index in the automaton is in range.
    pub fn validate(&self) -> AtnResult<()> {
        let state_count = self.states.len();
        let rule_count = self.rule_names.len();

        if self.rule_to_start_state.len() != rule_count
            || self.rule_to_stop_state.len() != rule_count
        {
            return Err(AtnError::InvalidRuleIndex {
                rule_index: self.rule_to_start_state.len().max(self.rule_to_stop_state.len()),
                rule_count,
            });
        }

        for (rule, (&start, &stop)) in self
            .rule_to_start_state
            .iter()
            .zip(&self.rule_to_stop_state)
            .enumerate()
        {
            self.check_kind(start, StateKind::RuleStart, "rule start table entry")?;
            self.check_kind(stop, StateKind::RuleStop, "rule stop table entry")?;
            if self.states[start].rule_index != rule || self.states[stop].rule_index != rule {
                return Err(AtnError::malformed(start, "rule boundary owned by another rule"));
            }
        }

        for (i, state) in self.states.iter().enumerate() {
            if state.index != i {
                return Err(AtnError::malformed(i, "state index does not match position"));
            }
            if state.rule_index >= rule_count && state.kind != StateKind::TokensStart {
                return Err(AtnError::InvalidRuleIndex {
                    rule_index: state.rule_index,
                    rule_count,
                });
            }
            if let Some(decision) = state.decision {
                if self.decision_to_state.get(decision) != Some(&i) {
                    return Err(AtnError::InvalidDecision { decision, state: i });
                }
            }
            for transition in &state.transitions {
                self.validate_transition(i, transition)?;
            }
        }

        for (decision, &state) in self.decision_to_state.iter().enumerate() {
            if state >= state_count || self.states[state].decision != Some(decision) {
                return Err(AtnError::InvalidDecision { decision, state });
            }
        }

        if self.is_lexer() {
            if self.rule_to_token_type.len() != rule_count {
                return Err(AtnError::malformed(0, "lexer rule token type table size mismatch"));
            }
            for &start in &self.mode_to_start_state {
                self.check_kind(start, StateKind::TokensStart, "mode start table entry")?;
            }
            if self.mode_to_start_state.is_empty() {
                return Err(AtnError::malformed(0, "lexer automaton has no modes"));
            }
        }

        Ok(())
    }

    fn check_kind(&self, id: StateId, kind: StateKind, what: &str) -> AtnResult<()> {
        match self.states.get(id) {
            Some(state) if state.kind == kind => Ok(()),
            Some(_) => Err(AtnError::malformed(id, &format!("{} has the wrong kind", what))),
            None => Err(AtnError::InvalidStateReference {
                state: id,
                target: id,
            }),
        }
    }

    fn validate_transition(&self, state: StateId, transition: &Transition) -> AtnResult<()> {
        let target = transition.target();
        if target >= self.states.len() {
            return Err(AtnError::InvalidStateReference { state, target });
        }

        match transition {
            Transition::Rule {
                rule_index,
                follow_state,
                ..
            } => {
                if *follow_state >= self.states.len() {
                    return Err(AtnError::InvalidStateReference {
                        state,
                        target: *follow_state,
                    });
                }
                if self.rule_to_start_state.get(*rule_index) != Some(&target) {
                    return Err(AtnError::malformed(
                        state,
                        "rule transition does not target its rule's start state",
                    ));
                }
            }
            Transition::Precedence { .. } if self.is_lexer() => {
                return Err(AtnError::UnsupportedConstruct {
                    construct: "precedence predicate",
                    grammar: "lexer",
                });
            }
            Transition::Action { action_index, .. } if self.is_lexer() => {
                if *action_index >= self.lexer_actions.len() {
                    return Err(AtnError::InvalidLexerAction {
                        action_index: *action_index,
                        action_count: self.lexer_actions.len(),
                    });
                }
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use assert_matches::assert_matches;

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let atn = fixtures::ab_ac_parser();
        let json = atn.to_json().unwrap();
        let loaded = Atn::from_json(&json).unwrap();
        assert_eq!(loaded, atn);
    }

    #[test]
    fn test_dangling_target_is_rejected() {
        let mut atn = fixtures::ab_ac_parser();
        let last = atn.states.len();
        atn.states[0].transitions.push(Transition::Epsilon { target: last + 7 });
        assert_matches!(
            atn.validate(),
            Err(AtnError::InvalidStateReference { state: 0, .. })
        );
    }

    #[test]
    fn test_decision_table_mismatch_is_rejected() {
        let mut atn = fixtures::ab_ac_parser();
        atn.decision_to_state.push(0);
        assert_matches!(atn.validate(), Err(AtnError::InvalidDecision { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = Atn::from_json("{\"grammar_type\": \"parser\"").unwrap_err();
        assert_matches!(err, AtnError::Serialization(_));
    }

    #[test]
    fn test_symbol_names() {
        let lexer = fixtures::keyword_lexer();
        assert_eq!(lexer.symbol_display_name('x' as i32), "'x'");
        let parser = fixtures::ab_ac_parser();
        assert_eq!(parser.symbol_display_name(EOF), "<EOF>");
        assert_eq!(parser.symbol_display_name(1), "'a'");
    }
}
