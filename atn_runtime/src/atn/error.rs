//! Automaton construction and validation errors

use crate::logging::{codes, Code};

pub type AtnResult<T> = Result<T, AtnError>;

#[derive(Debug, thiserror::Error)]
pub enum AtnError {
    #[error("State {state} has a transition to missing state {target}")]
    InvalidStateReference { state: usize, target: usize },

    #[error("Reference to undefined rule '{name}'")]
    UndefinedRule { name: String },

    #[error("Rule index {rule_index} out of range ({rule_count} rules)")]
    InvalidRuleIndex { rule_index: usize, rule_count: usize },

    #[error("Decision {decision} is not consistent with state {state}")]
    InvalidDecision { decision: usize, state: usize },

    #[error("Malformed state {state}: {message}")]
    MalformedState { state: usize, message: String },

    #[error("Lexer action index {action_index} out of range ({action_count} actions)")]
    InvalidLexerAction {
        action_index: usize,
        action_count: usize,
    },

    #[error("{construct} is not supported in {grammar} grammars")]
    UnsupportedConstruct {
        construct: &'static str,
        grammar: &'static str,
    },

    #[error("Duplicate rule name '{name}'")]
    DuplicateRule { name: String },

    #[error("Automaton serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AtnError {
    pub fn malformed(state: usize, message: &str) -> Self {
        Self::MalformedState {
            state,
            message: message.to_string(),
        }
    }

    pub fn undefined_rule(name: &str) -> Self {
        Self::UndefinedRule {
            name: name.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidStateReference { .. } => codes::atn::INVALID_STATE_REFERENCE,
            Self::UndefinedRule { .. }
            | Self::InvalidRuleIndex { .. }
            | Self::DuplicateRule { .. } => codes::atn::INVALID_RULE_REFERENCE,
            Self::InvalidDecision { .. } => codes::atn::INVALID_DECISION,
            Self::MalformedState { .. } => codes::atn::MALFORMED_STATE,
            Self::InvalidLexerAction { .. } => codes::atn::INVALID_LEXER_ACTION,
            Self::UnsupportedConstruct { .. } => codes::atn::UNSUPPORTED_TRANSITION,
            Self::Serialization(_) => codes::atn::SERIALIZATION_ERROR,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AtnError::undefined_rule("expr").error_code(),
            codes::atn::INVALID_RULE_REFERENCE
        );
        assert_eq!(
            AtnError::malformed(3, "no transitions").to_string(),
            "Malformed state 3: no transitions"
        );
        assert!(!AtnError::malformed(3, "x").is_recoverable());
    }
}
