//! Interpreter errors

use crate::logging::{codes, Code};
use crate::simulator::PredictionError;

pub type InterpreterResult<T> = Result<T, InterpreterError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpreterError {
    #[error("mismatched input {found} at token {index}, expecting {expected}")]
    MismatchedInput {
        index: usize,
        found: String,
        expected: String,
    },

    #[error("rule {rule} failed predicate {predicate} at token {index}")]
    FailedPredicate {
        rule: String,
        predicate: String,
        index: usize,
    },

    #[error("rule invocation depth exceeded {depth}")]
    CallStackOverflow { depth: usize },

    #[error("unknown start rule '{name}'")]
    UnknownRule { name: String },

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl InterpreterError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::MismatchedInput { .. } => codes::interpreter::MISMATCHED_INPUT,
            Self::FailedPredicate { .. } => codes::interpreter::FAILED_PREDICATE,
            Self::CallStackOverflow { .. } => codes::interpreter::CALL_STACK_OVERFLOW,
            Self::UnknownRule { .. } => codes::interpreter::UNKNOWN_RULE,
            Self::Prediction(e) => e.error_code(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Token index the error was detected at, when there is one
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::MismatchedInput { index, .. } | Self::FailedPredicate { index, .. } => {
                Some(*index)
            }
            Self::Prediction(e) => e.offending_index(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = InterpreterError::UnknownRule {
            name: "expr".to_string(),
        };
        assert_eq!(err.error_code(), codes::interpreter::UNKNOWN_RULE);
        assert!(!err.is_recoverable());
        assert_eq!(err.index(), None);

        let err = InterpreterError::MismatchedInput {
            index: 3,
            found: "';'".to_string(),
            expected: "ID".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.index(), Some(3));
        assert_eq!(
            err.to_string(),
            "mismatched input ';' at token 3, expecting ID"
        );
    }
}
