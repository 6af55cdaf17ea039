//! Lexer errors

use crate::logging::{codes, Code};
use crate::simulator::{ResourceExhausted, ResourceLimit};

pub type LexerResult<T> = Result<T, LexerError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    /// No token rule can continue at `offending_index`
    #[error("token recognition error at {line}:{column}: '{text}'")]
    NoViableAlternative {
        start_index: usize,
        offending_index: usize,
        line: usize,
        column: usize,
        text: String,
    },

    #[error(transparent)]
    ResourceExhausted(#[from] ResourceExhausted),

    #[error("popMode with an empty mode stack")]
    EmptyModeStack,

    #[error("mode stack exceeded {depth} entries")]
    ModeStackOverflow { depth: usize },

    #[error("unknown lexer mode {mode}")]
    UnknownMode { mode: usize },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NoViableAlternative { .. } => codes::lexer::TOKEN_RECOGNITION_ERROR,
            Self::ResourceExhausted(e) if e.limit == ResourceLimit::TokenLength => {
                codes::lexer::TOKEN_TOO_LONG
            }
            Self::ResourceExhausted(_) => codes::prediction::RESOURCE_EXHAUSTED,
            Self::EmptyModeStack => codes::lexer::EMPTY_MODE_STACK,
            Self::ModeStackOverflow { .. } => codes::lexer::MODE_STACK_OVERFLOW,
            Self::UnknownMode { .. } => codes::lexer::UNKNOWN_MODE,
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
        let err = LexerError::NoViableAlternative {
            start_index: 0,
            offending_index: 0,
            line: 1,
            column: 0,
            text: "#".to_string(),
        };
        assert_eq!(err.error_code(), codes::lexer::TOKEN_RECOGNITION_ERROR);
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "token recognition error at 1:0: '#'");

        let err = LexerError::from(ResourceExhausted::new(ResourceLimit::TokenLength, 4, 5));
        assert_eq!(err.error_code(), codes::lexer::TOKEN_TOO_LONG);
    }
}
