//! ATN simulators
//!
//! [`ParserAtnSimulator`] answers "which alternative" at a parser decision
//! and [`LexerAtnSimulator`] answers "which token" at a lexer position. Both
//! read and extend the DFAs in a shared [`PredictionCache`](crate::dfa::PredictionCache).

pub mod error;
pub mod lexer;
pub mod parser;
pub mod stats;

pub use error::{ConfigSummary, PredictionError, PredictionResult, ResourceExhausted, ResourceLimit};
pub use lexer::{LexerAtnSimulator, LexerMatch};
pub use parser::ParserAtnSimulator;
pub use stats::{DecisionStats, PredictionStats};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far prediction escalates when SLL lookahead finds a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    /// Resolve every conflict to its lowest alternative without full context
    Sll,
    /// Retry SLL conflicts with the real call stack; stop as soon as the
    /// remaining conflicts all resolve to the same alternative
    #[default]
    Ll,
    /// Like `Ll`, but keep consuming until the conflict is a true ambiguity
    LlExactAmbigDetection,
}

impl PredictionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMode::Sll => "sll",
            PredictionMode::Ll => "ll",
            PredictionMode::LlExactAmbigDetection => "ll_exact_ambig_detection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sll" => Some(PredictionMode::Sll),
            "ll" => Some(PredictionMode::Ll),
            "ll_exact_ambig_detection" | "ll-exact-ambig-detection" | "exact" => {
                Some(PredictionMode::LlExactAmbigDetection)
            }
            _ => None,
        }
    }
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
