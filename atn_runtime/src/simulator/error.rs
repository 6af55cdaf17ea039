//! Prediction errors

use crate::logging::{codes, Code};
use crate::utils::AltSet;
use std::fmt;

pub type PredictionResult<T> = Result<T, PredictionError>;

/// Which ceiling a prediction or match ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceLimit {
    Lookahead,
    ConfigSetSize,
    ContextDepth,
    ArenaNodes,
    TokenLength,
}

impl ResourceLimit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceLimit::Lookahead => "lookahead",
            ResourceLimit::ConfigSetSize => "configuration set size",
            ResourceLimit::ContextDepth => "context depth",
            ResourceLimit::ArenaNodes => "context arena size",
            ResourceLimit::TokenLength => "token length",
        }
    }
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ceiling was exceeded. Fatal to the call that hit it; the shared cache
/// is left consistent and later calls proceed normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{limit} limit of {ceiling} exceeded (observed {observed})")]
pub struct ResourceExhausted {
    pub limit: ResourceLimit,
    pub ceiling: usize,
    pub observed: usize,
}

impl ResourceExhausted {
    pub fn new(limit: ResourceLimit, ceiling: usize, observed: usize) -> Self {
        Self {
            limit,
            ceiling,
            observed,
        }
    }
}

/// Short description of the last live configuration set, kept on
/// no-viable-alternative errors for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSummary {
    pub config_count: usize,
    pub alts: AltSet,
    pub full_context: bool,
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} configs, alts {}{}",
            self.config_count,
            crate::utils::format_alts(&self.alts),
            if self.full_context { ", full context" } else { "" }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// No alternative survives at `offending_index`
    #[error(
        "no viable alternative for decision {decision} at input {offending_index} ({offending_symbol}), prediction started at {start_index}"
    )]
    NoViableAlternative {
        decision: usize,
        start_index: usize,
        offending_index: usize,
        offending_symbol: String,
        configs: ConfigSummary,
    },

    #[error(transparent)]
    ResourceExhausted(#[from] ResourceExhausted),

    #[error("decision {decision} does not exist (automaton has {count})")]
    UnknownDecision { decision: usize, count: usize },
}

impl PredictionError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NoViableAlternative { .. } => codes::prediction::NO_VIABLE_ALTERNATIVE,
            Self::ResourceExhausted(_) => codes::prediction::RESOURCE_EXHAUSTED,
            Self::UnknownDecision { .. } => codes::prediction::UNKNOWN_DECISION,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Input index of the offending symbol, when there is one
    pub fn offending_index(&self) -> Option<usize> {
        match self {
            Self::NoViableAlternative {
                offending_index, ..
            } => Some(*offending_index),
            _ => None,
        }
    }
}
