//! Prediction diagnostics
//!
//! Ambiguity and context sensitivity are not errors: prediction still
//! returns an alternative. Listeners receive them as events.

use crate::config::compile_time;
use crate::logging::codes;
use crate::utils::{format_alts, AltSet};
use crate::{log_debug, log_success, log_warning};
use std::sync::{Mutex, PoisonError};

/// What a diagnostic is about: a decision over `start_index..=stop_index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEvent {
    pub decision: usize,
    pub start_index: usize,
    pub stop_index: usize,
    /// Conflicting alternatives (ambiguity, full-context attempt)
    pub alts: AltSet,
    /// True when exact ambiguity detection confirmed the ambiguity
    pub exact: bool,
    /// Alternative chosen, or INVALID_ALT when not yet known
    pub prediction: usize,
}

pub trait PredictionListener: Send + Sync {
    /// Several alternatives match the same input under the same context;
    /// the lowest was chosen
    fn report_ambiguity(&self, _event: &DecisionEvent) {}

    /// SLL found a conflict and prediction is retrying with full context
    fn report_attempting_full_context(&self, _event: &DecisionEvent) {}

    /// Full-context prediction resolved a conflict SLL could not
    fn report_context_sensitivity(&self, _event: &DecisionEvent) {}
}

/// Forwards reports to the logging macros
#[derive(Debug, Default, Clone, Copy)]
pub struct DiagnosticListener;

impl PredictionListener for DiagnosticListener {
    fn report_ambiguity(&self, event: &DecisionEvent) {
        log_warning!(
            code = codes::prediction::AMBIGUITY,
            "Ambiguous decision",
            "decision" => event.decision,
            "alts" => format_alts(&event.alts),
            "exact" => event.exact,
            "input" => format!("{}..{}", event.start_index, event.stop_index)
        );
    }

    fn report_attempting_full_context(&self, event: &DecisionEvent) {
        log_debug!(
            "Attempting full-context prediction",
            "decision" => event.decision,
            "alts" => format_alts(&event.alts),
            "input" => format!("{}..{}", event.start_index, event.stop_index)
        );
    }

    fn report_context_sensitivity(&self, event: &DecisionEvent) {
        log_success!(
            codes::success::FULL_CONTEXT_RESOLVED,
            "Full-context prediction resolved conflict",
            "decision" => event.decision,
            "prediction" => event.prediction,
            "input" => format!("{}..{}", event.start_index, event.stop_index)
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Ambiguity,
    AttemptingFullContext,
    ContextSensitivity,
}

/// Keeps reports for inspection, up to MAX_RECORDED_DIAGNOSTICS
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<(DiagnosticKind, DecisionEvent)>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, kind: DiagnosticKind, event: &DecisionEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.len() < compile_time::logging::MAX_RECORDED_DIAGNOSTICS {
            events.push((kind, event.clone()));
        }
    }

    pub fn events(&self) -> Vec<(DiagnosticKind, DecisionEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<DecisionEvent> {
        self.events()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl PredictionListener for RecordingListener {
    fn report_ambiguity(&self, event: &DecisionEvent) {
        self.record(DiagnosticKind::Ambiguity, event);
    }

    fn report_attempting_full_context(&self, event: &DecisionEvent) {
        self.record(DiagnosticKind::AttemptingFullContext, event);
    }

    fn report_context_sensitivity(&self, event: &DecisionEvent) {
        self.record(DiagnosticKind::ContextSensitivity, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> DecisionEvent {
        DecisionEvent {
            decision: 1,
            start_index: 0,
            stop_index: 2,
            alts: [1, 2].into_iter().collect(),
            exact: false,
            prediction: 1,
        }
    }

    #[test]
    fn test_recording_listener_groups_by_kind() {
        let listener = RecordingListener::new();
        listener.report_attempting_full_context(&event());
        listener.report_ambiguity(&event());

        assert_eq!(listener.events().len(), 2);
        assert_eq!(listener.of_kind(DiagnosticKind::Ambiguity), vec![event()]);
        assert!(listener.of_kind(DiagnosticKind::ContextSensitivity).is_empty());

        listener.clear();
        assert!(listener.events().is_empty());
    }

    #[test]
    fn test_diagnostic_listener_without_global_logger() {
        // must not panic when logging was never initialized
        let listener = DiagnosticListener;
        listener.report_ambiguity(&event());
        listener.report_context_sensitivity(&event());
    }
}
