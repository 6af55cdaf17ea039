//! Per-decision prediction statistics
//!
//! Counters are kept per simulator, so sessions never contend on them.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecisionStats {
    pub decision: usize,
    pub invocations: u64,

    pub sll_lookahead_total: u64,
    pub sll_max_lookahead: u64,

    pub ll_fallbacks: u64,
    pub ll_lookahead_total: u64,
    pub ll_max_lookahead: u64,

    pub dfa_hits: u64,
    pub dfa_misses: u64,

    pub ambiguities: u64,
    pub context_sensitivities: u64,
    pub predicate_evals: u64,
    pub errors: u64,
}

impl DecisionStats {
    pub(crate) fn record_sll(&mut self, lookahead: u64) {
        self.sll_lookahead_total += lookahead;
        self.sll_max_lookahead = self.sll_max_lookahead.max(lookahead);
    }

    pub(crate) fn record_ll(&mut self, lookahead: u64) {
        self.ll_lookahead_total += lookahead;
        self.ll_max_lookahead = self.ll_max_lookahead.max(lookahead);
    }

    fn merge(&mut self, other: &DecisionStats) {
        self.invocations += other.invocations;
        self.sll_lookahead_total += other.sll_lookahead_total;
        self.sll_max_lookahead = self.sll_max_lookahead.max(other.sll_max_lookahead);
        self.ll_fallbacks += other.ll_fallbacks;
        self.ll_lookahead_total += other.ll_lookahead_total;
        self.ll_max_lookahead = self.ll_max_lookahead.max(other.ll_max_lookahead);
        self.dfa_hits += other.dfa_hits;
        self.dfa_misses += other.dfa_misses;
        self.ambiguities += other.ambiguities;
        self.context_sensitivities += other.context_sensitivities;
        self.predicate_evals += other.predicate_evals;
        self.errors += other.errors;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionStats {
    decisions: Vec<DecisionStats>,
}

impl PredictionStats {
    pub fn new(decision_count: usize) -> Self {
        Self {
            decisions: (0..decision_count)
                .map(|decision| DecisionStats {
                    decision,
                    ..Default::default()
                })
                .collect(),
        }
    }

    pub fn decision(&self, decision: usize) -> Option<&DecisionStats> {
        self.decisions.get(decision)
    }

    pub(crate) fn decision_mut(&mut self, decision: usize) -> Option<&mut DecisionStats> {
        self.decisions.get_mut(decision)
    }

    pub fn decisions(&self) -> &[DecisionStats] {
        &self.decisions
    }

    /// Sum over all decisions; maxima are taken across decisions
    pub fn total(&self) -> DecisionStats {
        let mut total = DecisionStats::default();
        for stats in &self.decisions {
            total.merge(stats);
        }
        total
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.decisions.len());
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
