//! Parser adaptive prediction
//!
//! `adaptive_predict` first walks the decision's DFA. On a missing edge it
//! simulates the ATN for one symbol (reach then closure), classifies the
//! resulting configuration set and installs it as a new DFA state. A state
//! whose alternatives conflict under SLL is marked as requiring full
//! context; unless running SLL only, prediction then restarts from the
//! decision with the caller's real call stack and never caches the result.

use super::error::{PredictionError, PredictionResult, ResourceExhausted, ResourceLimit};
use super::stats::{DecisionStats, PredictionStats};
use super::PredictionMode;
use crate::atn::{Atn, StateId, Transition, EOF, EPSILON, INVALID_ALT};
use crate::config::PredictionPreferences;
use crate::configs::conflicts::{
    all_configs_in_rule_stop_states, all_subsets_conflict, all_subsets_equal, get_alts,
    get_conflicting_alt_subsets, has_config_in_rule_stop_state,
    has_sll_conflict_terminating_prediction, resolves_to_just_one_viable_alt, unique_alt_of,
};
use crate::configs::{AtnConfig, AtnConfigSet};
use crate::context::{ContextArena, ContextId};
use crate::dfa::{CacheGeneration, Dfa, DfaState, Edge, PredPrediction, PredictionCache};
use crate::input::TokenStream;
use crate::listener::{DecisionEvent, PredictionListener};
use crate::logging::codes;
use crate::recognizer::Recognizer;
use crate::semantic::SemanticContext;
use crate::utils::AltSet;
use crate::{log_debug, log_warning};
use std::collections::HashSet;
use std::sync::Arc;

pub struct ParserAtnSimulator {
    atn: Arc<Atn>,
    cache: Arc<PredictionCache>,
    preferences: PredictionPreferences,
    listeners: Vec<Arc<dyn PredictionListener>>,
    stats: PredictionStats,
}

impl ParserAtnSimulator {
    pub fn new(cache: Arc<PredictionCache>) -> Self {
        Self::with_preferences(cache, PredictionPreferences::default())
    }

    pub fn with_preferences(cache: Arc<PredictionCache>, preferences: PredictionPreferences) -> Self {
        let atn = cache.atn().clone();
        let stats = PredictionStats::new(atn.number_of_decisions());
        Self {
            atn,
            cache,
            preferences,
            listeners: Vec::new(),
            stats,
        }
    }

    pub fn atn(&self) -> &Arc<Atn> {
        &self.atn
    }

    pub fn cache(&self) -> &Arc<PredictionCache> {
        &self.cache
    }

    pub fn preferences(&self) -> &PredictionPreferences {
        &self.preferences
    }

    pub fn prediction_mode(&self) -> PredictionMode {
        self.preferences.mode
    }

    pub fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.preferences.mode = mode;
    }

    pub fn add_listener(&mut self, listener: Arc<dyn PredictionListener>) {
        self.listeners.push(listener);
    }

    pub fn stats(&self) -> &PredictionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Predict the alternative of `decision` for the input at the cursor.
    ///
    /// `call_stack` holds the invoking states of the active rules, outermost
    /// first; it is only consulted when SLL lookahead conflicts. The input is
    /// restored to where it was on return, whatever the outcome.
    ///
    /// When the shared context arena is full, the cache is renewed and the
    /// prediction retried once on the fresh generation.
    pub fn adaptive_predict<I: TokenStream + ?Sized>(
        &mut self,
        input: &mut I,
        decision: usize,
        call_stack: &[StateId],
        recognizer: &mut dyn Recognizer,
    ) -> PredictionResult<usize> {
        if let Some(stats) = self.stats.decision_mut(decision) {
            stats.invocations += 1;
        }
        let start_index = input.index();
        let generation = self.cache.snapshot();
        let mut result = self.predict_in(&generation, input, decision, call_stack, recognizer);

        let arena_full = matches!(
            &result,
            Err(PredictionError::ResourceExhausted(e)) if e.limit == ResourceLimit::ArenaNodes
        );
        if arena_full {
            self.cache.renew(&generation);
            let fresh = self.cache.snapshot();
            result = self.predict_in(&fresh, input, decision, call_stack, recognizer);
        }

        if let Err(e) = &result {
            if let Some(stats) = self.stats.decision_mut(decision) {
                stats.errors += 1;
            }
            log_debug!(
                "Prediction failed",
                "decision" => decision,
                "start_index" => start_index,
                "error" => e
            );
        }
        result
    }

    fn predict_in<I: TokenStream + ?Sized>(
        &mut self,
        generation: &CacheGeneration,
        input: &mut I,
        decision: usize,
        call_stack: &[StateId],
        recognizer: &mut dyn Recognizer,
    ) -> PredictionResult<usize> {
        let Some(dfa) = generation.dfa(decision) else {
            return Err(PredictionError::UnknownDecision {
                decision,
                count: generation.dfas.len(),
            });
        };

        let mut fallback_stats = DecisionStats::default();
        let stats = match self.stats.decision_mut(decision) {
            Some(stats) => stats,
            None => &mut fallback_stats,
        };

        let start_index = input.index();
        let mut prediction = Prediction {
            atn: &self.atn,
            generation,
            dfa,
            preferences: &self.preferences,
            listeners: &self.listeners,
            stats,
            recognizer,
            input,
            start_index,
            call_stack,
        };
        let result = prediction.predict();
        prediction.input.seek(start_index);
        result
    }
}

/// Borrowed state of one `adaptive_predict` call
struct Prediction<'a, I: TokenStream + ?Sized> {
    atn: &'a Atn,
    generation: &'a CacheGeneration,
    dfa: &'a Dfa,
    preferences: &'a PredictionPreferences,
    listeners: &'a [Arc<dyn PredictionListener>],
    stats: &'a mut DecisionStats,
    recognizer: &'a mut dyn Recognizer,
    input: &'a mut I,
    start_index: usize,
    call_stack: &'a [StateId],
}

/// Visited key for one closure pass: the configuration plus whether it has
/// left the decision rule, plus whether predicates are still collected
type ClosureKey = (AtnConfig, bool, bool);

struct ClosureWork {
    config: AtnConfig,
    depth: isize,
    collect_predicates: bool,
    check_stop: bool,
}

enum Step {
    Target(Arc<DfaState>),
    Error,
}

impl<'a, I: TokenStream + ?Sized> Prediction<'a, I> {
    fn arena(&self) -> &'a ContextArena {
        &self.generation.arena
    }

    fn mode(&self) -> PredictionMode {
        self.preferences.mode
    }

    fn use_cache(&self) -> bool {
        self.preferences.enable_dfa_cache
    }

    fn predict(&mut self) -> PredictionResult<usize> {
        let cached = if self.use_cache() { self.dfa.s0() } else { None };
        let s0 = match cached {
            Some(s0) => s0,
            None => {
                let configs =
                    self.compute_start_state(self.dfa.atn_start_state, ContextId::EMPTY, false)?;
                let state = self.dfa.new_state(configs);
                if self.use_cache() {
                    self.dfa.set_s0(self.dfa.add_state(state))
                } else {
                    Arc::new(state)
                }
            }
        };
        self.exec_atn(s0)
    }

    fn check_lookahead(&self, lookahead: usize) -> Result<(), ResourceExhausted> {
        if lookahead > self.preferences.max_lookahead {
            return Err(ResourceExhausted::new(
                ResourceLimit::Lookahead,
                self.preferences.max_lookahead,
                lookahead,
            ));
        }
        Ok(())
    }

    // ========================================================================
    // SLL SIMULATION OVER THE DFA
    // ========================================================================

    fn exec_atn(&mut self, s0: Arc<DfaState>) -> PredictionResult<usize> {
        let mut previous = s0;
        let mut t = self.input.la(1);
        let mut lookahead = 0usize;

        loop {
            lookahead += 1;
            self.check_lookahead(lookahead)?;

            let cached = if self.use_cache() {
                self.dfa.edge(&previous, t)
            } else {
                None
            };
            let step = match cached {
                Some(Edge::Target(d)) => {
                    self.stats.dfa_hits += 1;
                    Step::Target(d)
                }
                Some(Edge::Error) => {
                    self.stats.dfa_hits += 1;
                    Step::Error
                }
                None => {
                    self.stats.dfa_misses += 1;
                    if self.preferences.log_dfa_misses {
                        log_debug!(
                            "DFA miss",
                            "decision" => self.dfa.decision,
                            "state" => previous.state_number,
                            "symbol" => self.atn.symbol_display_name(t)
                        );
                    }
                    self.compute_target_state(&previous, t)?
                }
            };

            let d = match step {
                Step::Target(d) => d,
                Step::Error => {
                    self.stats.record_sll(lookahead as u64);
                    return self.no_viable_or_recover(&previous.configs);
                }
            };

            if d.requires_full_context && self.mode() != PredictionMode::Sll {
                self.stats.record_sll(lookahead as u64);
                return self.escalate_to_full_context(&d);
            }

            if d.is_accept_state {
                self.stats.record_sll(lookahead as u64);
                if d.requires_full_context && self.preferences.report_sll_conflicts {
                    let alts = d.configs.conflicting_alts.clone().unwrap_or_default();
                    let stop_index = self.input.index();
                    self.report_ambiguity(alts, false, d.prediction, stop_index);
                }
                return self.accept(&d);
            }

            previous = d;
            if t != EOF {
                self.input.consume();
                t = self.input.la(1);
            }
        }
    }

    fn accept(&mut self, d: &DfaState) -> PredictionResult<usize> {
        let Some(predicates) = &d.predicates else {
            return Ok(d.prediction);
        };

        let stop_index = self.input.index();
        self.input.seek(self.start_index);
        let alts = self.eval_semantic_context(predicates, true);
        match alts.first() {
            Some(&alt) => Ok(alt),
            None => Err(self.no_viable_alternative(stop_index, &d.configs)),
        }
    }

    fn escalate_to_full_context(&mut self, d: &DfaState) -> PredictionResult<usize> {
        let conflicting = d
            .configs
            .conflicting_alts
            .clone()
            .unwrap_or_else(|| d.configs.alts());

        if let Some(predicates) = &d.predicates {
            let conflict_index = self.input.index();
            self.input.seek(self.start_index);
            let alts = self.eval_semantic_context(predicates, true);
            if alts.len() == 1 {
                if let Some(&alt) = alts.first() {
                    return Ok(alt);
                }
            }
            self.input.seek(conflict_index);
        }

        self.stats.ll_fallbacks += 1;
        let stop_index = self.input.index();
        let event = self.event(conflicting, false, INVALID_ALT, stop_index);
        for listener in self.listeners {
            listener.report_attempting_full_context(&event);
        }

        let context = self.arena().from_call_stack(self.atn, self.call_stack)?;
        let s0 = self.compute_start_state(self.dfa.atn_start_state, context, true)?;
        self.exec_atn_with_full_context(s0)
    }

    /// Compute the DFA state reached from `previous` on `t`, install it and
    /// add the edge
    fn compute_target_state(&mut self, previous: &Arc<DfaState>, t: i32) -> PredictionResult<Step> {
        let Some(reach) = self.compute_reach_set(&previous.configs, t, false)? else {
            if self.use_cache() {
                self.dfa.add_error_edge(previous, t);
            }
            return Ok(Step::Error);
        };

        let mut d = self.dfa.new_state(reach);
        let predicted = unique_alt_of(&d.configs);
        if predicted != INVALID_ALT {
            d.is_accept_state = true;
            d.configs.unique_alt = predicted;
            d.prediction = predicted;
        } else if has_sll_conflict_terminating_prediction(
            self.mode(),
            &d.configs,
            self.atn,
            self.arena(),
        )? {
            let conflicting = get_alts(&get_conflicting_alt_subsets(&d.configs));
            d.prediction = conflicting.first().copied().unwrap_or(INVALID_ALT);
            d.configs.conflicting_alts = Some(conflicting);
            d.requires_full_context = true;
            d.is_accept_state = true;
        }

        if d.is_accept_state && d.configs.has_semantic_context {
            self.predicate_dfa_state(&mut d);
        }

        if !self.use_cache() {
            return Ok(Step::Target(Arc::new(d)));
        }
        let d = self.dfa.add_state(d);
        self.dfa.add_edge(previous, t, &d);
        Ok(Step::Target(d))
    }

    /// Attach (predicate, alt) pairs to an accept state whose alternatives
    /// are distinguished by predicates
    fn predicate_dfa_state(&self, d: &mut DfaState) {
        let alt_count = self
            .atn
            .state(self.dfa.atn_start_state)
            .transitions
            .len();
        let ambig_alts = match &d.configs.conflicting_alts {
            Some(alts) => alts.clone(),
            None => AltSet::from([d.configs.unique_alt]),
        };

        match preds_for_ambig_alts(&ambig_alts, &d.configs, alt_count) {
            Some(alt_to_pred) => {
                d.predicates = predicate_predictions(&ambig_alts, &alt_to_pred);
                d.prediction = INVALID_ALT;
                if d.predicates.is_none() {
                    d.prediction = ambig_alts.first().copied().unwrap_or(INVALID_ALT);
                }
            }
            None => {
                d.prediction = ambig_alts.first().copied().unwrap_or(INVALID_ALT);
            }
        }
    }

    /// Alternatives whose predicate holds, in pair order. With `complete`
    /// false, stops at the first one.
    fn eval_semantic_context(&mut self, predicates: &[PredPrediction], complete: bool) -> AltSet {
        let mut alts = AltSet::new();
        for pair in predicates {
            if pair.pred.is_none() {
                alts.insert(pair.alt);
                if !complete {
                    break;
                }
                continue;
            }
            self.stats.predicate_evals += 1;
            if pair.pred.eval(self.recognizer, self.start_index) {
                alts.insert(pair.alt);
                if !complete {
                    break;
                }
            }
        }
        alts
    }

    // ========================================================================
    // FULL-CONTEXT SIMULATION
    // ========================================================================

    fn exec_atn_with_full_context(&mut self, s0: AtnConfigSet) -> PredictionResult<usize> {
        self.input.seek(self.start_index);
        let mut previous = s0;
        let mut t = self.input.la(1);
        let mut lookahead = 0usize;
        let mut found_exact_ambig = false;
        let mut predicted;

        let reach = loop {
            lookahead += 1;
            self.check_lookahead(lookahead)?;

            let Some(mut reach) = self.compute_reach_set(&previous, t, true)? else {
                self.stats.record_ll(lookahead as u64);
                return self.no_viable_or_recover(&previous);
            };

            let subsets = get_conflicting_alt_subsets(&reach);
            reach.unique_alt = unique_alt_of(&reach);
            if reach.unique_alt != INVALID_ALT {
                predicted = reach.unique_alt;
                break reach;
            }
            if self.mode() != PredictionMode::LlExactAmbigDetection {
                predicted = resolves_to_just_one_viable_alt(&subsets);
                if predicted != INVALID_ALT {
                    break reach;
                }
            } else if all_subsets_conflict(&subsets) && all_subsets_equal(&subsets) {
                found_exact_ambig = true;
                predicted = resolves_to_just_one_viable_alt(&subsets);
                break reach;
            }

            previous = reach;
            if t != EOF {
                self.input.consume();
                t = self.input.la(1);
            }
        };
        self.stats.record_ll(lookahead as u64);

        let stop_index = self.input.index();
        if reach.unique_alt != INVALID_ALT {
            if self.preferences.report_context_sensitivity {
                self.stats.context_sensitivities += 1;
                let event = self.event(AltSet::from([predicted]), false, predicted, stop_index);
                for listener in self.listeners {
                    listener.report_context_sensitivity(&event);
                }
            }
            return Ok(predicted);
        }

        self.report_ambiguity(reach.alts(), found_exact_ambig, predicted, stop_index);
        Ok(predicted)
    }

    // ========================================================================
    // REACH AND CLOSURE
    // ========================================================================

    fn compute_start_state(
        &mut self,
        state: StateId,
        context: ContextId,
        full_ctx: bool,
    ) -> PredictionResult<AtnConfigSet> {
        let mut configs = AtnConfigSet::new(full_ctx);
        let mut busy = HashSet::new();
        for (i, transition) in self.atn.state(state).transitions.iter().enumerate() {
            let config = AtnConfig::new(transition.target(), i + 1, context);
            self.closure(config, &mut configs, &mut busy, true, full_ctx, false)?;
        }
        Ok(configs)
    }

    /// Configurations reached from `closure` by consuming `t`, closed over
    /// epsilon moves. `None` when nothing survives.
    fn compute_reach_set(
        &mut self,
        closure: &AtnConfigSet,
        t: i32,
        full_ctx: bool,
    ) -> PredictionResult<Option<AtnConfigSet>> {
        let arena = self.arena();
        let mut intermediate = AtnConfigSet::new(full_ctx);
        let mut skipped_stop_states = Vec::new();

        for config in closure {
            let state = self.atn.state(config.state);
            if state.is_rule_stop() {
                if full_ctx || t == EOF {
                    skipped_stop_states.push(config.clone());
                }
                continue;
            }
            for transition in &state.transitions {
                if transition.matches(t, 0, self.atn.max_token_type) {
                    intermediate.add(config.with_state(transition.target()), arena)?;
                }
            }
        }

        // a single configuration, or one alternative, cannot conflict; the
        // closure is deferred to the next step
        let skip_closure = skipped_stop_states.is_empty()
            && t != EOF
            && (intermediate.len() == 1 || unique_alt_of(&intermediate) != INVALID_ALT);

        let mut reach = if skip_closure {
            intermediate
        } else {
            let mut reach = AtnConfigSet::new(full_ctx);
            let mut busy = HashSet::new();
            let treat_eof_as_epsilon = t == EOF;
            for config in intermediate.iter() {
                self.closure(
                    config.clone(),
                    &mut reach,
                    &mut busy,
                    false,
                    full_ctx,
                    treat_eof_as_epsilon,
                )?;
            }
            reach
        };

        if t == EOF {
            reach = self.remove_all_configs_not_in_rule_stop_state(reach, skip_closure)?;
        }

        if !skipped_stop_states.is_empty()
            && (!full_ctx || !has_config_in_rule_stop_state(&reach, self.atn))
        {
            for config in skipped_stop_states {
                reach.add(config, arena)?;
            }
        }

        Ok(if reach.is_empty() { None } else { Some(reach) })
    }

    /// At EOF only configurations that finished their rule can match.
    /// With `look_to_end_of_rule`, configurations that can still reach the
    /// rule end by epsilon moves are moved there.
    fn remove_all_configs_not_in_rule_stop_state(
        &self,
        configs: AtnConfigSet,
        look_to_end_of_rule: bool,
    ) -> Result<AtnConfigSet, ResourceExhausted> {
        if all_configs_in_rule_stop_states(&configs, self.atn) {
            return Ok(configs);
        }

        let mut result = AtnConfigSet::new(configs.full_ctx);
        for config in &configs {
            let state = self.atn.state(config.state);
            if state.is_rule_stop() {
                result.add(config.clone(), self.arena())?;
                continue;
            }
            if look_to_end_of_rule
                && state.only_has_epsilon_transitions()
                && self.atn.next_tokens(config.state).contains(EPSILON)
            {
                let end = self.atn.rule_to_stop_state[state.rule_index];
                result.add(config.with_state(end), self.arena())?;
            }
        }
        Ok(result)
    }

    /// Add every configuration reachable from `start` by epsilon moves
    fn closure(
        &mut self,
        start: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut HashSet<ClosureKey>,
        collect_predicates: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) -> Result<(), ResourceExhausted> {
        let arena = self.arena();
        let rule_count = self.atn.rule_names.len() as isize;
        let mut left_recursion_reported = false;

        let mut work = vec![ClosureWork {
            config: start,
            depth: 0,
            collect_predicates,
            check_stop: true,
        }];

        while let Some(ClosureWork {
            config,
            depth,
            collect_predicates,
            check_stop,
        }) = work.pop()
        {
            let state = self.atn.state(config.state);

            if check_stop && state.is_rule_stop() {
                if !config.context.is_empty() {
                    let entries = arena.entries(config.context);
                    for entry in entries.iter().rev() {
                        if entry.is_empty_path() {
                            if full_ctx {
                                configs.add(
                                    config.with_state_and_context(config.state, ContextId::EMPTY),
                                    arena,
                                )?;
                            } else {
                                // no caller information: chase the follow links
                                work.push(ClosureWork {
                                    config: config.clone(),
                                    depth,
                                    collect_predicates,
                                    check_stop: false,
                                });
                            }
                            continue;
                        }
                        let returned = AtnConfig {
                            state: entry.return_state,
                            context: entry.parent,
                            ..config.clone()
                        };
                        work.push(ClosureWork {
                            config: returned,
                            depth: depth - 1,
                            collect_predicates,
                            check_stop: true,
                        });
                    }
                    continue;
                } else if full_ctx {
                    configs.add(config, arena)?;
                    continue;
                }
            }

            if !state.only_has_epsilon_transitions() {
                configs.add(config.clone(), arena)?;
            }

            for transition in state.transitions.iter().rev() {
                let continue_collecting =
                    collect_predicates && !matches!(transition, Transition::Action { .. });
                let Some(mut next) = self.epsilon_target(
                    &config,
                    transition,
                    continue_collecting,
                    depth == 0,
                    full_ctx,
                    treat_eof_as_epsilon,
                )?
                else {
                    continue;
                };

                let mut next_depth = depth;
                if state.is_rule_stop() {
                    // fell off the end of the decision rule into a caller
                    next.reaches_into_outer_context += 1;
                    if !busy.insert((next.clone(), true, continue_collecting)) {
                        continue;
                    }
                    configs.dips_into_outer_context = true;
                    next_depth -= 1;
                } else {
                    let key = (
                        next.clone(),
                        next.reaches_into_outer_context > 0,
                        continue_collecting,
                    );
                    if !busy.insert(key) {
                        continue;
                    }
                    if matches!(transition, Transition::Rule { .. }) && next_depth >= 0 {
                        next_depth += 1;
                        if next_depth > rule_count {
                            if !left_recursion_reported {
                                left_recursion_reported = true;
                                log_warning!(
                                    code = codes::prediction::LEFT_RECURSION_DETECTED,
                                    "Closure entered a rule recursively without consuming input",
                                    "decision" => self.dfa.decision,
                                    "rule" => self.atn.rule_name(state.rule_index)
                                );
                            }
                            continue;
                        }
                    }
                }

                work.push(ClosureWork {
                    config: next,
                    depth: next_depth,
                    collect_predicates: continue_collecting,
                    check_stop: true,
                });
            }
        }
        Ok(())
    }

    fn epsilon_target(
        &mut self,
        config: &AtnConfig,
        transition: &Transition,
        collect_predicates: bool,
        in_context: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) -> Result<Option<AtnConfig>, ResourceExhausted> {
        let target = transition.target();
        Ok(match transition {
            Transition::Rule { follow_state, .. } => {
                let context = self.arena().push(config.context, *follow_state)?;
                Some(config.with_state_and_context(target, context))
            }
            Transition::Predicate {
                is_ctx_dependent, ..
            } => {
                let evaluate = collect_predicates && (!is_ctx_dependent || in_context);
                self.predicate_target(config, transition, evaluate, full_ctx)
            }
            Transition::Precedence { .. } => {
                self.predicate_target(config, transition, collect_predicates && in_context, full_ctx)
            }
            Transition::Epsilon { .. } | Transition::Action { .. } => Some(config.with_state(target)),
            Transition::Atom { .. } | Transition::Range { .. } | Transition::Set { .. } => {
                if treat_eof_as_epsilon && transition.matches(EOF, 0, 1) {
                    Some(config.with_state(target))
                } else {
                    None
                }
            }
            Transition::NotSet { .. } | Transition::Wildcard { .. } => None,
        })
    }

    /// Follow a predicate edge. In SLL the predicate is recorded on the
    /// configuration; in full-context prediction it is evaluated now, at the
    /// decision's start position, and the edge is dropped if it fails.
    fn predicate_target(
        &mut self,
        config: &AtnConfig,
        transition: &Transition,
        evaluate: bool,
        full_ctx: bool,
    ) -> Option<AtnConfig> {
        let target = transition.target();
        let predicate = match transition.predicate() {
            Some(predicate) if evaluate => predicate,
            _ => return Some(config.with_state(target)),
        };

        if full_ctx {
            self.stats.predicate_evals += 1;
            if predicate.eval(self.recognizer, self.start_index) {
                Some(config.with_state(target))
            } else {
                None
            }
        } else {
            Some(AtnConfig {
                state: target,
                semantic_context: SemanticContext::and(&config.semantic_context, &predicate),
                ..config.clone()
            })
        }
    }

    // ========================================================================
    // ERRORS AND REPORTING
    // ========================================================================

    /// A dead end fails with the offending symbol's index. With
    /// `recover_at_rule_end`, an alternative that already finished the
    /// decision rule (preferring ones whose predicates hold) is predicted
    /// instead, so the parser reports the error where the rule ends.
    fn no_viable_or_recover(&mut self, configs: &AtnConfigSet) -> PredictionResult<usize> {
        let offending_index = self.input.index();
        if !self.preferences.recover_at_rule_end {
            return Err(self.no_viable_alternative(offending_index, configs));
        }
        self.input.seek(self.start_index);

        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for config in configs {
            if config.semantic_context.is_none() {
                valid.push(config);
                continue;
            }
            self.stats.predicate_evals += 1;
            if config
                .semantic_context
                .eval(self.recognizer, self.start_index)
            {
                valid.push(config);
            } else {
                invalid.push(config);
            }
        }

        for group in [&valid, &invalid] {
            let alt = self.alt_that_finished_decision_entry_rule(group);
            if alt != INVALID_ALT {
                return Ok(alt);
            }
        }
        Err(self.no_viable_alternative(offending_index, configs))
    }

    fn alt_that_finished_decision_entry_rule(&self, configs: &[&AtnConfig]) -> usize {
        configs
            .iter()
            .filter(|c| {
                c.reaches_into_outer_context > 0
                    || (self.atn.state(c.state).is_rule_stop()
                        && self.arena().has_empty_path(c.context))
            })
            .map(|c| c.alt)
            .min()
            .unwrap_or(INVALID_ALT)
    }

    fn no_viable_alternative(&self, offending_index: usize, configs: &AtnConfigSet) -> PredictionError {
        let offending_symbol = self
            .input
            .get(offending_index)
            .map(|token| self.atn.symbol_display_name(token.token_type))
            .unwrap_or_else(|| self.atn.symbol_display_name(EOF));
        PredictionError::NoViableAlternative {
            decision: self.dfa.decision,
            start_index: self.start_index,
            offending_index,
            offending_symbol,
            configs: configs.summary(),
        }
    }

    fn event(&self, alts: AltSet, exact: bool, prediction: usize, stop_index: usize) -> DecisionEvent {
        DecisionEvent {
            decision: self.dfa.decision,
            start_index: self.start_index,
            stop_index,
            alts,
            exact,
            prediction,
        }
    }

    fn report_ambiguity(&mut self, alts: AltSet, exact: bool, prediction: usize, stop_index: usize) {
        self.stats.ambiguities += 1;
        let event = self.event(alts, exact, prediction, stop_index);
        for listener in self.listeners {
            listener.report_ambiguity(&event);
        }
    }
}

/// Disjunction of the predicates each ambiguous alternative was reached
/// under, indexed by alternative. `None` when no alternative is predicated.
fn preds_for_ambig_alts(
    ambig_alts: &AltSet,
    configs: &AtnConfigSet,
    alt_count: usize,
) -> Option<Vec<SemanticContext>> {
    let mut alt_to_pred: Vec<Option<SemanticContext>> = vec![None; alt_count + 1];
    for config in configs {
        if ambig_alts.contains(&config.alt) && config.alt <= alt_count {
            let slot = &mut alt_to_pred[config.alt];
            *slot = Some(match slot.take() {
                None => config.semantic_context.clone(),
                Some(existing) => SemanticContext::or(&existing, &config.semantic_context),
            });
        }
    }

    let resolved: Vec<SemanticContext> = alt_to_pred
        .into_iter()
        .map(|p| p.unwrap_or(SemanticContext::None))
        .collect();
    let predicated = resolved.iter().skip(1).filter(|p| !p.is_none()).count();
    (predicated > 0).then_some(resolved)
}

fn predicate_predictions(
    ambig_alts: &AltSet,
    alt_to_pred: &[SemanticContext],
) -> Option<Vec<PredPrediction>> {
    let mut pairs = Vec::new();
    let mut contains_predicate = false;
    for (alt, pred) in alt_to_pred.iter().enumerate().skip(1) {
        if ambig_alts.contains(&alt) {
            pairs.push(PredPrediction {
                pred: pred.clone(),
                alt,
            });
        }
        if !pred.is_none() {
            contains_predicate = true;
        }
    }
    contains_predicate.then_some(pairs)
}
