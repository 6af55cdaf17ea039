//! Lexer longest-match simulation
//!
//! The lexer walks the mode's DFA one character at a time, simulating the
//! ATN on a missing edge, and remembers the last accept state it passed.
//! When no configuration can continue it rewinds to that accept state: the
//! longest match wins, and among equally long matches the rule listed first
//! in the mode wins because its configurations come first in the ordered
//! configuration set.

use super::error::{ResourceExhausted, ResourceLimit};
use crate::action::LexerActionExecutor;
use crate::atn::{Atn, StateId, Transition, EOF, INVALID_ALT, INVALID_TOKEN_TYPE, MAX_CHAR, MIN_CHAR};
use crate::config::LexerPreferences;
use crate::configs::{AtnConfig, AtnConfigSet};
use crate::context::{ContextArena, ContextId};
use crate::dfa::{Dfa, DfaState, Edge, PredictionCache};
use crate::input::CharStream;
use crate::lexer::{LexerError, LexerResult};
use crate::recognizer::Recognizer;
use crate::log_debug;
use std::collections::HashSet;
use std::sync::Arc;

/// A recognized token: its type, the character range `start..stop`, and
/// the actions to run when the token is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerMatch {
    pub token_type: i32,
    pub start: usize,
    pub stop: usize,
    pub executor: Option<Arc<LexerActionExecutor>>,
}

impl LexerMatch {
    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    index: usize,
    line: usize,
    column: usize,
}

/// Last accept state passed and where the input stood after it
struct Accept {
    position: Position,
    state: Arc<DfaState>,
}

pub struct LexerAtnSimulator {
    atn: Arc<Atn>,
    cache: Arc<PredictionCache>,
    preferences: LexerPreferences,

    /// 1-based line and 0-based column of the input cursor
    line: usize,
    column: usize,
}

impl LexerAtnSimulator {
    pub fn new(cache: Arc<PredictionCache>) -> Self {
        Self::with_preferences(cache, LexerPreferences::default())
    }

    pub fn with_preferences(cache: Arc<PredictionCache>, preferences: LexerPreferences) -> Self {
        Self {
            atn: cache.atn().clone(),
            cache,
            preferences,
            line: 1,
            column: 0,
        }
    }

    pub fn atn(&self) -> &Arc<Atn> {
        &self.atn
    }

    pub fn cache(&self) -> &Arc<PredictionCache> {
        &self.cache
    }

    pub fn preferences(&self) -> &LexerPreferences {
        &self.preferences
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn reset(&mut self) {
        self.line = 1;
        self.column = 0;
    }

    /// Consume one character, tracking line and column
    pub fn consume<I: CharStream + ?Sized>(&mut self, input: &mut I) {
        advance(input, &mut self.line, &mut self.column);
    }

    /// Match the longest token of `mode` at the cursor. On success the
    /// cursor rests after the token; on failure it rests on the character
    /// where no rule could continue.
    pub fn match_token<I: CharStream + ?Sized>(
        &mut self,
        input: &mut I,
        mode: usize,
        recognizer: &mut dyn Recognizer,
    ) -> LexerResult<LexerMatch> {
        let generation = self.cache.snapshot();
        let Some(dfa) = generation.dfa(mode) else {
            return Err(LexerError::UnknownMode { mode });
        };

        let start = Position {
            index: input.index(),
            line: self.line,
            column: self.column,
        };
        let mut scan = Scan {
            atn: &self.atn,
            arena: &generation.arena,
            dfa,
            preferences: &self.preferences,
            recognizer,
            input,
            start,
            line: self.line,
            column: self.column,
            prev_accept: None,
        };
        let result = scan.run();
        self.line = scan.line;
        self.column = scan.column;

        if let Err(e) = &result {
            log_debug!(
                "Token recognition failed",
                "mode" => mode,
                "start_index" => start.index,
                "error" => e
            );
        }
        result
    }
}

fn advance<I: CharStream + ?Sized>(input: &mut I, line: &mut usize, column: &mut usize) {
    match input.la(1) {
        EOF => return,
        c if c == '\n' as i32 => {
            *line += 1;
            *column = 0;
        }
        _ => *column += 1,
    }
    input.consume();
}

/// Borrowed state of one `match_token` call
struct Scan<'a, I: CharStream + ?Sized> {
    atn: &'a Atn,
    arena: &'a ContextArena,
    dfa: &'a Dfa,
    preferences: &'a LexerPreferences,
    recognizer: &'a mut dyn Recognizer,
    input: &'a mut I,
    start: Position,
    line: usize,
    column: usize,
    prev_accept: Option<Accept>,
}

/// Closure visited key; executors are left out so that epsilon loops
/// through actions terminate. The first path to reach a key keeps its
/// actions and later paths with other actions are dropped.
type ClosureKey = (StateId, usize, ContextId, bool);

impl<'a, I: CharStream + ?Sized> Scan<'a, I> {
    fn use_cache(&self) -> bool {
        self.preferences.enable_dfa_cache
    }

    fn run(&mut self) -> LexerResult<LexerMatch> {
        let cached = if self.use_cache() { self.dfa.s0() } else { None };
        let s0 = match cached {
            Some(s0) => s0,
            None => {
                let mut configs = self.compute_start_state()?;
                // predicates were evaluated for this input only
                let suppress = configs.has_semantic_context;
                configs.has_semantic_context = false;
                let state = self.install(configs);
                if suppress || !self.use_cache() {
                    state
                } else {
                    self.dfa.set_s0(state)
                }
            }
        };
        self.exec_atn(s0)
    }

    fn exec_atn(&mut self, s0: Arc<DfaState>) -> LexerResult<LexerMatch> {
        if s0.is_accept_state {
            self.capture(&s0);
        }

        let mut t = self.input.la(1);
        let mut s = s0;
        loop {
            let cached = if self.use_cache() { self.dfa.edge(&s, t) } else { None };
            let target = match cached {
                Some(Edge::Target(target)) => Some(target),
                Some(Edge::Error) => None,
                None => self.compute_target_state(&s, t)?,
            };
            let Some(target) = target else {
                break;
            };

            if t != EOF {
                self.check_length()?;
                advance(self.input, &mut self.line, &mut self.column);
            }
            if target.is_accept_state {
                self.capture(&target);
                if t == EOF {
                    break;
                }
            }
            t = self.input.la(1);
            s = target;
        }
        self.fail_or_accept(t)
    }

    fn check_length(&self) -> Result<(), ResourceExhausted> {
        let length = self.input.index() - self.start.index + 1;
        if length > self.preferences.max_token_length {
            return Err(ResourceExhausted::new(
                ResourceLimit::TokenLength,
                self.preferences.max_token_length,
                length,
            ));
        }
        Ok(())
    }

    fn capture(&mut self, state: &Arc<DfaState>) {
        self.prev_accept = Some(Accept {
            position: Position {
                index: self.input.index(),
                line: self.line,
                column: self.column,
            },
            state: state.clone(),
        });
    }

    fn fail_or_accept(&mut self, t: i32) -> LexerResult<LexerMatch> {
        if let Some(accept) = self.prev_accept.take() {
            self.input.seek(accept.position.index);
            self.line = accept.position.line;
            self.column = accept.position.column;
            return Ok(LexerMatch {
                token_type: accept.state.token_type,
                start: self.start.index,
                stop: accept.position.index,
                executor: accept.state.lexer_executor.clone(),
            });
        }

        if t == EOF && self.input.index() == self.start.index {
            return Ok(LexerMatch {
                token_type: EOF,
                start: self.start.index,
                stop: self.start.index,
                executor: None,
            });
        }

        let offending_index = self.input.index();
        Err(LexerError::NoViableAlternative {
            start_index: self.start.index,
            offending_index,
            line: self.start.line,
            column: self.start.column,
            text: self.input.text(self.start.index, offending_index + 1),
        })
    }

    // ========================================================================
    // DFA CONSTRUCTION
    // ========================================================================

    fn compute_target_state(
        &mut self,
        s: &DfaState,
        t: i32,
    ) -> LexerResult<Option<Arc<DfaState>>> {
        let mut reach = AtnConfigSet::new_ordered();
        self.reachable_config_set(&s.configs, &mut reach, t)?;

        if reach.is_empty() {
            if !reach.has_semantic_context && self.use_cache() {
                self.dfa.add_error_edge(s, t);
            }
            return Ok(None);
        }

        let suppress = reach.has_semantic_context;
        reach.has_semantic_context = false;
        let target = self.install(reach);
        if !suppress && self.use_cache() {
            self.dfa.add_edge(s, t, &target);
        }
        Ok(Some(target))
    }

    /// Build a DFA state; the first configuration at a rule stop decides
    /// the token type and the actions
    fn install(&self, configs: AtnConfigSet) -> Arc<DfaState> {
        let accept = configs
            .iter()
            .find(|c| self.atn.state(c.state).is_rule_stop())
            .map(|c| (c.alt, self.atn.state(c.state).rule_index, c.lexer_executor.clone()));

        let mut state = self.dfa.new_state(configs);
        if let Some((alt, rule_index, executor)) = accept {
            state.is_accept_state = true;
            state.prediction = alt;
            state.token_type = self
                .atn
                .rule_to_token_type
                .get(rule_index)
                .copied()
                .unwrap_or(INVALID_TOKEN_TYPE);
            state.lexer_executor = executor;
        }

        if self.use_cache() {
            self.dfa.add_state(state)
        } else {
            Arc::new(state)
        }
    }

    fn compute_start_state(&mut self) -> LexerResult<AtnConfigSet> {
        let mut configs = AtnConfigSet::new_ordered();
        let start = self.atn.state(self.dfa.atn_start_state);
        for (i, transition) in start.transitions.iter().enumerate() {
            let config = AtnConfig::new(transition.target(), i + 1, ContextId::EMPTY);
            let config = self.derive(&config, transition.target(), ContextId::EMPTY, None);
            self.closure(config, &mut configs, false, false, false)?;
        }
        Ok(configs)
    }

    fn reachable_config_set(
        &mut self,
        closure: &AtnConfigSet,
        reach: &mut AtnConfigSet,
        t: i32,
    ) -> LexerResult<()> {
        // once an alternative reaches a rule stop its non-greedy paths stop
        let mut skip_alt = INVALID_ALT;
        for config in closure.iter() {
            let reached_accept = config.alt == skip_alt;
            if reached_accept && config.passed_through_non_greedy {
                continue;
            }

            let state = self.atn.state(config.state);
            for transition in &state.transitions {
                if !transition.matches(t, MIN_CHAR, MAX_CHAR) {
                    continue;
                }
                let offset = self.input.index() - self.start.index;
                let executor = config
                    .lexer_executor
                    .as_ref()
                    .map(|e| e.fix_offset_before_match(offset).unwrap_or_else(|| e.clone()));
                let next = self.derive(config, transition.target(), config.context, executor);
                if self.closure(next, reach, reached_accept, true, t == EOF)? {
                    skip_alt = config.alt;
                    break;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // CLOSURE
    // ========================================================================

    /// Add everything reachable from `config` by epsilon moves, depth first
    /// so the configuration order stays the rule priority order. Returns
    /// whether the alternative has reached a rule stop.
    fn closure(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        mut reached_accept: bool,
        speculative: bool,
        treat_eof_as_epsilon: bool,
    ) -> LexerResult<bool> {
        let arena = self.arena;
        let mut busy: HashSet<ClosureKey> = HashSet::new();
        let mut stack = vec![config];

        while let Some(config) = stack.pop() {
            let key = (
                config.state,
                config.alt,
                config.context,
                config.passed_through_non_greedy,
            );
            if !busy.insert(key) {
                continue;
            }

            let state = self.atn.state(config.state);
            if state.is_rule_stop() {
                if config.context.is_empty() {
                    configs.add(config, arena)?;
                    reached_accept = true;
                    continue;
                }
                if arena.has_empty_path(config.context) {
                    configs.add(config.with_state_and_context(config.state, ContextId::EMPTY), arena)?;
                    reached_accept = true;
                }
                let entries = arena.entries(config.context);
                for entry in entries.iter().rev().filter(|e| !e.is_empty_path()) {
                    let executor = config.lexer_executor.clone();
                    stack.push(self.derive(&config, entry.return_state, entry.parent, executor));
                }
                continue;
            }

            if !state.only_has_epsilon_transitions()
                && (!reached_accept || !config.passed_through_non_greedy)
            {
                configs.add(config.clone(), arena)?;
            }

            let mut successors = Vec::with_capacity(state.transitions.len());
            for transition in &state.transitions {
                let next = self.epsilon_target(
                    &config,
                    transition,
                    configs,
                    speculative,
                    treat_eof_as_epsilon,
                )?;
                successors.extend(next);
            }
            stack.extend(successors.into_iter().rev());
        }
        Ok(reached_accept)
    }

    fn epsilon_target(
        &mut self,
        config: &AtnConfig,
        transition: &Transition,
        configs: &mut AtnConfigSet,
        speculative: bool,
        treat_eof_as_epsilon: bool,
    ) -> LexerResult<Option<AtnConfig>> {
        let executor = config.lexer_executor.clone();
        let next = match transition {
            Transition::Epsilon { target } => {
                Some(self.derive(config, *target, config.context, executor))
            }
            Transition::Rule {
                target,
                follow_state,
                ..
            } => {
                let context = self.arena.push(config.context, *follow_state)?;
                Some(self.derive(config, *target, context, executor))
            }
            Transition::Predicate {
                target,
                rule_index,
                pred_index,
                ..
            } => {
                configs.has_semantic_context = true;
                if self.evaluate_predicate(*rule_index, *pred_index, speculative) {
                    Some(self.derive(config, *target, config.context, executor))
                } else {
                    None
                }
            }
            Transition::Action {
                target,
                action_index,
                ..
            } => {
                // actions inside a rule called from another token rule are
                // the caller's business once the call returns
                let executor = match self.atn.lexer_actions.get(*action_index) {
                    Some(action) if self.arena.has_empty_path(config.context) => Some(
                        LexerActionExecutor::append(config.lexer_executor.as_ref(), action.clone()),
                    ),
                    _ => executor,
                };
                Some(self.derive(config, *target, config.context, executor))
            }
            Transition::Atom { target, .. }
            | Transition::Range { target, .. }
            | Transition::Set { target, .. }
                if treat_eof_as_epsilon && transition.matches(EOF, MIN_CHAR, MAX_CHAR) =>
            {
                Some(self.derive(config, *target, config.context, executor))
            }
            _ => None,
        };
        Ok(next)
    }

    /// Predicates reached while matching a character see the input just
    /// past that character
    fn evaluate_predicate(&mut self, rule_index: usize, pred_index: usize, speculative: bool) -> bool {
        let position = if speculative {
            self.input.index() + 1
        } else {
            self.input.index()
        };
        self.recognizer.sempred(rule_index, pred_index, position)
    }

    fn derive(
        &self,
        config: &AtnConfig,
        state: StateId,
        context: ContextId,
        executor: Option<Arc<LexerActionExecutor>>,
    ) -> AtnConfig {
        let target = self.atn.state(state);
        AtnConfig {
            state,
            context,
            lexer_executor: executor,
            passed_through_non_greedy: config.passed_through_non_greedy
                || (target.is_decision() && target.non_greedy),
            ..config.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::LexerAction;
    use crate::atn::builder::{AtnBuilder, Element};
    use crate::fixtures::{self, keyword_lexer_tokens as tok};
    use crate::input::{InputStream, IntStream};
    use crate::recognizer::tests::ScriptedRecognizer;
    use crate::recognizer::DefaultRecognizer;
    use assert_matches::assert_matches;

    fn simulator(atn: Atn) -> LexerAtnSimulator {
        LexerAtnSimulator::new(Arc::new(PredictionCache::new(Arc::new(atn))))
    }

    fn match_all(sim: &mut LexerAtnSimulator, text: &str, mode: usize) -> Vec<(i32, String)> {
        let mut input = InputStream::new(text);
        let mut out = Vec::new();
        loop {
            let m = sim.match_token(&mut input, mode, &mut DefaultRecognizer).unwrap();
            if m.is_eof() {
                break;
            }
            out.push((m.token_type, input.text(m.start, m.stop)));
        }
        out
    }

    #[test]
    fn test_longest_match_wins() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let mut input = InputStream::new("iffy");
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();
        assert_eq!(m.token_type, tok::ID);
        assert_eq!((m.start, m.stop), (0, 4));
        assert_eq!(input.index(), 4);
    }

    #[test]
    fn test_earliest_rule_breaks_ties() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let tokens = match_all(&mut sim, "if i", 0);
        let types: Vec<i32> = tokens.iter().map(|(t, _)| *t).collect();
        assert_eq!(types, vec![tok::IF, tok::WS, tok::ID]);
        assert_eq!(tokens[0].1, "if");
    }

    #[test]
    fn test_rewinds_to_last_accept() {
        // "if" followed by a character no rule can extend it with
        let mut sim = simulator(fixtures::keyword_lexer());
        let mut input = InputStream::new("if\"");
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();
        assert_eq!(m.token_type, tok::IF);
        assert_eq!(m.stop, 2);
        assert_eq!(input.la(1), '"' as i32);
    }

    #[test]
    fn test_commands_travel_with_the_match() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let mut input = InputStream::new("\"x");
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();
        assert_eq!(m.token_type, tok::QUOTE);
        let executor = m.executor.unwrap();
        assert_eq!(
            executor.actions(),
            &[LexerAction::PushMode {
                mode: tok::STRING_MODE
            }]
        );

        let m = sim
            .match_token(&mut input, tok::STRING_MODE, &mut DefaultRecognizer)
            .unwrap();
        assert_eq!(m.token_type, tok::TEXT);
        assert_eq!((m.start, m.stop), (1, 2));
    }

    #[test]
    fn test_no_viable_alternative_and_eof() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let mut input = InputStream::new("#");
        let err = sim
            .match_token(&mut input, 0, &mut DefaultRecognizer)
            .unwrap_err();
        assert_matches!(
            err,
            LexerError::NoViableAlternative {
                start_index: 0,
                offending_index: 0,
                line: 1,
                column: 0,
                ref text,
            } if text == "#"
        );

        sim.consume(&mut input);
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();
        assert!(m.is_eof());
        assert_eq!((m.start, m.stop), (1, 1));
    }

    #[test]
    fn test_unknown_mode() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let mut input = InputStream::new("a");
        let err = sim
            .match_token(&mut input, 9, &mut DefaultRecognizer)
            .unwrap_err();
        assert_eq!(err, LexerError::UnknownMode { mode: 9 });
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let tokens = match_all(&mut sim, "a\nbc", 0);
        assert_eq!(tokens.len(), 3);
        assert_eq!((sim.line(), sim.column()), (2, 2));
    }

    #[test]
    fn test_warm_cache_matches_cold() {
        let mut sim = simulator(fixtures::keyword_lexer());
        let cold = match_all(&mut sim, "if iffy i", 0);
        let states = sim.cache().state_count();
        assert!(states > 0);

        sim.reset();
        let warm = match_all(&mut sim, "if iffy i", 0);
        assert_eq!(cold, warm);
        assert_eq!(sim.cache().state_count(), states);

        let mut uncached = simulator(fixtures::keyword_lexer());
        uncached.preferences.enable_dfa_cache = false;
        assert_eq!(match_all(&mut uncached, "if iffy i", 0), cold);
        assert_eq!(uncached.cache().state_count(), 0);
    }

    #[test]
    fn test_non_greedy_loop_stops_at_first_terminator() {
        let atn = AtnBuilder::lexer("Comments")
            .token_rule(
                "COMMENT",
                1,
                Element::seq(vec![
                    Element::literal("/*"),
                    Element::lazy_star(Element::Wildcard),
                    Element::literal("*/"),
                ]),
            )
            .build()
            .unwrap();
        let mut sim = simulator(atn);
        let mut input = InputStream::new("/* a */ b */");
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();
        assert_eq!((m.token_type, m.stop), (1, 7));
    }

    #[test]
    fn test_predicates_gate_rules_without_caching() {
        // KW : {p0}? 'k' ;  ID : 'k' ;
        let atn = AtnBuilder::lexer("Gated")
            .token_rule(
                "KW",
                1,
                Element::seq(vec![Element::pred(0), Element::ch('k')]),
            )
            .token_rule("ID", 2, Element::ch('k'))
            .build()
            .unwrap();
        let mut sim = simulator(atn);

        let mut recognizer = ScriptedRecognizer::default().with_predicate(0, 0, false);
        let mut input = InputStream::new("k");
        let m = sim.match_token(&mut input, 0, &mut recognizer).unwrap();
        assert_eq!(m.token_type, 2);
        assert_eq!(recognizer.evaluated, vec![(0, 0, 0)]);

        let mut recognizer = ScriptedRecognizer::default().with_predicate(0, 0, true);
        let mut input = InputStream::new("k");
        let m = sim.match_token(&mut input, 0, &mut recognizer).unwrap();
        assert_eq!(m.token_type, 1);
        assert_eq!(recognizer.evaluated.len(), 1);
    }

    #[test]
    fn test_converging_action_paths_keep_the_first() {
        // A : ( {1} | {2} ) 'a' ;
        let atn = AtnBuilder::lexer("Converging")
            .token_rule(
                "A",
                1,
                Element::seq(vec![
                    Element::alt(vec![Element::action(1), Element::action(2)]),
                    Element::ch('a'),
                ]),
            )
            .build()
            .unwrap();
        let mut sim = simulator(atn);
        let mut input = InputStream::new("a");
        let m = sim.match_token(&mut input, 0, &mut DefaultRecognizer).unwrap();

        let actions: Vec<LexerAction> = m
            .executor
            .map(|e| {
                e.actions()
                    .iter()
                    .map(|a| match a {
                        LexerAction::Indexed { action, .. } => (**action).clone(),
                        other => other.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(
            actions,
            vec![LexerAction::Custom {
                rule_index: 0,
                action_index: 1
            }]
        );
    }

    #[test]
    fn test_token_length_ceiling() {
        let mut sim = simulator(fixtures::keyword_lexer());
        sim.preferences.max_token_length = 3;
        let mut input = InputStream::new("abcdef");
        let err = sim
            .match_token(&mut input, 0, &mut DefaultRecognizer)
            .unwrap_err();
        assert_matches!(
            err,
            LexerError::ResourceExhausted(ResourceExhausted {
                limit: ResourceLimit::TokenLength,
                ceiling: 3,
                observed: 4,
            })
        );
    }

    #[test]
    fn test_shared_cache_across_threads_matches_serial() {
        let atn = Arc::new(fixtures::keyword_lexer());
        let text = "if iffy 42 // note\nwhile x1 if";
        let reference = match_all(
            &mut LexerAtnSimulator::new(Arc::new(PredictionCache::new(atn.clone()))),
            text,
            0,
        );

        let shared = Arc::new(PredictionCache::new(atn));
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..50)
                            .map(|_| {
                                let mut sim = LexerAtnSimulator::new(shared.clone());
                                match_all(&mut sim, text, 0)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                for round in handle.join().unwrap() {
                    assert_eq!(round, reference);
                }
            }
        });
    }
}
