//! ATN-walking parser interpreter
//!
//! [`ParserInterpreter`] parses a token stream straight from the automaton:
//! it follows the single transition of plain states, asks
//! [`ParserAtnSimulator::adaptive_predict`] at every decision with the real
//! call stack, and records what it did as a [`ParseTrace`].

pub mod error;

pub use error::{InterpreterError, InterpreterResult};

use crate::atn::{Atn, StateId, Transition, EOF, MIN_USER_TOKEN_TYPE};
use crate::config::compile_time::interpreter::{MAX_CALL_STACK_DEPTH, MAX_TRACE_EVENTS};
use crate::dfa::PredictionCache;
use crate::input::TokenStream;
use crate::logging::codes;
use crate::recognizer::{DefaultRecognizer, Recognizer};
use crate::simulator::ParserAtnSimulator;
use crate::{log_error, log_success};
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// PARSE TRACE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ParseEvent {
    EnterRule { rule: usize, index: usize },
    ExitRule { rule: usize, index: usize },
    Decision { decision: usize, alt: usize, index: usize },
    Match { token_type: i32, index: usize },
}

/// Events of one parse in order. Past the event ceiling further events are
/// only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTrace {
    events: Vec<ParseEvent>,
    dropped: usize,
    #[serde(skip)]
    max_events: usize,
}

impl ParseTrace {
    fn with_max_events(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            dropped: 0,
            max_events,
        }
    }

    fn push(&mut self, event: ParseEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Alternatives chosen, in decision order
    pub fn decisions(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ParseEvent::Decision { decision, alt, .. } => Some((*decision, *alt)),
                _ => None,
            })
            .collect()
    }

    /// Parse tree in LISP form, e.g. `(s (e ID '+' ID) ';')`
    pub fn render(&self, atn: &Atn) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                ParseEvent::EnterRule { rule, .. } => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push('(');
                    out.push_str(atn.rule_name(*rule));
                }
                ParseEvent::ExitRule { .. } => out.push(')'),
                ParseEvent::Match { token_type, .. } => {
                    out.push(' ');
                    out.push_str(&atn.symbol_display_name(*token_type));
                }
                ParseEvent::Decision { .. } => {}
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// INTERPRETER
// ============================================================================

/// An active rule invocation
#[derive(Debug, Clone, Copy)]
struct Frame {
    rule_index: usize,
    /// Where to continue on return; `None` for the start rule
    follow_state: Option<StateId>,
    precedence: i32,
}

/// Host callbacks with precedence predicates answered from the current
/// rule invocation
struct Callbacks<'a, R: Recognizer> {
    recognizer: &'a mut R,
    precedence: i32,
}

impl<R: Recognizer> Recognizer for Callbacks<'_, R> {
    fn grammar_name(&self) -> &str {
        self.recognizer.grammar_name()
    }

    fn sempred(&mut self, rule_index: usize, pred_index: usize, position: usize) -> bool {
        self.recognizer.sempred(rule_index, pred_index, position)
    }

    fn precpred(&mut self, precedence: i32) -> bool {
        precedence >= self.precedence
    }

    fn action(&mut self, rule_index: usize, action_index: usize, position: usize) {
        self.recognizer.action(rule_index, action_index, position);
    }
}

pub struct ParserInterpreter<R: Recognizer = DefaultRecognizer> {
    simulator: ParserAtnSimulator,
    recognizer: R,
    max_call_stack_depth: usize,
    max_trace_events: usize,
}

impl ParserInterpreter<DefaultRecognizer> {
    pub fn new(cache: Arc<PredictionCache>) -> Self {
        Self::with_recognizer(cache, DefaultRecognizer)
    }
}

impl<R: Recognizer> ParserInterpreter<R> {
    pub fn with_recognizer(cache: Arc<PredictionCache>, recognizer: R) -> Self {
        Self::with_simulator(ParserAtnSimulator::new(cache), recognizer)
    }

    pub fn with_simulator(simulator: ParserAtnSimulator, recognizer: R) -> Self {
        Self {
            simulator,
            recognizer,
            max_call_stack_depth: MAX_CALL_STACK_DEPTH,
            max_trace_events: MAX_TRACE_EVENTS,
        }
    }

    pub fn with_max_call_stack_depth(mut self, depth: usize) -> Self {
        self.max_call_stack_depth = depth.min(MAX_CALL_STACK_DEPTH);
        self
    }

    pub fn with_max_trace_events(mut self, events: usize) -> Self {
        self.max_trace_events = events.min(MAX_TRACE_EVENTS);
        self
    }

    pub fn simulator(&self) -> &ParserAtnSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut ParserAtnSimulator {
        &mut self.simulator
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    /// Parse `start_rule` from the cursor of `input`. The input is left
    /// after the last token the rule matched.
    pub fn parse<T: TokenStream + ?Sized>(
        &mut self,
        input: &mut T,
        start_rule: &str,
    ) -> InterpreterResult<ParseTrace> {
        let atn = self.simulator.atn().clone();
        let Some(rule_index) = atn.rule_index(start_rule) else {
            return Err(InterpreterError::UnknownRule {
                name: start_rule.to_string(),
            });
        };

        let start_index = input.index();
        match self.walk(&atn, input, rule_index) {
            Ok(trace) => {
                log_success!(codes::success::PARSE_COMPLETE,
                    "Parse completed",
                    "rule" => start_rule,
                    "source" => input.source_name(),
                    "tokens" => input.index() - start_index,
                    "events" => trace.events().len()
                );
                Ok(trace)
            }
            Err(error) => {
                log_error!(error.error_code(), "Parse failed",
                    "rule" => start_rule,
                    "source" => input.source_name(),
                    "error" => &error
                );
                Err(error)
            }
        }
    }

    fn walk<T: TokenStream + ?Sized>(
        &mut self,
        atn: &Atn,
        input: &mut T,
        start_rule: usize,
    ) -> InterpreterResult<ParseTrace> {
        let mut trace = ParseTrace::with_max_events(self.max_trace_events);
        let mut frames = vec![Frame {
            rule_index: start_rule,
            follow_state: None,
            precedence: 0,
        }];
        // invoking states of every frame but the start rule, outermost first
        let mut invoking: Vec<StateId> = Vec::new();

        trace.push(ParseEvent::EnterRule {
            rule: start_rule,
            index: input.index(),
        });
        let mut p = atn.rule_to_start_state[start_rule];

        loop {
            let state = atn.state(p);

            if state.is_rule_stop() {
                let Some(frame) = frames.pop() else {
                    return Ok(trace);
                };
                trace.push(ParseEvent::ExitRule {
                    rule: frame.rule_index,
                    index: input.index(),
                });
                match frame.follow_state {
                    Some(follow) => {
                        invoking.pop();
                        p = follow;
                        continue;
                    }
                    None => return Ok(trace),
                }
            }

            let precedence = frames.last().map(|f| f.precedence).unwrap_or(0);
            let mut callbacks = Callbacks {
                recognizer: &mut self.recognizer,
                precedence,
            };

            let alt = match state.decision {
                Some(decision) if state.transitions.len() > 1 => {
                    let alt = self.simulator.adaptive_predict(
                        input,
                        decision,
                        &invoking,
                        &mut callbacks,
                    )?;
                    trace.push(ParseEvent::Decision {
                        decision,
                        alt,
                        index: input.index(),
                    });
                    alt
                }
                _ => 1,
            };

            let Some(transition) = state.transition(alt - 1) else {
                return Err(mismatch(atn, input, p, &invoking));
            };

            match transition {
                Transition::Epsilon { .. } => {}
                Transition::Atom { .. }
                | Transition::Range { .. }
                | Transition::Set { .. }
                | Transition::NotSet { .. }
                | Transition::Wildcard { .. } => {
                    let t = input.la(1);
                    if !transition.matches(t, MIN_USER_TOKEN_TYPE, atn.max_token_type) {
                        return Err(mismatch(atn, input, p, &invoking));
                    }
                    trace.push(ParseEvent::Match {
                        token_type: t,
                        index: input.index(),
                    });
                    if t != EOF {
                        input.consume();
                    }
                }
                Transition::Rule {
                    rule_index,
                    follow_state,
                    precedence,
                    ..
                } => {
                    if frames.len() >= self.max_call_stack_depth {
                        return Err(InterpreterError::CallStackOverflow {
                            depth: self.max_call_stack_depth,
                        });
                    }
                    frames.push(Frame {
                        rule_index: *rule_index,
                        follow_state: Some(*follow_state),
                        precedence: *precedence,
                    });
                    invoking.push(p);
                    trace.push(ParseEvent::EnterRule {
                        rule: *rule_index,
                        index: input.index(),
                    });
                }
                Transition::Predicate {
                    rule_index,
                    pred_index,
                    ..
                } => {
                    if !callbacks.sempred(*rule_index, *pred_index, input.index()) {
                        return Err(failed_predicate(atn, input, transition, *rule_index));
                    }
                }
                Transition::Precedence { precedence, .. } => {
                    if !callbacks.precpred(*precedence) {
                        return Err(failed_predicate(atn, input, transition, state.rule_index));
                    }
                }
                Transition::Action {
                    rule_index,
                    action_index,
                    ..
                } => {
                    callbacks.action(*rule_index, *action_index, input.index());
                }
            }
            p = transition.target();
        }
    }
}

fn mismatch<T: TokenStream + ?Sized>(
    atn: &Atn,
    input: &T,
    state: StateId,
    invoking: &[StateId],
) -> InterpreterError {
    let expected = atn
        .expected_tokens(state, invoking)
        .to_string_with(|t| atn.symbol_display_name(t));
    InterpreterError::MismatchedInput {
        index: input.index(),
        found: atn.symbol_display_name(input.la(1)),
        expected,
    }
}

fn failed_predicate<T: TokenStream + ?Sized>(
    atn: &Atn,
    input: &T,
    transition: &Transition,
    rule_index: usize,
) -> InterpreterError {
    InterpreterError::FailedPredicate {
        rule: atn.rule_name(rule_index).to_string(),
        predicate: transition
            .predicate()
            .map(|p| p.to_string())
            .unwrap_or_default(),
        index: input.index(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atn::builder::{AtnBuilder, Element};
    use crate::fixtures;
    use crate::input::{CommonTokenStream, IntStream};
    use crate::recognizer::tests::ScriptedRecognizer;
    use crate::simulator::PredictionError;
    use assert_matches::assert_matches;

    const ID: i32 = 1;
    const PLUS: i32 = 2;
    const STAR: i32 = 3;
    const SEMI: i32 = 4;

    fn interpreter(atn: Atn) -> ParserInterpreter {
        ParserInterpreter::new(Arc::new(PredictionCache::new(Arc::new(atn))))
    }

    #[test]
    fn test_expression_parse_tree() {
        let atn = fixtures::expression_parser();
        let mut interp = interpreter(atn.clone());
        let mut input = CommonTokenStream::from_types(&[ID, STAR, ID, PLUS, ID, SEMI]);

        let trace = interp.parse(&mut input, "s").unwrap();
        assert_eq!(trace.render(&atn), "(s (e (t ID '*' ID) '+' (t ID)) ';')");
        assert_eq!(input.la(1), EOF);
        assert_eq!(trace.dropped(), 0);
        assert!(trace.decisions().iter().all(|&(_, alt)| alt >= 1));
    }

    #[test]
    fn test_call_stack_drives_full_context_prediction() {
        let atn = fixtures::context_sensitive_parser();
        let mut interp = interpreter(atn.clone());

        let mut input = CommonTokenStream::from_types(&[2, 1, 3]);
        let trace = interp.parse(&mut input, "s").unwrap();
        assert_eq!(trace.render(&atn), "(s 'b' (x 'a' 'c'))");

        let mut input = CommonTokenStream::from_types(&[1, 3]);
        let trace = interp.parse(&mut input, "s").unwrap();
        assert_eq!(trace.render(&atn), "(s (x 'a') 'c')");
    }

    #[test]
    fn test_mismatched_input() {
        let mut interp = interpreter(fixtures::expression_parser());
        let mut input = CommonTokenStream::from_types(&[ID, PLUS, SEMI]);
        let err = interp.parse(&mut input, "s").unwrap_err();
        assert_eq!(
            err,
            InterpreterError::MismatchedInput {
                index: 2,
                found: "';'".to_string(),
                expected: "ID".to_string(),
            }
        );
    }

    #[test]
    fn test_no_viable_alternative_surfaces() {
        let mut interp = interpreter(fixtures::expression_parser());
        let mut input = CommonTokenStream::from_types(&[ID, ID]);
        let err = interp.parse(&mut input, "s").unwrap_err();
        assert_matches!(
            err,
            InterpreterError::Prediction(PredictionError::NoViableAlternative { .. })
        );
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn test_unknown_rule_and_depth_ceiling() {
        let mut interp = interpreter(fixtures::nested_call_parser());
        let mut input = CommonTokenStream::from_types(&[2, 1]);
        assert_matches!(
            interp.parse(&mut input, "nope"),
            Err(InterpreterError::UnknownRule { .. })
        );

        let mut interp = interpreter(fixtures::nested_call_parser()).with_max_call_stack_depth(2);
        assert_eq!(
            interp.parse(&mut input, "s"),
            Err(InterpreterError::CallStackOverflow { depth: 2 })
        );
    }

    #[test]
    fn test_predicates_and_actions_reach_the_host() {
        // s : 'a' {3} {p0}? 'b' ;
        let atn = AtnBuilder::parser("Host")
            .vocabulary(&["'a'", "'b'"])
            .rule(
                "s",
                Element::seq(vec![
                    Element::token(1),
                    Element::action(3),
                    Element::pred(0),
                    Element::token(2),
                ]),
            )
            .build()
            .unwrap();
        let cache = Arc::new(PredictionCache::new(Arc::new(atn)));

        let mut interp = ParserInterpreter::with_recognizer(cache.clone(), ScriptedRecognizer::default());
        let mut input = CommonTokenStream::from_types(&[1, 2]);
        interp.parse(&mut input, "s").unwrap();
        assert_eq!(interp.recognizer().actions, vec![(0, 3, 1)]);
        assert_eq!(interp.recognizer().evaluated, vec![(0, 0, 1)]);

        let recognizer = ScriptedRecognizer::default().with_predicate(0, 0, false);
        let mut interp = ParserInterpreter::with_recognizer(cache, recognizer);
        let mut input = CommonTokenStream::from_types(&[1, 2]);
        assert_matches!(
            interp.parse(&mut input, "s"),
            Err(InterpreterError::FailedPredicate { index: 1, .. })
        );
    }

    #[test]
    fn test_trace_ceiling_and_json() {
        let mut interp = interpreter(fixtures::expression_parser()).with_max_trace_events(2);
        let mut input = CommonTokenStream::from_types(&[ID, SEMI]);
        let trace = interp.parse(&mut input, "s").unwrap();
        assert_eq!(trace.events().len(), 2);
        assert!(trace.dropped() > 0);

        let json = trace.to_json().unwrap();
        assert!(json.contains("\"event\":\"enter_rule\""));
    }
}
