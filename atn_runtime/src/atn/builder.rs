//! Programmatic ATN construction
//!
//! Grammar rules are described as [`Element`] trees and compiled into the
//! usual state shapes: blocks with a block-start decision and a block end,
//! star loops with a loop-entry decision, plus loops with a loop-back
//! decision. Decision numbers are assigned in construction order (lexer mode
//! start states first), and parser rule stop states get epsilon links to
//! every follow state so SLL closure can chase global follow.

use super::error::{AtnError, AtnResult};
use super::state::{AtnState, StateKind};
use super::transition::Transition;
use super::{Atn, GrammarType, StateId, INVALID_TOKEN_TYPE};
use crate::action::LexerAction;
use crate::logging::codes;
use crate::utils::IntervalSet;
use std::collections::HashMap;

// ============================================================================
// GRAMMAR ELEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// One token type (parser) or code point (lexer)
    Token(i32),
    Range(i32, i32),
    Set(IntervalSet),
    NotSet(IntervalSet),
    Wildcard,
    /// Lexer string literal, matched code point by code point
    Literal(String),
    RuleRef {
        name: String,
        precedence: i32,
    },
    Seq(Vec<Element>),
    Alt(Vec<Element>),
    Optional {
        body: Box<Element>,
        greedy: bool,
    },
    Star {
        body: Box<Element>,
        greedy: bool,
    },
    Plus {
        body: Box<Element>,
        greedy: bool,
    },
    Predicate {
        pred_index: usize,
        ctx_dependent: bool,
    },
    Precedence(i32),
    /// Parser action (host action index) or lexer custom action
    Action(usize),
    LexerCommand(LexerAction),
    Epsilon,
}

impl Element {
    pub fn token(t: i32) -> Self {
        Element::Token(t)
    }

    pub fn ch(c: char) -> Self {
        Element::Token(c as i32)
    }

    pub fn range(from: char, to: char) -> Self {
        Element::Range(from as i32, to as i32)
    }

    pub fn set<I: IntoIterator<Item = (char, char)>>(ranges: I) -> Self {
        Element::Set(IntervalSet::from_ranges(
            ranges.into_iter().map(|(a, b)| (a as i32, b as i32)),
        ))
    }

    pub fn not_set<I: IntoIterator<Item = (char, char)>>(ranges: I) -> Self {
        Element::NotSet(IntervalSet::from_ranges(
            ranges.into_iter().map(|(a, b)| (a as i32, b as i32)),
        ))
    }

    pub fn literal(text: &str) -> Self {
        Element::Literal(text.to_string())
    }

    pub fn rule(name: &str) -> Self {
        Element::RuleRef {
            name: name.to_string(),
            precedence: 0,
        }
    }

    pub fn rule_with_precedence(name: &str, precedence: i32) -> Self {
        Element::RuleRef {
            name: name.to_string(),
            precedence,
        }
    }

    pub fn seq(elements: Vec<Element>) -> Self {
        Element::Seq(elements)
    }

    pub fn alt(alternatives: Vec<Element>) -> Self {
        Element::Alt(alternatives)
    }

    pub fn opt(body: Element) -> Self {
        Element::Optional {
            body: Box::new(body),
            greedy: true,
        }
    }

    pub fn star(body: Element) -> Self {
        Element::Star {
            body: Box::new(body),
            greedy: true,
        }
    }

    pub fn plus(body: Element) -> Self {
        Element::Plus {
            body: Box::new(body),
            greedy: true,
        }
    }

    pub fn lazy_opt(body: Element) -> Self {
        Element::Optional {
            body: Box::new(body),
            greedy: false,
        }
    }

    pub fn lazy_star(body: Element) -> Self {
        Element::Star {
            body: Box::new(body),
            greedy: false,
        }
    }

    pub fn lazy_plus(body: Element) -> Self {
        Element::Plus {
            body: Box::new(body),
            greedy: false,
        }
    }

    pub fn pred(pred_index: usize) -> Self {
        Element::Predicate {
            pred_index,
            ctx_dependent: false,
        }
    }

    pub fn precedence(level: i32) -> Self {
        Element::Precedence(level)
    }

    pub fn action(action_index: usize) -> Self {
        Element::Action(action_index)
    }

    pub fn command(action: LexerAction) -> Self {
        Element::LexerCommand(action)
    }

    fn alternatives(self) -> Vec<Element> {
        match self {
            Element::Alt(alts) if !alts.is_empty() => alts,
            other => vec![other],
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug, Clone)]
struct RuleDef {
    name: String,
    body: Element,
    token_type: Option<i32>,
    mode: usize,
}

#[derive(Debug, Clone, Copy)]
struct Handle {
    left: StateId,
    right: StateId,
}

pub struct AtnBuilder {
    grammar_type: GrammarType,
    grammar_name: String,
    token_names: Vec<String>,
    rules: Vec<RuleDef>,
    modes: Vec<String>,
}

impl AtnBuilder {
    pub fn parser(grammar_name: &str) -> Self {
        Self::new(GrammarType::Parser, grammar_name)
    }

    pub fn lexer(grammar_name: &str) -> Self {
        Self::new(GrammarType::Lexer, grammar_name)
    }

    fn new(grammar_type: GrammarType, grammar_name: &str) -> Self {
        Self {
            grammar_type,
            grammar_name: grammar_name.to_string(),
            token_names: Vec::new(),
            rules: Vec::new(),
            modes: vec!["DEFAULT_MODE".to_string()],
        }
    }

    /// Display names for token types `1..=names.len()`
    pub fn vocabulary(mut self, names: &[&str]) -> Self {
        self.token_names = std::iter::once("<INVALID>")
            .chain(names.iter().copied())
            .map(str::to_string)
            .collect();
        self
    }

    /// Parser rule
    pub fn rule(mut self, name: &str, body: Element) -> Self {
        self.push_rule(name, body, None);
        self
    }

    /// Lexer rule emitting `token_type` in the current mode
    pub fn token_rule(mut self, name: &str, token_type: i32, body: Element) -> Self {
        self.push_rule(name, body, Some(token_type));
        self
    }

    /// Lexer rule only reachable from other rules
    pub fn fragment(mut self, name: &str, body: Element) -> Self {
        self.push_rule(name, body, None);
        self
    }

    /// Start a new lexer mode; following token rules belong to it
    pub fn mode(mut self, name: &str) -> Self {
        self.modes.push(name.to_string());
        self
    }

    fn push_rule(&mut self, name: &str, body: Element, token_type: Option<i32>) {
        self.rules.push(RuleDef {
            name: name.to_string(),
            body,
            token_type,
            mode: self.modes.len() - 1,
        });
    }

    pub fn build(self) -> AtnResult<Atn> {
        let mut names: HashMap<&str, usize> = HashMap::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if names.insert(rule.name.as_str(), i).is_some() {
                return Err(AtnError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }

        let mut ctx = BuildContext {
            grammar_type: self.grammar_type,
            states: Vec::new(),
            decision_to_state: Vec::new(),
            rule_to_start_state: Vec::new(),
            rule_to_stop_state: Vec::new(),
            rule_lookup: names
                .iter()
                .map(|(name, &index)| (name.to_string(), index))
                .collect(),
            lexer_actions: Vec::new(),
            max_token_type: self.token_names.len().saturating_sub(1) as i32,
            current_rule: 0,
        };

        let mut mode_to_start_state = Vec::new();
        if self.grammar_type == GrammarType::Lexer {
            for _ in &self.modes {
                let start = ctx.new_state(StateKind::TokensStart, 0);
                ctx.define_decision(start);
                mode_to_start_state.push(start);
            }
        }

        for (i, _) in self.rules.iter().enumerate() {
            let start = ctx.new_state(StateKind::RuleStart, i);
            let stop = ctx.new_state(StateKind::RuleStop, i);
            ctx.rule_to_start_state.push(start);
            ctx.rule_to_stop_state.push(stop);
        }

        for (i, rule) in self.rules.iter().enumerate() {
            ctx.current_rule = i;
            let handle = ctx.build(&rule.body)?;
            ctx.epsilon(ctx.rule_to_start_state[i], handle.left);
            ctx.epsilon(handle.right, ctx.rule_to_stop_state[i]);
        }

        let mut rule_to_token_type = Vec::new();
        if self.grammar_type == GrammarType::Lexer {
            for (i, rule) in self.rules.iter().enumerate() {
                rule_to_token_type.push(rule.token_type.unwrap_or(INVALID_TOKEN_TYPE));
                if let Some(token_type) = rule.token_type {
                    ctx.max_token_type = ctx.max_token_type.max(token_type);
                    ctx.epsilon(mode_to_start_state[rule.mode], ctx.rule_to_start_state[i]);
                }
            }
        } else {
            ctx.add_follow_links();
        }

        let atn = Atn {
            grammar_type: self.grammar_type,
            grammar_name: self.grammar_name,
            max_token_type: ctx.max_token_type,
            states: ctx.states,
            decision_to_state: ctx.decision_to_state,
            rule_names: self.rules.iter().map(|r| r.name.clone()).collect(),
            rule_to_start_state: ctx.rule_to_start_state,
            rule_to_stop_state: ctx.rule_to_stop_state,
            token_names: self.token_names,
            rule_to_token_type,
            mode_names: if self.grammar_type == GrammarType::Lexer {
                self.modes
            } else {
                Vec::new()
            },
            mode_to_start_state,
            lexer_actions: ctx.lexer_actions,
        };

        atn.validate()?;

        crate::log_success!(
            codes::success::ATN_CONSTRUCTION_COMPLETE,
            "Automaton constructed",
            "grammar" => &atn.grammar_name,
            "type" => atn.grammar_type.as_str(),
            "states" => atn.states.len(),
            "decisions" => atn.number_of_decisions()
        );

        Ok(atn)
    }
}

struct BuildContext {
    grammar_type: GrammarType,
    states: Vec<AtnState>,
    decision_to_state: Vec<StateId>,
    rule_to_start_state: Vec<StateId>,
    rule_to_stop_state: Vec<StateId>,
    rule_lookup: HashMap<String, usize>,
    lexer_actions: Vec<LexerAction>,
    max_token_type: i32,
    current_rule: usize,
}

impl BuildContext {
    fn new_state(&mut self, kind: StateKind, rule_index: usize) -> StateId {
        let index = self.states.len();
        self.states.push(AtnState::new(index, kind, rule_index));
        index
    }

    fn basic(&mut self) -> StateId {
        self.new_state(StateKind::Basic, self.current_rule)
    }

    fn define_decision(&mut self, state: StateId) {
        self.states[state].decision = Some(self.decision_to_state.len());
        self.decision_to_state.push(state);
    }

    fn add(&mut self, from: StateId, transition: Transition) {
        self.states[from].transitions.push(transition);
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.add(from, Transition::Epsilon { target: to });
    }

    fn epsilon_first(&mut self, from: StateId, to: StateId) {
        self.states[from]
            .transitions
            .insert(0, Transition::Epsilon { target: to });
    }

    fn is_lexer(&self) -> bool {
        self.grammar_type == GrammarType::Lexer
    }

    fn require(&self, grammar: GrammarType, construct: &'static str) -> AtnResult<()> {
        if self.grammar_type == grammar {
            Ok(())
        } else {
            Err(AtnError::UnsupportedConstruct {
                construct,
                grammar: self.grammar_type.as_str(),
            })
        }
    }

    fn single(&mut self, make: impl FnOnce(StateId) -> Transition) -> Handle {
        let left = self.basic();
        let right = self.basic();
        self.add(left, make(right));
        Handle { left, right }
    }

    fn note_symbol(&mut self, symbol: i32) {
        if !self.is_lexer() {
            self.max_token_type = self.max_token_type.max(symbol);
        }
    }

    fn build(&mut self, element: &Element) -> AtnResult<Handle> {
        match element {
            Element::Token(t) => {
                self.note_symbol(*t);
                let label = *t;
                Ok(self.single(|target| Transition::Atom { target, label }))
            }
            Element::Range(start, stop) => {
                self.note_symbol(*stop);
                let (start, stop) = (*start, *stop);
                Ok(self.single(|target| Transition::Range {
                    target,
                    start,
                    stop,
                }))
            }
            Element::Set(set) => {
                if let Some(max) = set.intervals().last() {
                    self.note_symbol(max.stop);
                }
                let set = set.clone();
                Ok(self.single(|target| Transition::Set { target, set }))
            }
            Element::NotSet(set) => {
                let set = set.clone();
                Ok(self.single(|target| Transition::NotSet { target, set }))
            }
            Element::Wildcard => Ok(self.single(|target| Transition::Wildcard { target })),
            Element::Literal(text) => {
                self.require(GrammarType::Lexer, "string literal")?;
                let left = self.basic();
                let mut right = left;
                for c in text.chars() {
                    let next = self.basic();
                    self.add(
                        right,
                        Transition::Atom {
                            target: next,
                            label: c as i32,
                        },
                    );
                    right = next;
                }
                if left == right {
                    right = self.basic();
                    self.epsilon(left, right);
                }
                Ok(Handle { left, right })
            }
            Element::RuleRef { name, precedence } => {
                let rule_index = *self
                    .rule_lookup
                    .get(name)
                    .ok_or_else(|| AtnError::undefined_rule(name))?;
                let rule_start = self.rule_to_start_state[rule_index];
                let precedence = *precedence;
                let left = self.basic();
                let right = self.basic();
                self.add(
                    left,
                    Transition::Rule {
                        target: rule_start,
                        rule_index,
                        follow_state: right,
                        precedence,
                    },
                );
                Ok(Handle { left, right })
            }
            Element::Seq(elements) => {
                if elements.is_empty() {
                    return Ok(self.single(|target| Transition::Epsilon { target }));
                }
                let mut handles = Vec::with_capacity(elements.len());
                for element in elements {
                    handles.push(self.build(element)?);
                }
                for pair in handles.windows(2) {
                    self.epsilon(pair[0].right, pair[1].left);
                }
                Ok(Handle {
                    left: handles[0].left,
                    right: handles[handles.len() - 1].right,
                })
            }
            Element::Alt(alternatives) => match alternatives.len() {
                0 => Ok(self.single(|target| Transition::Epsilon { target })),
                1 => self.build(&alternatives[0]),
                _ => {
                    let handle = self.block(StateKind::BlockStart, alternatives)?;
                    self.define_decision(handle.left);
                    Ok(handle)
                }
            },
            Element::Optional { body, greedy } => {
                let alternatives = body.as_ref().clone().alternatives();
                let handle = self.block(StateKind::BlockStart, &alternatives)?;
                if *greedy {
                    self.epsilon(handle.left, handle.right);
                } else {
                    self.epsilon_first(handle.left, handle.right);
                }
                self.states[handle.left].non_greedy = !greedy;
                self.define_decision(handle.left);
                Ok(handle)
            }
            Element::Star { body, greedy } => {
                let alternatives = body.as_ref().clone().alternatives();
                let block = self.block(StateKind::StarBlockStart, &alternatives)?;
                if alternatives.len() > 1 {
                    self.define_decision(block.left);
                }

                let entry = self.new_state(StateKind::StarLoopEntry, self.current_rule);
                let loop_back = self.new_state(StateKind::StarLoopBack, self.current_rule);
                let end = self.new_state(StateKind::LoopEnd, self.current_rule);
                self.states[end].partner = Some(loop_back);
                self.states[entry].partner = Some(loop_back);
                self.states[entry].non_greedy = !greedy;

                if *greedy {
                    self.epsilon(entry, block.left);
                    self.epsilon(entry, end);
                } else {
                    self.epsilon(entry, end);
                    self.epsilon(entry, block.left);
                }
                self.epsilon(block.right, loop_back);
                self.epsilon(loop_back, entry);
                self.define_decision(entry);

                Ok(Handle {
                    left: entry,
                    right: end,
                })
            }
            Element::Plus { body, greedy } => {
                let alternatives = body.as_ref().clone().alternatives();
                let block = self.block(StateKind::PlusBlockStart, &alternatives)?;
                if alternatives.len() > 1 {
                    self.define_decision(block.left);
                }

                let loop_back = self.new_state(StateKind::PlusLoopBack, self.current_rule);
                let end = self.new_state(StateKind::LoopEnd, self.current_rule);
                self.states[end].partner = Some(loop_back);
                self.states[loop_back].non_greedy = !greedy;

                self.epsilon(block.right, loop_back);
                if *greedy {
                    self.epsilon(loop_back, block.left);
                    self.epsilon(loop_back, end);
                } else {
                    self.epsilon(loop_back, end);
                    self.epsilon(loop_back, block.left);
                }
                self.define_decision(loop_back);

                Ok(Handle {
                    left: block.left,
                    right: end,
                })
            }
            Element::Predicate {
                pred_index,
                ctx_dependent,
            } => {
                let rule_index = self.current_rule;
                let (pred_index, is_ctx_dependent) = (*pred_index, *ctx_dependent);
                Ok(self.single(|target| Transition::Predicate {
                    target,
                    rule_index,
                    pred_index,
                    is_ctx_dependent,
                }))
            }
            Element::Precedence(precedence) => {
                self.require(GrammarType::Parser, "precedence predicate")?;
                let precedence = *precedence;
                Ok(self.single(|target| Transition::Precedence { target, precedence }))
            }
            Element::Action(action_index) => {
                let rule_index = self.current_rule;
                let action_index = if self.is_lexer() {
                    self.intern_action(LexerAction::Custom {
                        rule_index,
                        action_index: *action_index,
                    })
                } else {
                    *action_index
                };
                Ok(self.single(|target| Transition::Action {
                    target,
                    rule_index,
                    action_index,
                    is_ctx_dependent: false,
                }))
            }
            Element::LexerCommand(action) => {
                self.require(GrammarType::Lexer, "lexer command")?;
                let rule_index = self.current_rule;
                let action_index = self.intern_action(action.clone());
                Ok(self.single(|target| Transition::Action {
                    target,
                    rule_index,
                    action_index,
                    is_ctx_dependent: false,
                }))
            }
            Element::Epsilon => Ok(self.single(|target| Transition::Epsilon { target })),
        }
    }

    /// Block start fanning out to each alternative, joined at a block end
    fn block(&mut self, kind: StateKind, alternatives: &[Element]) -> AtnResult<Handle> {
        let start = self.new_state(kind, self.current_rule);
        let end = self.new_state(StateKind::BlockEnd, self.current_rule);
        self.states[start].partner = Some(end);
        for alternative in alternatives {
            let handle = self.build(alternative)?;
            self.epsilon(start, handle.left);
            self.epsilon(handle.right, end);
        }
        Ok(Handle {
            left: start,
            right: end,
        })
    }

    fn intern_action(&mut self, action: LexerAction) -> usize {
        match self.lexer_actions.iter().position(|a| *a == action) {
            Some(index) => index,
            None => {
                self.lexer_actions.push(action);
                self.lexer_actions.len() - 1
            }
        }
    }

    fn add_follow_links(&mut self) {
        let mut links = Vec::new();
        for state in &self.states {
            for transition in &state.transitions {
                if let Transition::Rule {
                    rule_index,
                    follow_state,
                    ..
                } = transition
                {
                    links.push((self.rule_to_stop_state[*rule_index], *follow_state));
                }
            }
        }
        for (stop, follow) in links {
            self.epsilon(stop, follow);
        }
    }
}
