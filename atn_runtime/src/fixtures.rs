//! Grammars shared by the unit tests

use crate::action::LexerAction;
use crate::atn::builder::{AtnBuilder, Element};
use crate::atn::{Atn, StateId, Transition, EOF, HIDDEN_CHANNEL};

/// Token types and modes of [`keyword_lexer`]
pub mod keyword_lexer_tokens {
    pub const IF: i32 = 1;
    pub const ID: i32 = 2;
    pub const WS: i32 = 3;
    pub const QUOTE: i32 = 4;
    pub const INT: i32 = 5;
    pub const COMMENT: i32 = 6;
    pub const TEXT: i32 = 7;
    pub const END_QUOTE: i32 = 8;

    pub const STRING_MODE: usize = 1;
}

/// ```text
/// IF : 'if' ;  ID : [a-z]+ ;  WS : [ \t\r\n]+ -> skip ;
/// QUOTE : '"' -> pushMode(STRING) ;  INT : [0-9]+ ;
/// COMMENT : '//' ~[\n]* -> channel(HIDDEN) ;
/// mode STRING;  TEXT : ~["]+ ;  END_QUOTE : '"' -> popMode ;
/// ```
pub fn keyword_lexer() -> Atn {
    use keyword_lexer_tokens::*;

    AtnBuilder::lexer("Keywords")
        .vocabulary(&["IF", "ID", "WS", "QUOTE", "INT", "COMMENT", "TEXT", "END_QUOTE"])
        .token_rule("IF", IF, Element::literal("if"))
        .token_rule("ID", ID, Element::plus(Element::range('a', 'z')))
        .token_rule(
            "WS",
            WS,
            Element::seq(vec![
                Element::plus(Element::set([
                    (' ', ' '),
                    ('\t', '\t'),
                    ('\r', '\r'),
                    ('\n', '\n'),
                ])),
                Element::command(LexerAction::Skip),
            ]),
        )
        .token_rule(
            "QUOTE",
            QUOTE,
            Element::seq(vec![
                Element::ch('"'),
                Element::command(LexerAction::PushMode { mode: STRING_MODE }),
            ]),
        )
        .token_rule("INT", INT, Element::plus(Element::range('0', '9')))
        .token_rule(
            "COMMENT",
            COMMENT,
            Element::seq(vec![
                Element::literal("//"),
                Element::star(Element::not_set([('\n', '\n')])),
                Element::command(LexerAction::Channel {
                    channel: HIDDEN_CHANNEL,
                }),
            ]),
        )
        .mode("STRING")
        .token_rule("TEXT", TEXT, Element::plus(Element::not_set([('"', '"')])))
        .token_rule(
            "END_QUOTE",
            END_QUOTE,
            Element::seq(vec![Element::ch('"'), Element::command(LexerAction::PopMode)]),
        )
        .build()
        .expect("keyword lexer builds")
}

/// `x : 'a' 'b' | 'a' 'c' ;` with a=1, b=2, c=3
pub fn ab_ac_parser() -> Atn {
    AtnBuilder::parser("AbAc")
        .vocabulary(&["'a'", "'b'", "'c'"])
        .rule(
            "x",
            Element::alt(vec![
                Element::seq(vec![Element::token(1), Element::token(2)]),
                Element::seq(vec![Element::token(1), Element::token(3)]),
            ]),
        )
        .build()
        .expect("ab/ac parser builds")
}

/// `s : x EOF ;  x : 'a' | 'a' ;` where decision 0 is the block of x
pub fn ambiguous_parser() -> Atn {
    AtnBuilder::parser("Ambiguous")
        .vocabulary(&["'a'"])
        .rule("s", Element::seq(vec![Element::rule("x"), Element::token(EOF)]))
        .rule("x", Element::alt(vec![Element::token(1), Element::token(1)]))
        .build()
        .expect("ambiguous parser builds")
}

/// `s : x 'c' | 'b' x ;  x : 'a' | 'a' 'c' ;` with a=1, b=2, c=3
pub fn context_sensitive_parser() -> Atn {
    AtnBuilder::parser("ContextSensitive")
        .vocabulary(&["'a'", "'b'", "'c'"])
        .rule(
            "s",
            Element::alt(vec![
                Element::seq(vec![Element::rule("x"), Element::token(3)]),
                Element::seq(vec![Element::token(2), Element::rule("x")]),
            ]),
        )
        .rule(
            "x",
            Element::alt(vec![
                Element::token(1),
                Element::seq(vec![Element::token(1), Element::token(3)]),
            ]),
        )
        .build()
        .expect("context sensitive parser builds")
}

/// ```text
/// s : e ';' ;  e : t ( '+' t )* ;  t : ID ( '*' ID )* ;
/// ```
/// with ID=1, '+'=2, '*'=3, ';'=4
pub fn expression_parser() -> Atn {
    AtnBuilder::parser("Expr")
        .vocabulary(&["ID", "'+'", "'*'", "';'"])
        .rule("s", Element::seq(vec![Element::rule("e"), Element::token(4)]))
        .rule(
            "e",
            Element::seq(vec![
                Element::rule("t"),
                Element::star(Element::seq(vec![Element::token(2), Element::rule("t")])),
            ]),
        )
        .rule(
            "t",
            Element::seq(vec![
                Element::token(1),
                Element::star(Element::seq(vec![Element::token(3), Element::token(1)])),
            ]),
        )
        .build()
        .expect("expression parser builds")
}

/// `s : a ;  a : b 'x' ;  b : 'y' ;`
pub fn nested_call_parser() -> Atn {
    AtnBuilder::parser("Nested")
        .vocabulary(&["'x'", "'y'"])
        .rule("s", Element::rule("a"))
        .rule("a", Element::seq(vec![Element::rule("b"), Element::token(1)]))
        .rule("b", Element::token(2))
        .build()
        .expect("nested call parser builds")
}

// ============================================================================
// ATN QUERIES
// ============================================================================

/// States that invoke `rule`, in state order
pub fn rule_invocations(atn: &Atn, rule: &str) -> Vec<StateId> {
    let Some(rule_index) = atn.rule_index(rule) else {
        return Vec::new();
    };
    atn.states
        .iter()
        .filter(|s| {
            s.transitions.iter().any(|t| {
                matches!(t, Transition::Rule { rule_index: r, .. } if *r == rule_index)
            })
        })
        .map(|s| s.index)
        .collect()
}

/// The first state holding a rule transition
pub fn first_rule_invocation(atn: &Atn) -> StateId {
    atn.states
        .iter()
        .find(|s| matches!(s.transitions.first(), Some(Transition::Rule { .. })))
        .map(|s| s.index)
        .expect("grammar invokes a rule")
}

/// The first decision inside `rule`
pub fn decision_in_rule(atn: &Atn, rule: &str) -> usize {
    let rule_index = atn.rule_index(rule).expect("rule exists");
    (0..atn.number_of_decisions())
        .find(|&d| atn.state(atn.decision_to_state[d]).rule_index == rule_index)
        .expect("rule has a decision")
}
