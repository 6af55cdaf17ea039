//! Semantic contexts
//!
//! The predicate condition a configuration was reached under. Conjunctions
//! and disjunctions are kept normalized (flattened, deduplicated, sorted) so
//! that equal conditions compare equal and configurations deduplicate.

use crate::recognizer::Recognizer;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SemanticContext {
    /// Always true
    #[default]
    None,
    Predicate {
        rule_index: usize,
        pred_index: usize,
        is_ctx_dependent: bool,
    },
    /// Precedence predicate `precedence >= current precedence level`
    Precedence(i32),
    And(Vec<SemanticContext>),
    Or(Vec<SemanticContext>),
}

impl SemanticContext {
    pub fn is_none(&self) -> bool {
        matches!(self, SemanticContext::None)
    }

    pub fn and(a: &SemanticContext, b: &SemanticContext) -> SemanticContext {
        if a.is_none() {
            return b.clone();
        }
        if b.is_none() {
            return a.clone();
        }

        let mut operands = BTreeSet::new();
        for ctx in [a, b] {
            match ctx {
                SemanticContext::And(inner) => operands.extend(inner.iter().cloned()),
                other => {
                    operands.insert(other.clone());
                }
            }
        }

        // conjunction of precedence predicates is the lowest level
        let lowest = operands
            .iter()
            .filter_map(|c| match c {
                SemanticContext::Precedence(p) => Some(*p),
                _ => None,
            })
            .min();
        Self::collapse(operands, lowest, SemanticContext::And)
    }

    pub fn or(a: &SemanticContext, b: &SemanticContext) -> SemanticContext {
        if a.is_none() || b.is_none() {
            return SemanticContext::None;
        }

        let mut operands = BTreeSet::new();
        for ctx in [a, b] {
            match ctx {
                SemanticContext::Or(inner) => operands.extend(inner.iter().cloned()),
                other => {
                    operands.insert(other.clone());
                }
            }
        }

        let highest = operands
            .iter()
            .filter_map(|c| match c {
                SemanticContext::Precedence(p) => Some(*p),
                _ => None,
            })
            .max();
        Self::collapse(operands, highest, SemanticContext::Or)
    }

    fn collapse(
        mut operands: BTreeSet<SemanticContext>,
        precedence: Option<i32>,
        build: fn(Vec<SemanticContext>) -> SemanticContext,
    ) -> SemanticContext {
        if let Some(level) = precedence {
            operands.retain(|c| !matches!(c, SemanticContext::Precedence(_)));
            operands.insert(SemanticContext::Precedence(level));
        }
        if operands.len() == 1 {
            if let Some(only) = operands.pop_first() {
                return only;
            }
        }
        build(operands.into_iter().collect())
    }

    /// Evaluate with the input at `position`
    pub fn eval(&self, recognizer: &mut dyn Recognizer, position: usize) -> bool {
        match self {
            SemanticContext::None => true,
            SemanticContext::Predicate {
                rule_index,
                pred_index,
                ..
            } => recognizer.sempred(*rule_index, *pred_index, position),
            SemanticContext::Precedence(level) => recognizer.precpred(*level),
            SemanticContext::And(operands) => {
                operands.iter().all(|c| c.eval(recognizer, position))
            }
            SemanticContext::Or(operands) => {
                operands.iter().any(|c| c.eval(recognizer, position))
            }
        }
    }
}

impl fmt::Display for SemanticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticContext::None => write!(f, "true"),
            SemanticContext::Predicate {
                rule_index,
                pred_index,
                ..
            } => write!(f, "{{{}:{}}}?", rule_index, pred_index),
            SemanticContext::Precedence(level) => write!(f, "{{{}>=prec}}?", level),
            SemanticContext::And(operands) => {
                let parts: Vec<String> = operands.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", parts.join("&&"))
            }
            SemanticContext::Or(operands) => {
                let parts: Vec<String> = operands.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", parts.join("||"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::tests::ScriptedRecognizer;

    fn pred(i: usize) -> SemanticContext {
        SemanticContext::Predicate {
            rule_index: 0,
            pred_index: i,
            is_ctx_dependent: false,
        }
    }

    #[test]
    fn test_none_is_identity_for_and() {
        assert_eq!(SemanticContext::and(&SemanticContext::None, &pred(1)), pred(1));
        assert_eq!(SemanticContext::and(&pred(1), &SemanticContext::None), pred(1));
    }

    #[test]
    fn test_none_absorbs_or() {
        assert_eq!(
            SemanticContext::or(&SemanticContext::None, &pred(1)),
            SemanticContext::None
        );
    }

    #[test]
    fn test_and_is_normalized() {
        let ab = SemanticContext::and(&pred(1), &pred(2));
        let ba = SemanticContext::and(&pred(2), &pred(1));
        assert_eq!(ab, ba);
        assert_eq!(SemanticContext::and(&ab, &pred(1)), ab);
        assert_eq!(SemanticContext::and(&pred(3), &pred(3)), pred(3));
    }

    #[test]
    fn test_precedence_reduction() {
        let and = SemanticContext::and(
            &SemanticContext::Precedence(3),
            &SemanticContext::Precedence(5),
        );
        assert_eq!(and, SemanticContext::Precedence(3));
        let or = SemanticContext::or(
            &SemanticContext::Precedence(3),
            &SemanticContext::Precedence(5),
        );
        assert_eq!(or, SemanticContext::Precedence(5));
    }

    #[test]
    fn test_eval() {
        let mut recognizer = ScriptedRecognizer::default().with_predicate(0, 2, false);
        let both = SemanticContext::and(&pred(1), &pred(2));
        let either = SemanticContext::or(&pred(1), &pred(2));
        assert!(!both.eval(&mut recognizer, 4));
        assert!(either.eval(&mut recognizer, 4));
        assert!(recognizer.evaluated.iter().all(|&(_, _, pos)| pos == 4));

        recognizer.min_precedence = 2;
        assert!(SemanticContext::Precedence(2).eval(&mut recognizer, 0));
        assert!(!SemanticContext::Precedence(1).eval(&mut recognizer, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(pred(1).to_string(), "{0:1}?");
        assert_eq!(SemanticContext::and(&pred(1), &pred(2)).to_string(), "{0:1}?&&{0:2}?");
    }
}
