//! Host callbacks
//!
//! Predicates and actions are opaque to the runtime: the automaton only
//! names them by `(rule, index)` and the host decides what they mean.

/// Callbacks a generated lexer or parser provides to the simulators
pub trait Recognizer {
    fn grammar_name(&self) -> &str {
        ""
    }

    /// Evaluate semantic predicate `pred_index` of `rule_index` with the
    /// input at `position`
    fn sempred(&mut self, _rule_index: usize, _pred_index: usize, _position: usize) -> bool {
        true
    }

    /// Whether an operator of `precedence` may continue the current
    /// left-recursive rule invocation
    fn precpred(&mut self, _precedence: i32) -> bool {
        true
    }

    /// Run embedded action `action_index` of `rule_index`
    fn action(&mut self, _rule_index: usize, _action_index: usize, _position: usize) {}
}

/// Recognizer whose predicates all hold and whose actions do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRecognizer;

impl Recognizer for DefaultRecognizer {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Recognizer with scripted predicate outcomes that records what the
    /// runtime asked
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedRecognizer {
        pub predicates: HashMap<(usize, usize), bool>,
        pub min_precedence: i32,
        pub evaluated: Vec<(usize, usize, usize)>,
        pub actions: Vec<(usize, usize, usize)>,
    }

    impl ScriptedRecognizer {
        pub fn with_predicate(mut self, rule_index: usize, pred_index: usize, value: bool) -> Self {
            self.predicates.insert((rule_index, pred_index), value);
            self
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn grammar_name(&self) -> &str {
            "Scripted"
        }

        fn sempred(&mut self, rule_index: usize, pred_index: usize, position: usize) -> bool {
            self.evaluated.push((rule_index, pred_index, position));
            self.predicates
                .get(&(rule_index, pred_index))
                .copied()
                .unwrap_or(true)
        }

        fn precpred(&mut self, precedence: i32) -> bool {
            precedence >= self.min_precedence
        }

        fn action(&mut self, rule_index: usize, action_index: usize, position: usize) {
            self.actions.push((rule_index, action_index, position));
        }
    }

    #[test]
    fn test_default_recognizer_accepts_everything() {
        let mut recognizer = DefaultRecognizer;
        assert!(recognizer.sempred(0, 0, 0));
        assert!(recognizer.precpred(100));
        assert_eq!(recognizer.grammar_name(), "");
    }
}
