//! Lexer actions
//!
//! The fixed set of lexer commands plus host-defined custom actions. Actions
//! are immutable values shared by every configuration that carries them; a
//! [`LexerActionExecutor`] sequences the ones attached to a matched token.

pub mod executor;

pub use executor::LexerActionExecutor;

use crate::lexer::LexerResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant used for dispatch and serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexerActionType {
    Channel,
    Custom,
    Mode,
    More,
    PopMode,
    PushMode,
    Skip,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexerAction {
    Channel { channel: i32 },
    Custom { rule_index: usize, action_index: usize },
    Mode { mode: usize },
    More,
    PopMode,
    PushMode { mode: usize },
    Skip,
    Type { token_type: i32 },
    /// A position-dependent action pinned to `offset` characters past the
    /// token start, so it runs with the input where the action appeared
    Indexed { offset: usize, action: Box<LexerAction> },
}

/// The lexer state actions operate on
pub trait LexerControl {
    fn set_type(&mut self, token_type: i32);
    fn set_channel(&mut self, channel: i32);
    fn set_mode(&mut self, mode: usize) -> LexerResult<()>;
    fn push_mode(&mut self, mode: usize) -> LexerResult<()>;
    fn pop_mode(&mut self) -> LexerResult<usize>;
    fn skip(&mut self);
    fn more(&mut self);
    fn custom_action(&mut self, rule_index: usize, action_index: usize);

    /// Current input position
    fn index(&self) -> usize;
    fn seek(&mut self, index: usize);
}

impl LexerAction {
    pub fn action_type(&self) -> LexerActionType {
        match self {
            LexerAction::Channel { .. } => LexerActionType::Channel,
            LexerAction::Custom { .. } => LexerActionType::Custom,
            LexerAction::Mode { .. } => LexerActionType::Mode,
            LexerAction::More => LexerActionType::More,
            LexerAction::PopMode => LexerActionType::PopMode,
            LexerAction::PushMode { .. } => LexerActionType::PushMode,
            LexerAction::Skip => LexerActionType::Skip,
            LexerAction::Type { .. } => LexerActionType::Type,
            LexerAction::Indexed { action, .. } => action.action_type(),
        }
    }

    /// True when the effect depends on the input position at execution
    /// time. Built-in commands only touch lexer state, so they may run at
    /// the end of the token; custom code must run where it appeared.
    pub fn is_position_dependent(&self) -> bool {
        matches!(
            self,
            LexerAction::Custom { .. } | LexerAction::Indexed { .. }
        )
    }

    /// Apply the action. Position-dependent actions assume the caller has
    /// already placed the input cursor.
    pub fn execute<L: LexerControl + ?Sized>(&self, lexer: &mut L) -> LexerResult<()> {
        match self {
            LexerAction::Channel { channel } => lexer.set_channel(*channel),
            LexerAction::Custom {
                rule_index,
                action_index,
            } => lexer.custom_action(*rule_index, *action_index),
            LexerAction::Mode { mode } => lexer.set_mode(*mode)?,
            LexerAction::More => lexer.more(),
            LexerAction::PopMode => {
                lexer.pop_mode()?;
            }
            LexerAction::PushMode { mode } => lexer.push_mode(*mode)?,
            LexerAction::Skip => lexer.skip(),
            LexerAction::Type { token_type } => lexer.set_type(*token_type),
            LexerAction::Indexed { action, .. } => action.execute(lexer)?,
        }
        Ok(())
    }
}

impl fmt::Display for LexerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerAction::Channel { channel } => write!(f, "channel({})", channel),
            LexerAction::Custom {
                rule_index,
                action_index,
            } => write!(f, "custom({}, {})", rule_index, action_index),
            LexerAction::Mode { mode } => write!(f, "mode({})", mode),
            LexerAction::More => write!(f, "more"),
            LexerAction::PopMode => write!(f, "popMode"),
            LexerAction::PushMode { mode } => write!(f, "pushMode({})", mode),
            LexerAction::Skip => write!(f, "skip"),
            LexerAction::Type { token_type } => write!(f, "type({})", token_type),
            LexerAction::Indexed { offset, action } => write!(f, "{}@{}", action, offset),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lexer::LexerError;
    use assert_matches::assert_matches;

    /// Records what actions did, for executor and action tests
    #[derive(Debug, Default)]
    pub(crate) struct RecordingControl {
        pub token_type: Option<i32>,
        pub channel: i32,
        pub mode: usize,
        pub modes: Vec<usize>,
        pub skipped: bool,
        pub more: bool,
        pub customs: Vec<(usize, usize, usize)>,
        pub position: usize,
    }

    impl LexerControl for RecordingControl {
        fn set_type(&mut self, token_type: i32) {
            self.token_type = Some(token_type);
        }
        fn set_channel(&mut self, channel: i32) {
            self.channel = channel;
        }
        fn set_mode(&mut self, mode: usize) -> LexerResult<()> {
            self.mode = mode;
            Ok(())
        }
        fn push_mode(&mut self, mode: usize) -> LexerResult<()> {
            self.modes.push(self.mode);
            self.mode = mode;
            Ok(())
        }
        fn pop_mode(&mut self) -> LexerResult<usize> {
            self.mode = self.modes.pop().ok_or(LexerError::EmptyModeStack)?;
            Ok(self.mode)
        }
        fn skip(&mut self) {
            self.skipped = true;
        }
        fn more(&mut self) {
            self.more = true;
        }
        fn custom_action(&mut self, rule_index: usize, action_index: usize) {
            self.customs.push((rule_index, action_index, self.position));
        }
        fn index(&self) -> usize {
            self.position
        }
        fn seek(&mut self, index: usize) {
            self.position = index;
        }
    }

    #[test]
    fn test_position_dependence() {
        assert!(!LexerAction::Skip.is_position_dependent());
        assert!(!LexerAction::PushMode { mode: 1 }.is_position_dependent());
        assert!(LexerAction::Custom {
            rule_index: 0,
            action_index: 0
        }
        .is_position_dependent());
    }

    #[test]
    fn test_indexed_action_reports_inner_type() {
        let action = LexerAction::Indexed {
            offset: 2,
            action: Box::new(LexerAction::Custom {
                rule_index: 1,
                action_index: 3,
            }),
        };
        assert_eq!(action.action_type(), LexerActionType::Custom);
        assert!(action.is_position_dependent());
    }

    #[test]
    fn test_mode_commands() {
        let mut lexer = RecordingControl::default();
        LexerAction::PushMode { mode: 2 }.execute(&mut lexer).unwrap();
        assert_eq!(lexer.mode, 2);
        LexerAction::PopMode.execute(&mut lexer).unwrap();
        assert_eq!(lexer.mode, 0);
        assert_matches!(
            LexerAction::PopMode.execute(&mut lexer),
            Err(LexerError::EmptyModeStack)
        );
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let json = serde_json::to_string(&LexerAction::Channel { channel: 1 }).unwrap();
        assert_eq!(json, r#"{"kind":"channel","channel":1}"#);
    }
}
