//! Sequenced lexer actions for one token

use super::{LexerAction, LexerControl};
use crate::lexer::LexerResult;
use std::fmt;
use std::sync::Arc;

/// Immutable list of actions to run when a token is committed. Equality and
/// hashing are by value, so configurations carrying equal executors
/// deduplicate and DFA states stay canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexerActionExecutor {
    actions: Vec<LexerAction>,
}

impl LexerActionExecutor {
    pub fn new(actions: Vec<LexerAction>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[LexerAction] {
        &self.actions
    }

    /// Executor running `existing` (if any) followed by `action`
    pub fn append(existing: Option<&Arc<Self>>, action: LexerAction) -> Arc<Self> {
        let mut actions = existing.map(|e| e.actions.clone()).unwrap_or_default();
        actions.push(action);
        Arc::new(Self { actions })
    }

    /// Pin every position-dependent action that is not pinned yet to
    /// `offset` characters past the token start. Returns `None` when nothing
    /// needed pinning, so callers keep sharing the existing executor.
    pub fn fix_offset_before_match(&self, offset: usize) -> Option<Arc<Self>> {
        let needs_fix = self
            .actions
            .iter()
            .any(|a| a.is_position_dependent() && !matches!(a, LexerAction::Indexed { .. }));
        if !needs_fix {
            return None;
        }

        let actions = self
            .actions
            .iter()
            .map(|action| {
                if action.is_position_dependent() && !matches!(action, LexerAction::Indexed { .. })
                {
                    LexerAction::Indexed {
                        offset,
                        action: Box::new(action.clone()),
                    }
                } else {
                    action.clone()
                }
            })
            .collect();
        Some(Arc::new(Self { actions }))
    }

    /// Run the actions for a token that started at `start_index`. The input
    /// is expected at the token's end; indexed actions are run with the
    /// cursor at their recorded offset and the cursor is restored afterwards,
    /// including when an action fails.
    pub fn execute<L: LexerControl + ?Sized>(
        &self,
        lexer: &mut L,
        start_index: usize,
    ) -> LexerResult<()> {
        let stop_index = lexer.index();
        let mut requires_seek = false;

        let mut result = Ok(());
        for action in &self.actions {
            let action = match action {
                LexerAction::Indexed { offset, action } => {
                    let position = start_index + offset;
                    lexer.seek(position);
                    requires_seek = position != stop_index;
                    action.as_ref()
                }
                other => {
                    if other.is_position_dependent() {
                        lexer.seek(stop_index);
                        requires_seek = false;
                    }
                    other
                }
            };
            if let Err(e) = action.execute(lexer) {
                result = Err(e);
                break;
            }
        }

        if requires_seek || result.is_err() {
            lexer.seek(stop_index);
        }
        result
    }
}

impl fmt::Display for LexerActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.actions.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
