//! Prediction contexts
//!
//! A prediction context is the set of call stacks a configuration may be
//! running under. Nodes are stored in a [`ContextArena`] and hash-consed:
//! structurally equal nodes share one [`ContextId`], so comparing contexts
//! is comparing ids. Every node is a list of `(return state, parent)`
//! entries sorted by return state; the empty stack `$` is the sentinel
//! [`EMPTY_RETURN_STATE`], which sorts last.
//!
//! The arena only grows. It is dropped with the cache generation that owns
//! it.

pub mod merge;

use crate::atn::{Atn, StateId, Transition};
use crate::config::compile_time;
use crate::simulator::{ResourceExhausted, ResourceLimit};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Return state marking the empty stack inside a node
pub const EMPTY_RETURN_STATE: usize = usize::MAX;

/// Handle to an interned context node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    /// The empty call stack
    pub const EMPTY: ContextId = ContextId(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "$")
        } else {
            write!(f, "ctx#{}", self.0)
        }
    }
}

/// One `(return state, parent)` pair of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextEntry {
    pub return_state: usize,
    pub parent: ContextId,
}

impl ContextEntry {
    pub const EMPTY_PATH: ContextEntry = ContextEntry {
        return_state: EMPTY_RETURN_STATE,
        parent: ContextId::EMPTY,
    };

    pub fn is_empty_path(&self) -> bool {
        self.return_state == EMPTY_RETURN_STATE
    }
}

type Node = Arc<[ContextEntry]>;

struct ArenaNodes {
    nodes: Vec<Node>,
    depth: Vec<usize>,
    lookup: HashMap<Node, ContextId>,
}

pub struct ContextArena {
    inner: RwLock<ArenaNodes>,
    max_nodes: usize,
    max_depth: usize,
}

impl Default for ContextArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextArena")
            .field("nodes", &self.node_count())
            .field("max_nodes", &self.max_nodes)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl ContextArena {
    pub fn new() -> Self {
        Self::with_limits(
            compile_time::context::MAX_ARENA_NODES,
            compile_time::context::MAX_CONTEXT_DEPTH,
        )
    }

    pub fn with_limits(max_nodes: usize, max_depth: usize) -> Self {
        let empty: Node = Arc::from(vec![ContextEntry::EMPTY_PATH]);
        let mut lookup = HashMap::new();
        lookup.insert(empty.clone(), ContextId::EMPTY);
        Self {
            inner: RwLock::new(ArenaNodes {
                nodes: vec![empty],
                depth: vec![0],
                lookup,
            }),
            max_nodes: max_nodes.max(1),
            max_depth,
        }
    }

    pub fn empty(&self) -> ContextId {
        ContextId::EMPTY
    }

    pub fn node_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .nodes
            .len()
    }

    /// The entries of a node, sorted by return state
    pub fn entries(&self, id: ContextId) -> Node {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).nodes[id.index()].clone()
    }

    pub fn len(&self, id: ContextId) -> usize {
        self.entries(id).len()
    }

    pub fn return_state(&self, id: ContextId, i: usize) -> usize {
        self.entries(id)[i].return_state
    }

    pub fn parent(&self, id: ContextId, i: usize) -> ContextId {
        self.entries(id)[i].parent
    }

    /// True when one of the stacks in `id` is empty
    pub fn has_empty_path(&self, id: ContextId) -> bool {
        self.entries(id)
            .last()
            .map(ContextEntry::is_empty_path)
            .unwrap_or(false)
    }

    /// Longest stack in `id`
    pub fn depth(&self, id: ContextId) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).depth[id.index()]
    }

    /// Context for calling into a rule that returns to `return_state`
    pub fn push(
        &self,
        parent: ContextId,
        return_state: StateId,
    ) -> Result<ContextId, ResourceExhausted> {
        self.intern(vec![ContextEntry {
            return_state,
            parent,
        }])
    }

    /// Context equivalent to a concrete parser call stack. `invoking_states`
    /// lists the states that called each active rule, outermost first; each
    /// contributes the follow state of its rule transition.
    pub fn from_call_stack(
        &self,
        atn: &Atn,
        invoking_states: &[StateId],
    ) -> Result<ContextId, ResourceExhausted> {
        let mut context = ContextId::EMPTY;
        for &invoking in invoking_states {
            let follow = atn
                .states
                .get(invoking)
                .and_then(|s| s.transitions.first())
                .and_then(|t| match t {
                    Transition::Rule { follow_state, .. } => Some(*follow_state),
                    _ => None,
                });
            if let Some(follow) = follow {
                context = self.push(context, follow)?;
            }
        }
        Ok(context)
    }

    /// Intern a sorted entry list, returning the canonical id
    pub(crate) fn intern(&self, entries: Vec<ContextEntry>) -> Result<ContextId, ResourceExhausted> {
        debug_assert!(entries.windows(2).all(|w| w[0].return_state < w[1].return_state));
        let node: Node = Arc::from(entries);

        if let Some(&id) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup
            .get(&node)
        {
            return Ok(id);
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = inner.lookup.get(&node) {
            return Ok(id);
        }

        let depth = node
            .iter()
            .filter(|e| !e.is_empty_path())
            .map(|e| inner.depth[e.parent.index()] + 1)
            .max()
            .unwrap_or(0);
        if depth > self.max_depth {
            return Err(ResourceExhausted::new(
                ResourceLimit::ContextDepth,
                self.max_depth,
                depth,
            ));
        }
        if inner.nodes.len() >= self.max_nodes || inner.nodes.len() >= u32::MAX as usize {
            return Err(ResourceExhausted::new(
                ResourceLimit::ArenaNodes,
                self.max_nodes,
                inner.nodes.len() + 1,
            ));
        }

        let id = ContextId(inner.nodes.len() as u32);
        inner.nodes.push(node.clone());
        inner.depth.push(depth);
        inner.lookup.insert(node, id);
        Ok(id)
    }

    /// Every stack in `id`, innermost return state first. Exponential in the
    /// worst case; meant for diagnostics and tests.
    pub fn stacks(&self, id: ContextId) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut pending = vec![(id, Vec::new())];
        while let Some((ctx, prefix)) = pending.pop() {
            for entry in self.entries(ctx).iter().rev() {
                if entry.is_empty_path() {
                    out.push(prefix.clone());
                } else {
                    let mut stack = prefix.clone();
                    stack.push(entry.return_state);
                    pending.push((entry.parent, stack));
                }
            }
        }
        out.sort();
        out
    }

    /// Top frame rendering used in configuration dumps: `[7 12 $]`
    pub fn describe(&self, id: ContextId) -> String {
        let parts: Vec<String> = self
            .entries(id)
            .iter()
            .map(|e| {
                if e.is_empty_path() {
                    "$".to_string()
                } else {
                    e.return_state.to_string()
                }
            })
            .collect();
        format!("[{}]", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use assert_matches::assert_matches;

    #[test]
    fn test_push_is_interned() {
        let arena = ContextArena::new();
        let a = arena.push(ContextId::EMPTY, 5).unwrap();
        let b = arena.push(ContextId::EMPTY, 5).unwrap();
        let c = arena.push(ContextId::EMPTY, 6).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.node_count(), 3);
        assert_eq!(arena.depth(a), 1);
        assert_eq!(arena.stacks(a), vec![vec![5]]);
    }

    #[test]
    fn test_empty_context() {
        let arena = ContextArena::new();
        let empty = arena.empty();
        assert!(empty.is_empty());
        assert!(arena.has_empty_path(empty));
        assert_eq!(arena.len(empty), 1);
        assert_eq!(arena.depth(empty), 0);
        assert_eq!(arena.stacks(empty), vec![Vec::<usize>::new()]);
        assert_eq!(arena.describe(empty), "[$]");
    }

    #[test]
    fn test_depth_ceiling() {
        let arena = ContextArena::with_limits(100, 2);
        let one = arena.push(ContextId::EMPTY, 1).unwrap();
        let two = arena.push(one, 2).unwrap();
        assert_matches!(
            arena.push(two, 3),
            Err(ResourceExhausted {
                limit: ResourceLimit::ContextDepth,
                ceiling: 2,
                observed: 3
            })
        );
    }

    #[test]
    fn test_node_ceiling() {
        let arena = ContextArena::with_limits(2, 100);
        arena.push(ContextId::EMPTY, 1).unwrap();
        assert_matches!(
            arena.push(ContextId::EMPTY, 2),
            Err(ResourceExhausted {
                limit: ResourceLimit::ArenaNodes,
                ..
            })
        );
        // existing nodes are still found
        assert!(arena.push(ContextId::EMPTY, 1).is_ok());
    }

    #[test]
    fn test_from_call_stack_uses_follow_states() {
        let atn = fixtures::nested_call_parser();
        let invoking: Vec<StateId> = atn
            .states
            .iter()
            .filter(|s| matches!(s.transitions.first(), Some(Transition::Rule { .. })))
            .map(|s| s.index)
            .take(1)
            .collect();
        let follow = match atn.states[invoking[0]].transitions[0] {
            Transition::Rule { follow_state, .. } => follow_state,
            _ => unreachable!(),
        };

        let arena = ContextArena::new();
        let ctx = arena.from_call_stack(&atn, &invoking).unwrap();
        assert_eq!(arena.stacks(ctx), vec![vec![follow]]);
        assert_eq!(arena.from_call_stack(&atn, &[]).unwrap(), ContextId::EMPTY);
    }
}
