//! Context merge
//!
//! Merging unions the stacks of two contexts. Entries are merged like two
//! sorted lists: equal return states collapse into one entry whose parent is
//! the merge of both parents. With `root_is_wildcard` (SLL prediction) the
//! empty stack stands for "any caller", so anything merged with `$` is `$`.

use super::{ContextArena, ContextEntry, ContextId};
use crate::simulator::ResourceExhausted;

impl ContextArena {
    pub fn merge(
        &self,
        a: ContextId,
        b: ContextId,
        root_is_wildcard: bool,
    ) -> Result<ContextId, ResourceExhausted> {
        if a == b {
            return Ok(a);
        }
        if root_is_wildcard && (a.is_empty() || b.is_empty()) {
            return Ok(ContextId::EMPTY);
        }

        let left = self.entries(a);
        let right = self.entries(b);
        let mut merged = Vec::with_capacity(left.len() + right.len());

        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            let (l, r) = (left[i], right[j]);
            if l.return_state == r.return_state {
                let parent = if l.parent == r.parent {
                    l.parent
                } else {
                    self.merge(l.parent, r.parent, root_is_wildcard)?
                };
                merged.push(ContextEntry {
                    return_state: l.return_state,
                    parent,
                });
                i += 1;
                j += 1;
            } else if l.return_state < r.return_state {
                merged.push(l);
                i += 1;
            } else {
                merged.push(r);
                j += 1;
            }
        }
        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);

        self.intern(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(arena: &ContextArena, frames: &[usize]) -> ContextId {
        // frames listed outermost first
        frames
            .iter()
            .try_fold(ContextId::EMPTY, |ctx, &rs| arena.push(ctx, rs))
            .unwrap()
    }

    #[test]
    fn test_merge_is_idempotent() {
        let arena = ContextArena::new();
        let a = stack(&arena, &[3, 7]);
        assert_eq!(arena.merge(a, a, false).unwrap(), a);
        assert_eq!(arena.merge(a, a, true).unwrap(), a);
    }

    #[test]
    fn test_merge_is_commutative() {
        let arena = ContextArena::new();
        let cases = [
            (stack(&arena, &[1]), stack(&arena, &[2])),
            (stack(&arena, &[1, 5]), stack(&arena, &[2, 5])),
            (stack(&arena, &[4]), ContextId::EMPTY),
            (stack(&arena, &[1, 2, 3]), stack(&arena, &[9, 3])),
        ];
        for (a, b) in cases {
            for wildcard in [false, true] {
                let ab = arena.merge(a, b, wildcard).unwrap();
                let ba = arena.merge(b, a, wildcard).unwrap();
                assert_eq!(ab, ba);
                assert_eq!(arena.merge(ab, a, wildcard).unwrap(), ab);
            }
        }
    }

    #[test]
    fn test_same_parent_singletons_union_return_states() {
        let arena = ContextArena::new();
        let a = stack(&arena, &[1, 5]);
        let b = stack(&arena, &[1, 6]);
        let merged = arena.merge(a, b, false).unwrap();
        assert_eq!(arena.len(merged), 2);
        assert_eq!(arena.parent(merged, 0), arena.parent(merged, 1));
        assert_eq!(arena.stacks(merged), vec![vec![5, 1], vec![6, 1]]);
    }

    #[test]
    fn test_equal_return_states_merge_parents() {
        let arena = ContextArena::new();
        let a = stack(&arena, &[1, 5]);
        let b = stack(&arena, &[2, 5]);
        let merged = arena.merge(a, b, false).unwrap();
        assert_eq!(arena.len(merged), 1);
        assert_eq!(arena.stacks(merged), vec![vec![5, 1], vec![5, 2]]);
    }

    #[test]
    fn test_root_is_wildcard() {
        let arena = ContextArena::new();
        let a = stack(&arena, &[4]);
        assert_eq!(arena.merge(a, ContextId::EMPTY, true).unwrap(), ContextId::EMPTY);

        let exact = arena.merge(a, ContextId::EMPTY, false).unwrap();
        assert!(arena.has_empty_path(exact));
        assert_eq!(arena.stacks(exact), vec![vec![], vec![4]]);
        assert_eq!(arena.describe(exact), "[4 $]");
    }
}
