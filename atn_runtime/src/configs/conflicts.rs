//! Conflict analysis over configuration sets
//!
//! A conflict subset is the set of alternatives predicted by configurations
//! that share a state and a context. Two alternatives in one subset will
//! follow identical paths from here on, so lookahead can no longer separate
//! them within this context.

use super::{AtnConfig, AtnConfigSet};
use crate::atn::{Atn, StateId, INVALID_ALT};
use crate::context::{ContextArena, ContextId};
use crate::semantic::SemanticContext;
use crate::simulator::{PredictionMode, ResourceExhausted};
use crate::utils::AltSet;
use std::collections::BTreeMap;

/// Alternatives grouped by (state, context), in a stable order
pub fn get_conflicting_alt_subsets(configs: &AtnConfigSet) -> Vec<AltSet> {
    let mut subsets: BTreeMap<(StateId, ContextId), AltSet> = BTreeMap::new();
    for config in configs {
        subsets
            .entry((config.state, config.context))
            .or_default()
            .insert(config.alt);
    }
    subsets.into_values().collect()
}

/// Alternatives reaching each state, ignoring context
pub fn get_state_to_alt_map(configs: &AtnConfigSet) -> BTreeMap<StateId, AltSet> {
    let mut map: BTreeMap<StateId, AltSet> = BTreeMap::new();
    for config in configs {
        map.entry(config.state).or_default().insert(config.alt);
    }
    map
}

pub fn has_state_associated_with_one_alt(configs: &AtnConfigSet) -> bool {
    get_state_to_alt_map(configs).values().any(|alts| alts.len() == 1)
}

pub fn has_conflicting_alt_set(subsets: &[AltSet]) -> bool {
    subsets.iter().any(|alts| alts.len() > 1)
}

pub fn has_non_conflicting_alt_set(subsets: &[AltSet]) -> bool {
    subsets.iter().any(|alts| alts.len() == 1)
}

pub fn all_subsets_conflict(subsets: &[AltSet]) -> bool {
    !has_non_conflicting_alt_set(subsets)
}

pub fn all_subsets_equal(subsets: &[AltSet]) -> bool {
    match subsets.split_first() {
        Some((first, rest)) => rest.iter().all(|alts| alts == first),
        None => true,
    }
}

/// Union of all subsets
pub fn get_alts(subsets: &[AltSet]) -> AltSet {
    subsets.iter().flatten().copied().collect()
}

/// The only alternative across all subsets, or INVALID_ALT
pub fn get_unique_alt(subsets: &[AltSet]) -> usize {
    let all = get_alts(subsets);
    if all.len() == 1 {
        all.first().copied().unwrap_or(INVALID_ALT)
    } else {
        INVALID_ALT
    }
}

/// Alternative every configuration predicts, or INVALID_ALT
pub fn unique_alt_of(configs: &AtnConfigSet) -> usize {
    let mut alt = INVALID_ALT;
    for config in configs {
        if alt == INVALID_ALT {
            alt = config.alt;
        } else if config.alt != alt {
            return INVALID_ALT;
        }
    }
    alt
}

/// Alternative chosen when every subset resolves to the same minimum.
/// Each subset would pick its lowest alternative; if they all pick the
/// same one, further lookahead cannot change the outcome.
pub fn resolves_to_just_one_viable_alt(subsets: &[AltSet]) -> usize {
    let viable: AltSet = subsets
        .iter()
        .filter_map(|alts| alts.first().copied())
        .collect();
    if viable.len() > 1 {
        return INVALID_ALT;
    }
    viable.first().copied().unwrap_or(INVALID_ALT)
}

pub fn all_configs_in_rule_stop_states(configs: &AtnConfigSet, atn: &Atn) -> bool {
    configs.iter().all(|c| atn.state(c.state).is_rule_stop())
}

pub fn has_config_in_rule_stop_state(configs: &AtnConfigSet, atn: &Atn) -> bool {
    configs.iter().any(|c| atn.state(c.state).is_rule_stop())
}

/// Whether SLL simulation should stop on `configs`: every configuration has
/// finished the decision rule, or some subset conflicts and no state still
/// separates the alternatives.
pub fn has_sll_conflict_terminating_prediction(
    mode: PredictionMode,
    configs: &AtnConfigSet,
    atn: &Atn,
    arena: &ContextArena,
) -> Result<bool, ResourceExhausted> {
    if all_configs_in_rule_stop_states(configs, atn) {
        return Ok(true);
    }

    // In pure SLL, predicates are not used to split conflicts, so compare
    // the configurations as if no predicates were attached
    let stripped;
    let configs = if mode == PredictionMode::Sll && configs.has_semantic_context {
        let mut without = AtnConfigSet::new(configs.full_ctx);
        for config in configs {
            without.add(
                AtnConfig {
                    semantic_context: SemanticContext::None,
                    ..config.clone()
                },
                arena,
            )?;
        }
        stripped = without;
        &stripped
    } else {
        configs
    };

    let subsets = get_conflicting_alt_subsets(configs);
    Ok(has_conflicting_alt_set(&subsets) && !has_state_associated_with_one_alt(configs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(values: &[usize]) -> AltSet {
        values.iter().copied().collect()
    }

    fn set_of(arena: &ContextArena, configs: &[(StateId, usize, ContextId)]) -> AtnConfigSet {
        let mut set = AtnConfigSet::new(true);
        for &(state, alt, ctx) in configs {
            set.add(AtnConfig::new(state, alt, ctx), arena).unwrap();
        }
        set
    }

    #[test]
    fn test_subsets_group_by_state_and_context() {
        let arena = ContextArena::new();
        let x = arena.push(ContextId::EMPTY, 1).unwrap();
        let y = arena.push(ContextId::EMPTY, 2).unwrap();
        let set = set_of(&arena, &[(5, 1, x), (5, 2, x), (5, 3, y), (6, 1, x)]);

        let subsets = get_conflicting_alt_subsets(&set);
        assert_eq!(subsets.len(), 3);
        assert!(subsets.contains(&alts(&[1, 2])));
        assert!(has_conflicting_alt_set(&subsets));
        assert!(has_non_conflicting_alt_set(&subsets));
        assert!(!all_subsets_conflict(&subsets));
        assert_eq!(get_alts(&subsets), alts(&[1, 2, 3]));
    }

    #[test]
    fn test_resolution_helpers() {
        assert_eq!(resolves_to_just_one_viable_alt(&[alts(&[1, 2]), alts(&[1, 3])]), 1);
        assert_eq!(
            resolves_to_just_one_viable_alt(&[alts(&[1, 2]), alts(&[2, 3])]),
            INVALID_ALT
        );
        assert_eq!(get_unique_alt(&[alts(&[2]), alts(&[2])]), 2);
        assert_eq!(get_unique_alt(&[alts(&[1]), alts(&[2])]), INVALID_ALT);
        assert!(all_subsets_equal(&[alts(&[1, 2]), alts(&[1, 2])]));
        assert!(!all_subsets_equal(&[alts(&[1, 2]), alts(&[1, 3])]));
    }

    #[test]
    fn test_unique_alt_of_set() {
        let arena = ContextArena::new();
        let set = set_of(&arena, &[(1, 2, ContextId::EMPTY), (3, 2, ContextId::EMPTY)]);
        assert_eq!(unique_alt_of(&set), 2);
        let set = set_of(&arena, &[(1, 2, ContextId::EMPTY), (3, 1, ContextId::EMPTY)]);
        assert_eq!(unique_alt_of(&set), INVALID_ALT);
        assert_eq!(unique_alt_of(&AtnConfigSet::new(false)), INVALID_ALT);
    }

    #[test]
    fn test_sll_termination_needs_every_state_conflicting() {
        let atn = crate::fixtures::ab_ac_parser();
        let arena = ContextArena::new();

        // both alternatives share one state: conflict, terminate
        let shared = set_of(&arena, &[(2, 1, ContextId::EMPTY), (2, 2, ContextId::EMPTY)]);
        assert!(
            has_sll_conflict_terminating_prediction(PredictionMode::Ll, &shared, &atn, &arena)
                .unwrap()
        );

        // another state still predicts alt 1 alone: keep going
        let split = set_of(
            &arena,
            &[
                (2, 1, ContextId::EMPTY),
                (2, 2, ContextId::EMPTY),
                (3, 1, ContextId::EMPTY),
            ],
        );
        assert!(
            !has_sll_conflict_terminating_prediction(PredictionMode::Ll, &split, &atn, &arena)
                .unwrap()
        );
    }
}
