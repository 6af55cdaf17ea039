//! Configuration sets

use super::AtnConfig;
use crate::action::LexerActionExecutor;
use crate::atn::{StateId, INVALID_ALT};
use crate::config::compile_time;
use crate::context::{ContextArena, ContextId};
use crate::semantic::SemanticContext;
use crate::simulator::{ConfigSummary, ResourceExhausted, ResourceLimit};
use crate::utils::AltSet;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity used for deduplication. Parser sets leave `exact` empty so that
/// configurations differing only in context merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigKey {
    state: StateId,
    alt: usize,
    semantic_context: SemanticContext,
    exact: Option<(ContextId, Option<Arc<LexerActionExecutor>>, bool)>,
}

/// Ordered, deduplicating set of configurations. Once a set is moved into a
/// DFA state it is only reachable through shared references and is frozen.
#[derive(Debug, Clone)]
pub struct AtnConfigSet {
    configs: Vec<AtnConfig>,
    index: HashMap<ConfigKey, usize>,
    ordered: bool,
    max_size: usize,

    /// Built during full-context prediction; contexts merge exactly
    pub full_ctx: bool,
    pub has_semantic_context: bool,
    pub dips_into_outer_context: bool,

    /// Single alternative predicted by every configuration, or INVALID_ALT
    pub unique_alt: usize,
    pub conflicting_alts: Option<AltSet>,
}

impl AtnConfigSet {
    /// Parser set: duplicates by (state, alt, predicate) merge their contexts
    pub fn new(full_ctx: bool) -> Self {
        Self::build(full_ctx, false)
    }

    /// Lexer set: keeps insertion order and only drops exact duplicates
    pub fn new_ordered() -> Self {
        Self::build(true, true)
    }

    fn build(full_ctx: bool, ordered: bool) -> Self {
        Self {
            configs: Vec::new(),
            index: HashMap::new(),
            ordered,
            max_size: compile_time::prediction::MAX_CONFIGS_PER_SET,
            full_ctx,
            has_semantic_context: false,
            dips_into_outer_context: false,
            unique_alt: INVALID_ALT,
            conflicting_alts: None,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    fn key(&self, config: &AtnConfig) -> ConfigKey {
        ConfigKey {
            state: config.state,
            alt: config.alt,
            semantic_context: config.semantic_context.clone(),
            exact: self.ordered.then(|| {
                (
                    config.context,
                    config.lexer_executor.clone(),
                    config.passed_through_non_greedy,
                )
            }),
        }
    }

    /// Add a configuration, merging it into an existing one where the set's
    /// keying says they are the same. Returns true when a new entry was made.
    pub fn add(
        &mut self,
        config: AtnConfig,
        arena: &ContextArena,
    ) -> Result<bool, ResourceExhausted> {
        if !config.semantic_context.is_none() {
            self.has_semantic_context = true;
        }
        if config.reaches_into_outer_context > 0 {
            self.dips_into_outer_context = true;
        }

        let key = self.key(&config);
        if let Some(&i) = self.index.get(&key) {
            if self.ordered {
                return Ok(false);
            }
            let root_is_wildcard = !self.full_ctx;
            let existing = &mut self.configs[i];
            let merged = arena.merge(existing.context, config.context, root_is_wildcard)?;
            existing.reaches_into_outer_context = existing
                .reaches_into_outer_context
                .max(config.reaches_into_outer_context);
            existing.passed_through_non_greedy |= config.passed_through_non_greedy;
            existing.context = merged;
            return Ok(false);
        }

        if self.configs.len() >= self.max_size {
            return Err(ResourceExhausted::new(
                ResourceLimit::ConfigSetSize,
                self.max_size,
                self.configs.len() + 1,
            ));
        }
        self.index.insert(key, self.configs.len());
        self.configs.push(config);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtnConfig> {
        self.configs.iter()
    }

    pub fn configs(&self) -> &[AtnConfig] {
        &self.configs
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Every alternative predicted by some configuration
    pub fn alts(&self) -> AltSet {
        self.configs.iter().map(|c| c.alt).collect()
    }

    /// Hash of the configurations, used to find the canonical DFA state
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            config_count: self.configs.len(),
            alts: self.alts(),
            full_context: self.full_ctx,
        }
    }

    /// Render every configuration for dumps and debug events
    pub fn describe(&self, arena: &ContextArena) -> String {
        let parts: Vec<String> = self.configs.iter().map(|c| c.describe(arena)).collect();
        format!("[{}]", parts.join(", "))
    }
}

impl PartialEq for AtnConfigSet {
    fn eq(&self, other: &Self) -> bool {
        self.full_ctx == other.full_ctx
            && self.unique_alt == other.unique_alt
            && self.conflicting_alts == other.conflicting_alts
            && self.has_semantic_context == other.has_semantic_context
            && self.dips_into_outer_context == other.dips_into_outer_context
            && self.configs == other.configs
    }
}

impl Eq for AtnConfigSet {}

impl Hash for AtnConfigSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_ctx.hash(state);
        self.configs.hash(state);
    }
}

impl<'a> IntoIterator for &'a AtnConfigSet {
    type Item = &'a AtnConfig;
    type IntoIter = std::slice::Iter<'a, AtnConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}
