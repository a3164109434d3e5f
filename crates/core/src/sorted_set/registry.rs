//! Registry of named sorted sets.
//!
//! Sets are created lazily on first write and live until explicitly deleted.
//! The registry lock only guards the name → handle map; per-set work runs
//! under that set's own lock after the registry lock is released.

use crate::config::SkipListConfig;
use crate::error::Result;
use crate::skiplist::ScoreRange;
use crate::sorted_set::record::SortedSet;
use crate::sorted_set::types::{
    validate_member, validate_score, validate_set_name, AddOutcome, Limit, ScoredMember,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// All sorted sets of one process, keyed by name.
///
/// Cloning produces a new handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sets: Arc<RwLock<HashMap<String, SortedSet>>>,
    config: SkipListConfig,
}

impl Registry {
    /// Creates an empty registry with the default skip-list configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry; every set it creates uses `config`.
    pub fn with_config(config: SkipListConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sets: Arc::default(),
            config,
        })
    }

    pub fn config(&self) -> &SkipListConfig {
        &self.config
    }

    pub fn exists(&self, name: &str) -> bool {
        self.sets.read().contains_key(name)
    }

    /// Returns a handle to the named set, or `None` if it was never written.
    pub fn get(&self, name: &str) -> Option<SortedSet> {
        self.sets.read().get(name).cloned()
    }

    /// Returns the named set, creating an empty one if needed.
    pub fn ensure_set(&self, name: &str) -> Result<SortedSet> {
        validate_set_name(name)?;
        if let Some(set) = self.get(name) {
            return Ok(set);
        }
        let mut sets = self.sets.write();
        let set = sets
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(set = %name, "sorted set created");
                SortedSet::new(name.to_string(), &self.config)
            })
            .clone();
        Ok(set)
    }

    /// Drops the named set with both of its indexes. Returns `true` if it existed.
    pub fn delete_set(&self, name: &str) -> bool {
        let removed = self.sets.write().remove(name).is_some();
        if removed {
            tracing::debug!(set = %name, "sorted set deleted");
        }
        removed
    }

    /// Names of all sets, sorted.
    pub fn list_sets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sets.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of sets.
    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }

    /// Inserts or re-scores `member` in the named set.
    pub fn add(&self, name: &str, member: &str, score: f64) -> Result<AddOutcome> {
        validate_score(score)?;
        validate_member(member)?;
        self.ensure_set(name)?.add(member, score)
    }

    /// Applies several `(member, score)` pairs atomically. Returns how many
    /// members were new.
    pub fn add_many(&self, name: &str, entries: &[(&str, f64)]) -> Result<u64> {
        for &(member, score) in entries {
            validate_score(score)?;
            validate_member(member)?;
        }
        self.ensure_set(name)?.add_many(entries)
    }

    /// Adds `delta` to `member`'s score and returns the result.
    pub fn incr_by(&self, name: &str, member: &str, delta: f64) -> Result<f64> {
        validate_score(delta)?;
        validate_member(member)?;
        self.ensure_set(name)?.incr_by(member, delta)
    }

    /// Removes `member`. The set itself stays registered even when emptied.
    pub fn remove(&self, name: &str, member: &str) -> bool {
        self.get(name).is_some_and(|set| set.remove(member))
    }

    pub fn score(&self, name: &str, member: &str) -> Option<f64> {
        self.get(name)?.score(member)
    }

    /// Member count; 0 for unknown sets.
    pub fn cardinality(&self, name: &str) -> u64 {
        self.get(name).map_or(0, |set| set.len())
    }

    /// 0-based ascending rank.
    pub fn rank(&self, name: &str, member: &str) -> Option<u64> {
        self.get(name)?.rank(member)
    }

    /// 0-based descending rank.
    pub fn rev_rank(&self, name: &str, member: &str) -> Option<u64> {
        self.get(name)?.rev_rank(member)
    }

    pub fn range_by_rank(&self, name: &str, start: i64, stop: i64) -> Vec<ScoredMember> {
        self.get(name)
            .map_or_else(Vec::new, |set| set.range_by_rank(start, stop))
    }

    pub fn rev_range_by_rank(&self, name: &str, start: i64, stop: i64) -> Vec<ScoredMember> {
        self.get(name)
            .map_or_else(Vec::new, |set| set.rev_range_by_rank(start, stop))
    }

    pub fn range_by_score(
        &self,
        name: &str,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        range.validate()?;
        match self.get(name) {
            Some(set) => set.range_by_score(range, limit),
            None => Ok(Vec::new()),
        }
    }

    pub fn rev_range_by_score(
        &self,
        name: &str,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        range.validate()?;
        match self.get(name) {
            Some(set) => set.rev_range_by_score(range, limit),
            None => Ok(Vec::new()),
        }
    }

    pub fn count_by_score(&self, name: &str, range: &ScoreRange) -> Result<u64> {
        range.validate()?;
        match self.get(name) {
            Some(set) => set.count_by_score(range),
            None => Ok(0),
        }
    }

    /// Estimated memory across all sets.
    pub fn total_memory_bytes(&self) -> usize {
        self.sets
            .read()
            .values()
            .map(|set| set.estimate_memory_bytes())
            .sum()
    }
}
