//! A single named sorted set.
//!
//! [`SortedSetData`] couples a [`SkipList`] (ordering) with a [`MemberIndex`]
//! (O(1) member lookup) and keeps the two in lockstep. [`SortedSet`] is the
//! shareable handle: one `RwLock` per set, so distinct sets never contend.
//!
//! Ranks exposed here are 0-based; the skip list itself counts from 1.

use crate::config::{SkipListConfig, MAX_SET_MEMBERS};
use crate::error::{Result, SortedSetError};
use crate::skiplist::{Iter, LevelGenerator, NodeId, RandomLevel, ScoreRange, SkipList};
use crate::sorted_set::member_index::MemberIndex;
use crate::sorted_set::types::{
    validate_member, validate_score, AddOutcome, Limit, ScoredMember,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Member index and skip list for one set, always holding the same members.
#[derive(Debug)]
pub struct SortedSetData {
    pub name: String,
    members: MemberIndex,
    list: SkipList,
}

impl SortedSetData {
    /// Creates an empty set whose node heights follow `config`.
    pub fn new(name: String, config: &SkipListConfig) -> Self {
        Self::with_levels(name, Box::new(RandomLevel::from_config(config)))
    }

    /// Creates an empty set with an explicit level generator.
    pub fn with_levels(name: String, levels: Box<dyn LevelGenerator>) -> Self {
        Self {
            name,
            members: MemberIndex::new(),
            list: SkipList::new(levels),
        }
    }

    /// Inserts `member` or moves it to `score`.
    pub fn add(&mut self, member: &str, score: f64) -> Result<AddOutcome> {
        validate_score(score)?;
        validate_member(member)?;
        self.apply(member, score)
    }

    /// Adds several members at once. Either every pair is valid and applied,
    /// or nothing changes. Returns how many members were new.
    pub fn add_many(&mut self, entries: &[(&str, f64)]) -> Result<u64> {
        for &(member, score) in entries {
            validate_score(score)?;
            validate_member(member)?;
        }
        let fresh = entries
            .iter()
            .filter(|(member, _)| !self.members.contains(member))
            .count() as u64;
        if self.len().saturating_add(fresh) > MAX_SET_MEMBERS {
            return Err(SortedSetError::CapacityExceeded {
                max: MAX_SET_MEMBERS,
            });
        }
        let mut added = 0;
        for &(member, score) in entries {
            if self.apply(member, score)? == AddOutcome::Added {
                added += 1;
            }
        }
        Ok(added)
    }

    fn apply(&mut self, member: &str, score: f64) -> Result<AddOutcome> {
        let Some(id) = self.members.get(member) else {
            self.link_new(member, score)?;
            return Ok(AddOutcome::Added);
        };
        match self.list.get(id) {
            Some((current, _)) if current == score => Ok(AddOutcome::Unchanged),
            Some((current, _)) => {
                self.rescore(id, current, score)?;
                Ok(AddOutcome::Updated)
            }
            None => {
                // Stale handle: re-link the member from scratch.
                self.link_new(member, score)?;
                Ok(AddOutcome::Added)
            }
        }
    }

    fn link_new(&mut self, member: &str, score: f64) -> Result<()> {
        let member: Arc<str> = Arc::from(member);
        let id = self.list.insert(score, Arc::clone(&member))?;
        self.members.insert(member, id);
        Ok(())
    }

    fn rescore(&mut self, id: NodeId, old: f64, new: f64) -> Result<()> {
        let Some(member) = self.list.member_arc(id).cloned() else {
            return Ok(());
        };
        tracing::trace!(set = %self.name, member = %member, old, new, "rescoring member");
        // The freed slot is reused, so the reinsert cannot hit capacity.
        self.list.delete(old, &member);
        let id = self.list.insert(new, Arc::clone(&member))?;
        self.members.insert(member, id);
        Ok(())
    }

    /// Adds `delta` to the member's score (absent members start at 0).
    /// Returns the new score; a non-finite result is rejected unapplied.
    pub fn incr_by(&mut self, member: &str, delta: f64) -> Result<f64> {
        validate_score(delta)?;
        validate_member(member)?;
        let next = self.score(member).unwrap_or(0.0) + delta;
        if !next.is_finite() {
            return Err(SortedSetError::InvalidScore(next));
        }
        self.apply(member, next)?;
        Ok(next)
    }

    /// Removes `member` from both indexes. Returns `false` if it was absent.
    pub fn remove(&mut self, member: &str) -> bool {
        let Some(id) = self.members.get(member) else {
            return false;
        };
        if let Some((score, _)) = self.list.get(id) {
            self.list.delete(score, member);
        }
        self.members.remove(member);
        true
    }

    /// Current score of `member`. O(1).
    pub fn score(&self, member: &str) -> Option<f64> {
        let id = self.members.get(member)?;
        self.list.get(id).map(|(score, _)| score)
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    /// Number of members.
    pub fn len(&self) -> u64 {
        self.members.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 0-based ascending position of `member`.
    pub fn rank(&self, member: &str) -> Option<u64> {
        self.rank1(member).map(|r| r - 1)
    }

    /// 0-based descending position of `member`.
    pub fn rev_rank(&self, member: &str) -> Option<u64> {
        self.rank1(member).map(|r| self.list.len() - r)
    }

    fn rank1(&self, member: &str) -> Option<u64> {
        let id = self.members.get(member)?;
        self.list.rank_of(id)
    }

    /// Entries at 0-based ascending positions `start..=stop`. Negative
    /// indices count from the end (-1 is the highest entry).
    pub fn range_by_rank(&self, start: i64, stop: i64) -> Vec<ScoredMember> {
        let Some((lo, hi)) = normalize_ranks(start, stop, self.list.len()) else {
            return Vec::new();
        };
        collect(self.list.iter_ranks(lo + 1, hi + 1))
    }

    /// Entries at 0-based descending positions `start..=stop`, highest first.
    pub fn rev_range_by_rank(&self, start: i64, stop: i64) -> Vec<ScoredMember> {
        let len = self.list.len();
        let Some((lo, hi)) = normalize_ranks(start, stop, len) else {
            return Vec::new();
        };
        collect(self.list.iter_ranks(len - hi, len - lo).rev())
    }

    /// Entries whose score lies in `range`, lowest first, optionally paginated.
    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        let Some((first, last)) = self.score_bounds(range)? else {
            return Ok(Vec::new());
        };
        let (lo, hi) = match limit {
            Some(l) => {
                let lo = first + l.offset as u64;
                let hi = last.min(lo.saturating_add(l.count as u64).saturating_sub(1));
                if l.count == 0 || lo > hi {
                    return Ok(Vec::new());
                }
                (lo, hi)
            }
            None => (first, last),
        };
        Ok(collect(self.list.iter_ranks(lo, hi)))
    }

    /// Entries whose score lies in `range`, highest first, optionally paginated.
    pub fn rev_range_by_score(
        &self,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        let Some((first, last)) = self.score_bounds(range)? else {
            return Ok(Vec::new());
        };
        let (lo, hi) = match limit {
            Some(l) => {
                if l.count == 0 || l.offset as u64 > last - first {
                    return Ok(Vec::new());
                }
                let hi = last - l.offset as u64;
                let lo = first.max((hi + 1).saturating_sub(l.count as u64));
                (lo, hi)
            }
            None => (first, last),
        };
        Ok(collect(self.list.iter_ranks(lo, hi).rev()))
    }

    /// Number of entries whose score lies in `range`. O(log n).
    pub fn count_by_score(&self, range: &ScoreRange) -> Result<u64> {
        Ok(self
            .score_bounds(range)?
            .map_or(0, |(first, last)| last - first + 1))
    }

    /// 1-based ranks of the first and last entries inside `range`.
    fn score_bounds(&self, range: &ScoreRange) -> Result<Option<(u64, u64)>> {
        range.validate()?;
        let bounds = self
            .list
            .first_in_range(range)
            .zip(self.list.last_in_range(range))
            .and_then(|(first, last)| self.list.rank_of(first).zip(self.list.rank_of(last)));
        Ok(bounds)
    }

    /// Lowest-ordered entry.
    pub fn first(&self) -> Option<ScoredMember> {
        self.list
            .first()
            .and_then(|id| self.list.get(id))
            .map(ScoredMember::from)
    }

    /// Highest-ordered entry.
    pub fn last(&self) -> Option<ScoredMember> {
        self.list
            .last()
            .and_then(|id| self.list.get(id))
            .map(ScoredMember::from)
    }

    /// All entries in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        self.list.iter()
    }

    pub fn estimate_memory_bytes(&self) -> usize {
        self.name.len() + self.members.estimate_memory_bytes() + self.list.estimate_memory_bytes()
    }

    /// Checks the skip list's own invariants and that the member index names
    /// exactly the members the list holds.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.list.validate()?;
        if self.members.len() as u64 != self.list.len() {
            return Err(format!(
                "member index has {} entries, skip list has {}",
                self.members.len(),
                self.list.len()
            ));
        }
        for (member, id) in self.members.iter() {
            match self.list.get(id) {
                Some((_, found)) if found == member => {}
                Some((_, found)) => {
                    return Err(format!(
                        "member '{}' points at node holding '{}'",
                        member, found
                    ))
                }
                None => return Err(format!("member '{}' points at a freed node", member)),
            }
        }
        Ok(())
    }
}

/// Resolves possibly-negative inclusive 0-based indices against `len`.
fn normalize_ranks(start: i64, stop: i64, len: u64) -> Option<(u64, u64)> {
    let len = i64::try_from(len).ok()?;
    let start = (if start < 0 { len + start } else { start }).max(0);
    let stop = if stop < 0 { len + stop } else { stop };
    if start >= len || start > stop {
        return None;
    }
    Some((start as u64, stop.min(len - 1) as u64))
}

fn collect<'a>(entries: impl Iterator<Item = (f64, &'a str)>) -> Vec<ScoredMember> {
    entries.map(ScoredMember::from).collect()
}

/// Shared, lock-protected handle to one sorted set.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct SortedSet {
    pub data: Arc<RwLock<SortedSetData>>,
}

impl SortedSet {
    pub fn new(name: String, config: &SkipListConfig) -> Self {
        Self::from_data(SortedSetData::new(name, config))
    }

    pub fn from_data(data: SortedSetData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn add(&self, member: &str, score: f64) -> Result<AddOutcome> {
        self.data.write().add(member, score)
    }

    pub fn add_many(&self, entries: &[(&str, f64)]) -> Result<u64> {
        self.data.write().add_many(entries)
    }

    pub fn incr_by(&self, member: &str, delta: f64) -> Result<f64> {
        self.data.write().incr_by(member, delta)
    }

    pub fn remove(&self, member: &str) -> bool {
        self.data.write().remove(member)
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.data.read().score(member)
    }

    pub fn len(&self) -> u64 {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn rank(&self, member: &str) -> Option<u64> {
        self.data.read().rank(member)
    }

    pub fn rev_rank(&self, member: &str) -> Option<u64> {
        self.data.read().rev_rank(member)
    }

    pub fn range_by_rank(&self, start: i64, stop: i64) -> Vec<ScoredMember> {
        self.data.read().range_by_rank(start, stop)
    }

    pub fn rev_range_by_rank(&self, start: i64, stop: i64) -> Vec<ScoredMember> {
        self.data.read().rev_range_by_rank(start, stop)
    }

    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        self.data.read().range_by_score(range, limit)
    }

    pub fn rev_range_by_score(
        &self,
        range: &ScoreRange,
        limit: Option<Limit>,
    ) -> Result<Vec<ScoredMember>> {
        self.data.read().rev_range_by_score(range, limit)
    }

    pub fn count_by_score(&self, range: &ScoreRange) -> Result<u64> {
        self.data.read().count_by_score(range)
    }

    pub fn estimate_memory_bytes(&self) -> usize {
        self.data.read().estimate_memory_bytes()
    }
}
