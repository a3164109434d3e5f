//! Span-augmented skip list keyed by `(score, member)`.
//!
//! Nodes live in an arena (`Vec<Node>`) and link to each other by [`NodeId`],
//! never by reference, so the forward/backward graph has no ownership cycles.
//! Slot 0 is the sentinel head; freed slots are recycled through a free list.
//!
//! Every per-level link carries a `span`: the number of level-0 steps it
//! covers. Summing spans along a search path yields a node's 1-based rank.

use crate::config::{MAX_SET_MEMBERS, SKIPLIST_MAX_LEVEL};
use crate::error::{Result, SortedSetError};
use crate::skiplist::iter::Iter;
use crate::skiplist::level::LevelGenerator;
use crate::skiplist::range::ScoreRange;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::sync::Arc;

/// Opaque handle to a node in one [`SkipList`].
///
/// Valid until the node is deleted; after that the slot may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const NIL: NodeId = NodeId(u32::MAX);
    pub(crate) const HEAD: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

#[derive(Debug, Clone, Copy)]
struct Level {
    forward: NodeId,
    span: u64,
}

impl Level {
    const EMPTY: Level = Level {
        forward: NodeId::NIL,
        span: 0,
    };
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) member: Arc<str>,
    pub(crate) score: f64,
    pub(crate) backward: NodeId,
    levels: Vec<Level>,
}

impl Node {
    #[inline]
    pub(crate) fn forward(&self) -> NodeId {
        self.levels[0].forward
    }

    fn is_live(&self) -> bool {
        !self.levels.is_empty()
    }
}

/// Id for arena slot `index`, or `None` when the index does not fit in a
/// `u32` or would alias [`NodeId::NIL`].
#[inline]
fn slot_id(index: usize) -> Option<NodeId> {
    u32::try_from(index)
        .ok()
        .filter(|&raw| raw != NodeId::NIL.0)
        .map(NodeId)
}

/// Total order on skip-list keys: score ascending, then member bytes ascending.
#[inline]
pub fn cmp_key(a_score: f64, a_member: &str, b_score: f64, b_member: &str) -> Ordering {
    OrderedFloat(a_score)
        .cmp(&OrderedFloat(b_score))
        .then_with(|| a_member.cmp(b_member))
}

/// Ordered index of `(score, member)` keys with O(log n) expected insert,
/// delete, rank, and select-by-rank.
///
/// Callers guarantee keys are unique and scores are not NaN.
#[derive(Debug)]
pub struct SkipList {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    tail: NodeId,
    /// Number of active levels (1..=max_level).
    level: usize,
    max_level: usize,
    len: u64,
    levels: Box<dyn LevelGenerator>,
}

impl SkipList {
    /// Creates an empty list whose node heights come from `levels`.
    pub fn new(levels: Box<dyn LevelGenerator>) -> Self {
        let max_level = levels.max_level().clamp(1, SKIPLIST_MAX_LEVEL);
        let head = Node {
            member: Arc::from(""),
            score: 0.0,
            backward: NodeId::NIL,
            levels: vec![Level::EMPTY; max_level],
        };
        Self {
            nodes: vec![head],
            free: Vec::new(),
            tail: NodeId::NIL,
            level: 1,
            max_level,
            len: 0,
            levels,
        }
    }

    /// Number of keys in the list.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of currently active levels.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns `(score, member)` for a live node.
    pub fn get(&self, id: NodeId) -> Option<(f64, &str)> {
        if id == NodeId::HEAD {
            return None;
        }
        self.nodes
            .get(id.idx())
            .filter(|n| n.is_live())
            .map(|n| (n.score, &*n.member))
    }

    /// Returns the shared member string for a live node.
    pub fn member_arc(&self, id: NodeId) -> Option<&Arc<str>> {
        if id == NodeId::HEAD {
            return None;
        }
        self.nodes
            .get(id.idx())
            .filter(|n| n.is_live())
            .map(|n| &n.member)
    }

    /// Lowest key, if any.
    pub fn first(&self) -> Option<NodeId> {
        let id = self.head().forward();
        (!id.is_nil()).then_some(id)
    }

    /// Highest key, if any.
    pub fn last(&self) -> Option<NodeId> {
        (!self.tail.is_nil()).then_some(self.tail)
    }

    #[inline]
    fn head(&self) -> &Node {
        &self.nodes[NodeId::HEAD.idx()]
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    #[inline]
    fn link(&self, id: NodeId, level: usize) -> Level {
        self.nodes[id.idx()].levels[level]
    }

    #[inline]
    fn link_mut(&mut self, id: NodeId, level: usize) -> &mut Level {
        &mut self.nodes[id.idx()].levels[level]
    }

    /// `true` if the node at `id` orders strictly before `(score, member)`.
    #[inline]
    fn precedes(&self, id: NodeId, score: f64, member: &str) -> bool {
        let n = self.node(id);
        cmp_key(n.score, &n.member, score, member) == Ordering::Less
    }

    /// Picks the slot the next node will occupy without touching the arena.
    fn reserve_slot(&mut self) -> Result<NodeId> {
        match self.free.pop() {
            Some(id) => Ok(id),
            None => slot_id(self.nodes.len()).ok_or(SortedSetError::CapacityExceeded {
                max: MAX_SET_MEMBERS,
            }),
        }
    }

    fn place(&mut self, id: NodeId, node: Node) {
        if id.idx() == self.nodes.len() {
            self.nodes.push(node);
        } else {
            self.nodes[id.idx()] = node;
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.idx()];
        node.member = Arc::from("");
        node.levels = Vec::new();
        node.backward = NodeId::NIL;
        self.free.push(id);
    }

    /// Inserts a key that is not already present and returns its node.
    ///
    /// Fails with [`SortedSetError::CapacityExceeded`] once every addressable
    /// slot holds a live node; the list is left untouched in that case.
    pub fn insert(&mut self, score: f64, member: Arc<str>) -> Result<NodeId> {
        let id = self.reserve_slot()?;
        let mut update = [NodeId::HEAD; SKIPLIST_MAX_LEVEL];
        let mut rank = [0u64; SKIPLIST_MAX_LEVEL];

        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            loop {
                let next = self.link(cur, i);
                if next.forward.is_nil() || !self.precedes(next.forward, score, &member) {
                    break;
                }
                rank[i] += next.span;
                cur = next.forward;
            }
            update[i] = cur;
        }

        let level = self.levels.next_level().clamp(1, self.max_level);
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = NodeId::HEAD;
                self.link_mut(NodeId::HEAD, i).span = self.len;
            }
            self.level = level;
        }

        self.place(
            id,
            Node {
                member,
                score,
                backward: NodeId::NIL,
                levels: vec![Level::EMPTY; level],
            },
        );

        for i in 0..level {
            let prev = self.link(update[i], i);
            let skipped = rank[0] - rank[i];
            *self.link_mut(id, i) = Level {
                forward: prev.forward,
                span: prev.span - skipped,
            };
            *self.link_mut(update[i], i) = Level {
                forward: id,
                span: skipped + 1,
            };
        }
        for (i, &node) in update.iter().enumerate().take(self.level).skip(level) {
            self.link_mut(node, i).span += 1;
        }

        self.nodes[id.idx()].backward = if update[0] == NodeId::HEAD {
            NodeId::NIL
        } else {
            update[0]
        };
        let next = self.node(id).forward();
        if next.is_nil() {
            self.tail = id;
        } else {
            self.nodes[next.idx()].backward = id;
        }
        self.len += 1;
        Ok(id)
    }

    /// Removes the exact key `(score, member)`. Returns `false` if absent.
    pub fn delete(&mut self, score: f64, member: &str) -> bool {
        let mut update = [NodeId::HEAD; SKIPLIST_MAX_LEVEL];
        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            loop {
                let next = self.link(cur, i).forward;
                if next.is_nil() || !self.precedes(next, score, member) {
                    break;
                }
                cur = next;
            }
            update[i] = cur;
        }

        let target = self.link(cur, 0).forward;
        if target.is_nil() {
            return false;
        }
        let t = self.node(target);
        if cmp_key(t.score, &t.member, score, member) != Ordering::Equal {
            return false;
        }
        self.unlink(target, &update);
        true
    }

    fn unlink(&mut self, target: NodeId, update: &[NodeId; SKIPLIST_MAX_LEVEL]) {
        for (i, &prev) in update.iter().enumerate().take(self.level) {
            if self.link(prev, i).forward == target {
                let removed = self.link(target, i);
                let link = self.link_mut(prev, i);
                link.span = link.span + removed.span - 1;
                link.forward = removed.forward;
            } else {
                self.link_mut(prev, i).span -= 1;
            }
        }

        let next = self.node(target).forward();
        let backward = self.node(target).backward;
        if next.is_nil() {
            self.tail = backward;
        } else {
            self.nodes[next.idx()].backward = backward;
        }

        while self.level > 1 && self.link(NodeId::HEAD, self.level - 1).forward.is_nil() {
            self.level -= 1;
        }
        self.len -= 1;
        self.release(target);
    }

    /// 1-based ascending rank of `(score, member)`, or `None` if absent.
    pub fn rank(&self, score: f64, member: &str) -> Option<u64> {
        let mut rank = 0u64;
        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            loop {
                let next = self.link(cur, i);
                if next.forward.is_nil() {
                    break;
                }
                let n = self.node(next.forward);
                if cmp_key(n.score, &n.member, score, member) == Ordering::Greater {
                    break;
                }
                rank += next.span;
                cur = next.forward;
            }
            if cur != NodeId::HEAD {
                let n = self.node(cur);
                if cmp_key(n.score, &n.member, score, member) == Ordering::Equal {
                    return Some(rank);
                }
            }
        }
        None
    }

    /// Node at 1-based ascending `rank`, or `None` if out of range.
    pub fn get_by_rank(&self, rank: u64) -> Option<NodeId> {
        if rank == 0 || rank > self.len {
            return None;
        }
        let mut traversed = 0u64;
        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            loop {
                let next = self.link(cur, i);
                if next.forward.is_nil() || traversed + next.span > rank {
                    break;
                }
                traversed += next.span;
                cur = next.forward;
            }
            if traversed == rank {
                return Some(cur);
            }
        }
        None
    }

    /// Lowest node whose score lies in `range`.
    pub fn first_in_range(&self, range: &ScoreRange) -> Option<NodeId> {
        if range.is_empty() {
            return None;
        }
        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            loop {
                let next = self.link(cur, i).forward;
                if next.is_nil() || range.above_min(self.node(next).score) {
                    break;
                }
                cur = next;
            }
        }
        let candidate = self.link(cur, 0).forward;
        if candidate.is_nil() || !range.below_max(self.node(candidate).score) {
            return None;
        }
        Some(candidate)
    }

    /// Highest node whose score lies in `range`.
    pub fn last_in_range(&self, range: &ScoreRange) -> Option<NodeId> {
        if range.is_empty() {
            return None;
        }
        let mut cur = NodeId::HEAD;
        for i in (0..self.level).rev() {
            loop {
                let next = self.link(cur, i).forward;
                if next.is_nil() || !range.below_max(self.node(next).score) {
                    break;
                }
                cur = next;
            }
        }
        if cur == NodeId::HEAD || !range.above_min(self.node(cur).score) {
            return None;
        }
        Some(cur)
    }

    /// 1-based rank of a live node.
    pub fn rank_of(&self, id: NodeId) -> Option<u64> {
        let (score, member) = self.get(id)?;
        self.rank(score, member)
    }

    /// Iterates all keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self, self.head().forward(), self.tail, self.len as usize)
    }

    /// Iterates keys with 1-based ranks in `start..=end`, clamped to the list.
    pub fn iter_ranks(&self, start: u64, end: u64) -> Iter<'_> {
        let start = start.max(1);
        let end = end.min(self.len);
        if start > end {
            return Iter::empty(self);
        }
        match (self.get_by_rank(start), self.get_by_rank(end)) {
            (Some(front), Some(back)) => Iter::new(self, front, back, (end - start + 1) as usize),
            _ => Iter::empty(self),
        }
    }

    /// Rough heap footprint of the arena, in bytes.
    pub fn estimate_memory_bytes(&self) -> usize {
        let node_size = std::mem::size_of::<Node>();
        let level_size = std::mem::size_of::<Level>();
        let nodes: usize = self
            .nodes
            .iter()
            .map(|n| node_size + n.levels.capacity() * level_size + n.member.len())
            .sum();
        nodes + self.free.capacity() * std::mem::size_of::<NodeId>()
    }

    /// Checks every structural invariant: ordering, spans, back links, tail,
    /// length, active level, and arena bookkeeping.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.level == 0 || self.level > self.max_level {
            return Err(format!(
                "active level {} outside 1..={}",
                self.level, self.max_level
            ));
        }
        if self.head().levels.len() != self.max_level {
            return Err(format!(
                "head has {} levels, expected {}",
                self.head().levels.len(),
                self.max_level
            ));
        }
        if self.nodes.len() as u64 != 1 + self.len + self.free.len() as u64 {
            return Err(format!(
                "arena holds {} slots but len={} free={}",
                self.nodes.len(),
                self.len,
                self.free.len()
            ));
        }

        // Level 0: order, back links, positions.
        let mut pos = vec![u64::MAX; self.nodes.len()];
        pos[NodeId::HEAD.idx()] = 0;
        let mut prev = NodeId::HEAD;
        let mut cur = self.head().forward();
        let mut count = 0u64;
        while !cur.is_nil() {
            let node = self.nodes.get(cur.idx()).ok_or("forward link out of bounds")?;
            if !node.is_live() {
                return Err(format!("level 0 reaches freed slot {}", cur.0));
            }
            if pos[cur.idx()] != u64::MAX {
                return Err(format!("cycle at slot {}", cur.0));
            }
            let expected_back = if prev == NodeId::HEAD {
                NodeId::NIL
            } else {
                prev
            };
            if node.backward != expected_back {
                return Err(format!("bad backward link at slot {}", cur.0));
            }
            if prev != NodeId::HEAD {
                let p = self.node(prev);
                if cmp_key(p.score, &p.member, node.score, &node.member) != Ordering::Less {
                    return Err(format!(
                        "order violated: ({}, {}) before ({}, {})",
                        p.score, p.member, node.score, node.member
                    ));
                }
            }
            count += 1;
            pos[cur.idx()] = count;
            prev = cur;
            cur = node.forward();
        }
        if count != self.len {
            return Err(format!("walked {} nodes, len is {}", count, self.len));
        }
        let expected_tail = if prev == NodeId::HEAD {
            NodeId::NIL
        } else {
            prev
        };
        if self.tail != expected_tail {
            return Err("tail does not point at the last node".to_string());
        }

        // Upper levels: spans and membership.
        for i in 0..self.level {
            let mut cur = NodeId::HEAD;
            let mut seen = 0u64;
            loop {
                let link = self.link(cur, i);
                let here = pos[cur.idx()];
                let expected = if link.forward.is_nil() {
                    self.len - here
                } else {
                    let there = pos
                        .get(link.forward.idx())
                        .copied()
                        .filter(|&p| p != u64::MAX)
                        .ok_or_else(|| format!("level {} links to unreachable node", i))?;
                    if there <= here {
                        return Err(format!("level {} goes backwards at rank {}", i, here));
                    }
                    there - here
                };
                if link.span != expected {
                    return Err(format!(
                        "level {} span {} at rank {}, expected {}",
                        i, link.span, here, expected
                    ));
                }
                if link.forward.is_nil() {
                    break;
                }
                cur = link.forward;
                seen += 1;
            }
            let tall = self
                .nodes
                .iter()
                .skip(1)
                .filter(|n| n.levels.len() > i)
                .count() as u64;
            if seen != tall {
                return Err(format!(
                    "level {} links {} nodes but {} are that tall",
                    i, seen, tall
                ));
            }
        }
        if self.level > 1 && self.link(NodeId::HEAD, self.level - 1).forward.is_nil() {
            return Err(format!("top level {} is empty", self.level));
        }
        Ok(())
    }
}
