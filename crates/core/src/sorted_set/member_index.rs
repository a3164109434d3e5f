//! Member → node lookup table.
//!
//! Holds non-owning [`NodeId`] handles into the set's skip list so that
//! existence, score, and cardinality queries never walk the list. The member
//! string is shared with the skip-list node through an `Arc<str>`.

use crate::skiplist::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemberIndex {
    map: HashMap<Arc<str>, NodeId>,
}

impl MemberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, member: &str) -> Option<NodeId> {
        self.map.get(member).copied()
    }

    #[inline]
    pub fn contains(&self, member: &str) -> bool {
        self.map.contains_key(member)
    }

    /// Points `member` at `node`, returning the handle it replaced.
    pub fn insert(&mut self, member: Arc<str>, node: NodeId) -> Option<NodeId> {
        self.map.insert(member, node)
    }

    pub fn remove(&mut self, member: &str) -> Option<NodeId> {
        self.map.remove(member)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.map.iter().map(|(m, &id)| (&**m, id))
    }

    /// Table overhead only; member bytes are counted by the skip list.
    pub fn estimate_memory_bytes(&self) -> usize {
        self.map.capacity() * (std::mem::size_of::<Arc<str>>() + std::mem::size_of::<NodeId>())
    }
}
