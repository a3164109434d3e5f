//! Level-0 cursor over a contiguous run of skip-list nodes.

use crate::skiplist::list::{NodeId, SkipList};
use std::iter::FusedIterator;

/// Walks forward links from the front and backward links from the back.
/// Yields `(score, member)` pairs.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    list: &'a SkipList,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(list: &'a SkipList, front: NodeId, back: NodeId, remaining: usize) -> Self {
        Self {
            list,
            front,
            back,
            remaining,
        }
    }

    pub(crate) fn empty(list: &'a SkipList) -> Self {
        Self::new(list, NodeId::NIL, NodeId::NIL, 0)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (f64, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let list = self.list;
        let node = list.node(self.front);
        self.front = node.forward();
        self.remaining -= 1;
        Some((node.score, &*node.member))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let list = self.list;
        let node = list.node(self.back);
        self.back = node.backward;
        self.remaining -= 1;
        Some((node.score, &*node.member))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
