//! Span-augmented skip list: the ordered index behind every sorted set.
//!
//! Keys are `(score, member)` pairs ordered by score, then member. Each link
//! records how many base-level nodes it jumps over, which turns rank and
//! select-by-rank into O(log n) walks. Nodes live in an arena addressed by
//! [`NodeId`]; node heights come from a pluggable [`LevelGenerator`].

/// Double-ended level-0 iterator.
pub mod iter;
/// Node height generators (random and fixed-sequence).
pub mod level;
/// Arena-backed skip list with span counters.
pub mod list;
/// Score intervals with open or closed ends.
pub mod range;

pub use iter::Iter;
pub use level::{LevelGenerator, RandomLevel, SequenceLevels};
pub use list::{cmp_key, NodeId, SkipList};
pub use range::ScoreRange;
