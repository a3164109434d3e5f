//! # rankset-core
//!
//! Embeddable in-memory sorted-set engine. Each set maps member strings to
//! finite `f64` scores and answers ordered queries (rank, range by rank,
//! range by score) in expected O(log n) via a span-augmented skip list, with
//! O(1) score lookup through a member index.
//!
//! ```text
//! Registry → SortedSet (RwLock) → SortedSetData → { MemberIndex, SkipList }
//! ```
//!
//! The crate has no async dependencies and performs no I/O.

/// Global configuration constants and skip-list tuning.
pub mod config;
/// Error type for rejected operations.
pub mod error;
/// Span-augmented skip list, level generators, and score ranges.
pub mod skiplist;
/// Sorted-set records and the name → set registry.
pub mod sorted_set;

pub use config::SkipListConfig;
pub use error::{Result, SortedSetError};
pub use skiplist::ScoreRange;
pub use sorted_set::{AddOutcome, Limit, Registry, ScoredMember, SortedSet, SortedSetData};
