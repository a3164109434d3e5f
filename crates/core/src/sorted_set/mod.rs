//! Sorted sets: one skip list plus one member index per set, grouped by name.
//!
//! [`Registry`] resolves a set name to a [`SortedSet`] handle; the handle
//! locks its [`SortedSetData`], which delegates ordering work to the skip list
//! and existence/score lookups to the [`MemberIndex`].

/// Member → node handle table.
pub mod member_index;
/// Sorted-set record and its lock-protected handle.
pub mod record;
/// Name → sorted-set registry.
pub mod registry;
/// Query result types and input validation.
pub mod types;

pub use member_index::MemberIndex;
pub use record::{SortedSet, SortedSetData};
pub use registry::Registry;
pub use types::{AddOutcome, Limit, ScoredMember};
