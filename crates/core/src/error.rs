//! Error type for rejected sorted-set operations.
//!
//! Every variant describes a precondition violation detected before any
//! structure is touched. Absent sets, members, and ranks are not errors; they
//! surface as `None`, `0`, or an empty result.

use thiserror::Error;

/// Reasons an operation was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SortedSetError {
    /// Score is NaN or infinite.
    #[error("score must be a finite number, got {0}")]
    InvalidScore(f64),
    /// Member identifier is the empty string.
    #[error("member must not be empty")]
    EmptyMember,
    /// Member identifier exceeds [`crate::config::MAX_MEMBER_LEN`].
    #[error("member is {len} bytes, maximum is {max}")]
    MemberTooLong { len: usize, max: usize },
    /// Set name is empty or exceeds [`crate::config::MAX_SET_NAME_LEN`].
    #[error("invalid set name: {0}")]
    InvalidSetName(String),
    /// Skip-list configuration out of bounds.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Set already holds [`crate::config::MAX_SET_MEMBERS`] members.
    #[error("set is full: at most {max} members")]
    CapacityExceeded { max: u64 },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SortedSetError>;
