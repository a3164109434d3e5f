//! Value types returned by sorted-set queries, plus input validation.

use crate::config;
use crate::error::{Result, SortedSetError};
use serde::{Deserialize, Serialize};

/// One entry of a sorted set as returned by range queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

impl From<(f64, &str)> for ScoredMember {
    fn from((score, member): (f64, &str)) -> Self {
        Self::new(member, score)
    }
}

/// What an add-or-update call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOutcome {
    /// Member was new.
    Added,
    /// Member existed with a different score and was moved.
    Updated,
    /// Member existed with the same score; nothing changed.
    Unchanged,
}

/// Pagination over a score range: skip `offset` matches, return at most `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub offset: usize,
    pub count: usize,
}

impl Limit {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }
}

pub(crate) fn validate_score(score: f64) -> Result<()> {
    if score.is_finite() {
        Ok(())
    } else {
        Err(SortedSetError::InvalidScore(score))
    }
}

pub(crate) fn validate_member(member: &str) -> Result<()> {
    if member.is_empty() {
        return Err(SortedSetError::EmptyMember);
    }
    if member.len() > config::MAX_MEMBER_LEN {
        return Err(SortedSetError::MemberTooLong {
            len: member.len(),
            max: config::MAX_MEMBER_LEN,
        });
    }
    Ok(())
}

pub(crate) fn validate_set_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SortedSetError::InvalidSetName(
            "set name must not be empty".into(),
        ));
    }
    if name.len() > config::MAX_SET_NAME_LEN {
        return Err(SortedSetError::InvalidSetName(format!(
            "set name is {} bytes, maximum is {}",
            name.len(),
            config::MAX_SET_NAME_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_validation() {
        assert!(validate_score(1.5).is_ok());
        assert!(validate_score(-0.0).is_ok());
        assert!(matches!(
            validate_score(f64::NAN),
            Err(SortedSetError::InvalidScore(_))
        ));
        assert!(validate_score(f64::INFINITY).is_err());
        assert!(validate_score(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_member_validation() {
        assert_eq!(validate_member(""), Err(SortedSetError::EmptyMember));
        assert!(validate_member("alice").is_ok());
        let long = "x".repeat(config::MAX_MEMBER_LEN + 1);
        assert!(matches!(
            validate_member(&long),
            Err(SortedSetError::MemberTooLong { .. })
        ));
    }

    #[test]
    fn test_set_name_validation() {
        assert!(validate_set_name("leaderboard").is_ok());
        assert!(validate_set_name("").is_err());
        assert!(validate_set_name(&"n".repeat(config::MAX_SET_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        let json = serde_json::to_string(&AddOutcome::Updated).unwrap();
        assert_eq!(json, "\"updated\"");
    }
}
