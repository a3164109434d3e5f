//! Global configuration constants and skip-list tuning for rankset.
//!
//! Input validation limits and structural bounds are compile-time constants.
//! Per-registry tuning (level cap, promotion probability, seeding) is carried by
//! [`SkipListConfig`], which the CLI builds from command-line arguments.

use crate::error::{Result, SortedSetError};
use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of levels in a skip list.
///
/// The sentinel head always carries this many levels. 32 levels with p = 0.25
/// comfortably covers 2^64 elements.
pub const SKIPLIST_MAX_LEVEL: usize = 32;

/// Probability that a node is promoted one level further up.
///
/// Expected node height is `1 / (1 - p)`; 0.25 trades a slightly longer
/// search path for fewer per-node links.
pub const SKIPLIST_P: f64 = 0.25;

/// Maximum length of a set name in bytes.
pub const MAX_SET_NAME_LEN: usize = 128;

/// Maximum length of a member identifier in bytes (64 KB).
pub const MAX_MEMBER_LEN: usize = 65_536;

/// Maximum number of members one set can hold.
///
/// Node ids are `u32`: slot 0 is the head and `u32::MAX` marks a missing link.
pub const MAX_SET_MEMBERS: u64 = u32::MAX as u64 - 1;

/// Default `tracing` filter used by the CLI when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "rankset_core=info,rankset_cli=info";

/// Tuning parameters for the skip list backing each sorted set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipListConfig {
    /// Number of levels a node may reach (1..=[`SKIPLIST_MAX_LEVEL`]).
    pub max_level: usize,
    /// Per-step promotion probability, strictly between 0 and 1.
    pub probability: f64,
    /// Fixed seed for the level generator. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_level: SKIPLIST_MAX_LEVEL,
            probability: SKIPLIST_P,
            seed: None,
        }
    }
}

impl SkipListConfig {
    /// Checks that the configuration describes a usable skip list.
    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 || self.max_level > SKIPLIST_MAX_LEVEL {
            return Err(SortedSetError::InvalidConfig(format!(
                "max_level must be 1-{}, got {}",
                SKIPLIST_MAX_LEVEL, self.max_level
            )));
        }
        if !(self.probability > 0.0 && self.probability < 1.0) {
            return Err(SortedSetError::InvalidConfig(format!(
                "probability must be in (0, 1), got {}",
                self.probability
            )));
        }
        Ok(())
    }
}
