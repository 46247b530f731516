//! Identifier assignment for artifact entries.
//!
//! Identifiers are derived from the record's position in the original input,
//! never from its position in the sorted tree.

use crate::error::{AllowlistError, AllowlistResult};

/// How artifact entries are numbered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Identifier equals the 0-based input index
    #[default]
    Sequential,
    /// Indices at or above `threshold` are folded into
    /// `base + index % threshold`; smaller indices are kept as-is.
    ///
    /// Used to exercise consumers with identifiers spread over a larger range
    /// than the record count. Identifiers may repeat.
    Bucketed { threshold: u64, base: u64 },
}

impl IdentifierPolicy {
    pub fn assign(&self, input_index: usize) -> AllowlistResult<u64> {
        let index = input_index as u64;
        match *self {
            IdentifierPolicy::Sequential => Ok(index),
            IdentifierPolicy::Bucketed { threshold, base } => {
                if threshold == 0 || index < threshold {
                    return Ok(index);
                }
                base.checked_add(index % threshold)
                    .ok_or(AllowlistError::IdentifierOverflow { index: input_index, base })
            }
        }
    }
}
