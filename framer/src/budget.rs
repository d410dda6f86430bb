//! Capacity configuration for frame splitting.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Capacity of the compact delivery tier (a plain chat message).
pub const COMPACT_CAPACITY: usize = 2000;

/// Capacity of the rich delivery tier (an embed description).
pub const RICH_CAPACITY: usize = 4096;

/// Characters held back per frame for fence-repair markup in the rich tier:
/// a 16-character language buffer plus delimiters and newline.
pub const FENCE_MARKUP_RESERVE: usize = 24;

/// How much text fits in one delivery unit, and how much of that is held
/// back for repair markup.
///
/// Capacities count characters, not bytes, because that is how the platform
/// measures messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBudget {
    /// Hard per-frame limit, including any repair markup.
    pub capacity: usize,
    /// Characters reserved out of `capacity` for fence close/reopen markup
    /// on continuation frames.
    #[serde(default)]
    pub reserved_markup: usize,
}

impl FrameBudget {
    /// Compact tier: plain messages, no markup reservation.
    pub const COMPACT: FrameBudget = FrameBudget {
        capacity: COMPACT_CAPACITY,
        reserved_markup: 0,
    };

    /// Rich tier: embed-sized frames with the standard markup reservation.
    pub const RICH: FrameBudget = FrameBudget {
        capacity: RICH_CAPACITY,
        reserved_markup: FENCE_MARKUP_RESERVE,
    };

    /// Characters of source text a single frame may carry.
    pub fn effective(self) -> usize {
        self.capacity.saturating_sub(self.reserved_markup)
    }

    /// A budget is usable only if some text fits after the reservation.
    pub fn validate(self) -> Result<(), ConfigError> {
        if self.capacity <= self.reserved_markup {
            return Err(ConfigError {
                capacity: self.capacity,
                reserved_markup: self.reserved_markup,
            });
        }
        Ok(())
    }
}

/// Rejected capacity configuration: no input could ever fit in a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("frame capacity {capacity} leaves no room after reserving {reserved_markup} for markup")]
pub struct ConfigError {
    pub capacity: usize,
    pub reserved_markup: usize,
}
