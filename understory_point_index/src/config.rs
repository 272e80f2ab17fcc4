// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capacity configuration for leaves and nodes.

use crate::error::ConfigError;

/// Fan-out limits shared by every leaf and internal node of one index.
///
/// A box holding more than `capacity_max` entries is split. After any operation
/// settles, every non-root box holds at least `capacity_min` entries once the
/// index holds that many points in total.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    capacity_min: usize,
    capacity_max: usize,
}

impl IndexConfig {
    /// Default minimum fan-out.
    pub const DEFAULT_CAPACITY_MIN: usize = 2;
    /// Default maximum fan-out.
    pub const DEFAULT_CAPACITY_MAX: usize = 10;

    /// Validate and build a configuration.
    ///
    /// `capacity_max + 1` entries must be divisible into two groups of at least
    /// `capacity_min`, or a split could not seed both halves.
    pub const fn new(capacity_min: usize, capacity_max: usize) -> Result<Self, ConfigError> {
        if capacity_min == 0 {
            return Err(ConfigError::ZeroMinimum);
        }
        if capacity_max < 2 {
            return Err(ConfigError::MaximumTooSmall(capacity_max));
        }
        if capacity_max + 1 < 2 * capacity_min {
            return Err(ConfigError::Unsplittable {
                min: capacity_min,
                max: capacity_max,
            });
        }
        Ok(Self {
            capacity_min,
            capacity_max,
        })
    }

    /// Minimum entries per non-root box.
    pub const fn capacity_min(self) -> usize {
        self.capacity_min
    }

    /// Maximum entries per box before it splits.
    pub const fn capacity_max(self) -> usize {
        self.capacity_max
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity_min: Self::DEFAULT_CAPACITY_MIN,
            capacity_max: Self::DEFAULT_CAPACITY_MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_two_to_ten() {
        let c = IndexConfig::default();
        assert_eq!((c.capacity_min(), c.capacity_max()), (2, 10));
        assert_eq!(IndexConfig::new(2, 10), Ok(c));
    }

    #[test]
    fn rejects_unsplittable_limits() {
        assert_eq!(IndexConfig::new(0, 10), Err(ConfigError::ZeroMinimum));
        assert_eq!(IndexConfig::new(1, 1), Err(ConfigError::MaximumTooSmall(1)));
        assert_eq!(
            IndexConfig::new(4, 6),
            Err(ConfigError::Unsplittable { min: 4, max: 6 })
        );
        assert!(IndexConfig::new(4, 7).is_ok());
        assert!(IndexConfig::new(1, 2).is_ok());
    }
}
