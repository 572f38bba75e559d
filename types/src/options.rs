//! Validated per-operation options.
//!
//! These types make an invalid partition size or timeout unrepresentable once
//! constructed, so the engine never re-checks them.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("partition size must be at least 1")]
    ZeroPartition,
    #[error("timeout of {millis}ms is out of range (1..={max}ms)")]
    TimeoutOutOfRange { millis: u128, max: u64 },
}

/// Upper bound on how many units of one operation run at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionSize(NonZeroUsize);

impl PartitionSize {
    /// Default multiple of host parallelism.
    pub const DEFAULT_MULTIPLIER: usize = 2;

    pub fn new(size: usize) -> Result<Self, OptionsError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or(OptionsError::ZeroPartition)
    }

    /// `multiplier × parallelism`, saturating. A zero multiplier is treated as 1.
    #[must_use]
    pub fn for_hardware(parallelism: NonZeroUsize, multiplier: usize) -> Self {
        let multiplier = NonZeroUsize::new(multiplier).unwrap_or(NonZeroUsize::MIN);
        Self(parallelism.saturating_mul(multiplier))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for PartitionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock budget for one whole operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopTimeout(Duration);

impl LoopTimeout {
    pub const MAX_MILLIS: u64 = i32::MAX as u64;
    pub const DEFAULT: LoopTimeout = LoopTimeout(Duration::from_secs(120));

    pub fn new(duration: Duration) -> Result<Self, OptionsError> {
        let millis = duration.as_millis();
        if millis == 0 || millis > u128::from(Self::MAX_MILLIS) {
            return Err(OptionsError::TimeoutOutOfRange {
                millis,
                max: Self::MAX_MILLIS,
            });
        }
        Ok(Self(duration))
    }

    pub fn from_millis(millis: u64) -> Result<Self, OptionsError> {
        Self::new(Duration::from_millis(millis))
    }

    #[must_use]
    pub const fn get(self) -> Duration {
        self.0
    }
}

impl Default for LoopTimeout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options resolved once when an engine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    pub partition_size: PartitionSize,
    pub timeout: LoopTimeout,
}

impl LoopOptions {
    #[must_use]
    pub const fn new(partition_size: PartitionSize, timeout: LoopTimeout) -> Self {
        Self {
            partition_size,
            timeout,
        }
    }

    /// Defaults derived from the given host parallelism.
    #[must_use]
    pub fn for_hardware(parallelism: NonZeroUsize) -> Self {
        Self {
            partition_size: PartitionSize::for_hardware(
                parallelism,
                PartitionSize::DEFAULT_MULTIPLIER,
            ),
            timeout: LoopTimeout::DEFAULT,
        }
    }

    #[must_use]
    pub fn with_partition_size(mut self, partition_size: PartitionSize) -> Self {
        self.partition_size = partition_size;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: LoopTimeout) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Position of a logical input item within one operation.
///
/// Assigned in source order at enqueue time, so sorting by key restores input
/// order no matter which unit finished first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceKey(u64);

impl SequenceKey {
    pub const FIRST: SequenceKey = SequenceKey(0);

    #[must_use]
    pub const fn new(position: u64) -> Self {
        Self(position)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
