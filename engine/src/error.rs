//! Error taxonomy for parallel loop operations.

use std::time::Duration;

use thiserror::Error;

use batchloop_types::{OptionsError, SequenceKey, StepperError};

/// Failure of a whole operation.
///
/// `Options`, `Stepper` and `Runtime` are raised before any unit is
/// dispatched. `Failed` is raised once, after the last batch, when at least
/// one unit failed; no partial results accompany it.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("invalid counter range: {0}")]
    Stepper(#[from] StepperError),
    #[error("failed to start worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error(transparent)]
    Failed(#[from] AggregateFailure),
}

impl LoopError {
    /// The aggregated unit failures, if this is an execution failure.
    #[must_use]
    pub fn as_aggregate(&self) -> Option<&AggregateFailure> {
        match self {
            Self::Failed(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

/// Every unit failure captured during one operation.
#[derive(Debug, Error)]
#[error("{} of {dispatched} invocations failed", faults.len())]
pub struct AggregateFailure {
    faults: Vec<UnitFault>,
    dispatched: u64,
}

impl AggregateFailure {
    /// Faults are sorted by sequence key.
    pub(crate) fn new(mut faults: Vec<UnitFault>, dispatched: u64) -> Self {
        faults.sort_by_key(UnitFault::key);
        Self { faults, dispatched }
    }

    #[must_use]
    pub fn faults(&self) -> &[UnitFault] {
        &self.faults
    }

    #[must_use]
    pub fn into_faults(self) -> Vec<UnitFault> {
        self.faults
    }

    /// Units handed to the dispatcher, including those that never ran.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Whether any unit was skipped because the deadline had passed.
    #[must_use]
    pub fn deadline_expired(&self) -> bool {
        self.faults
            .iter()
            .any(|fault| matches!(fault, UnitFault::DeadlineExpired { .. }))
    }
}

/// Failure of a single unit. Never propagated on its own; always folded into
/// an [`AggregateFailure`].
#[derive(Debug, Error)]
pub enum UnitFault {
    #[error("invocation {key} failed: {source}")]
    Body {
        key: SequenceKey,
        source: anyhow::Error,
    },
    #[error("invocation {key} panicked: {message}")]
    Panicked { key: SequenceKey, message: String },
    #[error("invocation {key} not started: deadline of {timeout:?} expired")]
    DeadlineExpired {
        key: SequenceKey,
        timeout: Duration,
    },
    #[error("invocation {key} was lost: {message}")]
    Lost { key: SequenceKey, message: String },
}

impl UnitFault {
    #[must_use]
    pub fn key(&self) -> SequenceKey {
        match self {
            Self::Body { key, .. }
            | Self::Panicked { key, .. }
            | Self::DeadlineExpired { key, .. }
            | Self::Lost { key, .. } => *key,
        }
    }

    /// The error returned by the body, if the body itself failed.
    #[must_use]
    pub fn body_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Body { source, .. } => Some(source),
            _ => None,
        }
    }
}
