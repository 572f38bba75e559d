//! Operation-wide deadline.

use std::time::{Duration, Instant};

use batchloop_types::LoopTimeout;

/// Armed once when an operation starts and shared read-only by every unit.
///
/// Expiry never interrupts a running body. It only stops units that have not
/// started yet from calling theirs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    expires_at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub(crate) fn arm(timeout: LoopTimeout) -> Self {
        let timeout = timeout.get();
        let now = Instant::now();
        // An unrepresentable expiry counts as already expired.
        let expires_at = now.checked_add(timeout).unwrap_or(now);
        Self {
            expires_at,
            timeout,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}
