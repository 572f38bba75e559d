//! Fan-out of one batch onto the blocking pool and the barrier that closes it.

use std::any::Any;
use std::collections::BTreeSet;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::task::JoinSet;

use batchloop_types::SequenceKey;

use crate::deadline::Deadline;
use crate::error::UnitFault;
use crate::invocation::Invocation;
use crate::ledger::Ledgers;

/// Units of one batch, in flight until [`Batch::barrier`] returns.
pub(crate) struct Batch<V> {
    units: JoinSet<SequenceKey>,
    outstanding: BTreeSet<SequenceKey>,
    deadline: Deadline,
    ledgers: Arc<Ledgers<V>>,
}

impl<V: Send + 'static> Batch<V> {
    pub(crate) fn new(deadline: Deadline, ledgers: Arc<Ledgers<V>>) -> Self {
        Self {
            units: JoinSet::new(),
            outstanding: BTreeSet::new(),
            deadline,
            ledgers,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// Launch one unit on a dedicated blocking worker. Must be called from
    /// within the engine's runtime.
    ///
    /// The unit records exactly one ledger entry: its result, or a fault. Body
    /// errors and panics never escape it.
    pub(crate) fn dispatch<T, I>(&mut self, key: SequenceKey, item: T, mut invocation: I)
    where
        T: Send + 'static,
        I: Invocation<T, Output = V>,
    {
        let deadline = self.deadline;
        let ledgers = Arc::clone(&self.ledgers);

        self.outstanding.insert(key);
        self.units.spawn_blocking(move || {
            if deadline.is_expired() {
                ledgers.append_fault(UnitFault::DeadlineExpired {
                    key,
                    timeout: deadline.timeout(),
                });
                return key;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| invocation.execute(item))) {
                Ok(Ok(value)) => ledgers.insert_result(key, value),
                Ok(Err(source)) => ledgers.append_fault(UnitFault::Body { key, source }),
                Err(payload) => ledgers.append_fault(UnitFault::Panicked {
                    key,
                    message: panic_message(payload.as_ref()),
                }),
            }
            key
        });
    }

    /// Wait for every unit of the batch to finish.
    ///
    /// A unit whose task never reports back (the runtime dropped it) is
    /// recorded as lost so that the operation cannot succeed with a hole.
    pub(crate) async fn barrier(mut self) {
        let mut join_errors = Vec::new();
        while let Some(joined) = self.units.join_next().await {
            match joined {
                Ok(key) => {
                    self.outstanding.remove(&key);
                }
                Err(err) => join_errors.push(err.to_string()),
            }
        }

        let mut join_errors = join_errors.into_iter();
        for key in mem::take(&mut self.outstanding) {
            let message = join_errors
                .next()
                .unwrap_or_else(|| "task finished without reporting".to_string());
            tracing::warn!(%key, %message, "Unit lost before reporting");
            self.ledgers.append_fault(UnitFault::Lost { key, message });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
