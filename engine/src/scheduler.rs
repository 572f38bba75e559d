//! Batch scheduling loop shared by every loop shape.

use std::sync::Arc;
use std::time::Instant;

use batchloop_types::{LoopOptions, SequenceKey};

use crate::deadline::Deadline;
use crate::dispatch::Batch;
use crate::error::{AggregateFailure, UnitFault};
use crate::invocation::Invocation;
use crate::ledger::Ledgers;

/// Drive `source` to exhaustion in barrier-separated batches of at most
/// `options.partition_size` units.
///
/// Items are pulled serially on the calling task, in order, before their unit
/// is dispatched; only the body runs concurrently. Batch N+1 is not pulled
/// until every unit of batch N has finished.
///
/// Once the deadline has expired, scheduling stops after the current batch.
/// If the source still has an item at that point it is recorded as a
/// deadline fault, so the operation cannot report success.
pub(crate) async fn schedule<S, I>(
    options: LoopOptions,
    mut source: S,
    invocation: I,
) -> Result<Vec<I::Output>, AggregateFailure>
where
    S: Iterator,
    S::Item: Send + 'static,
    I: Invocation<S::Item>,
{
    let started = Instant::now();
    let partition_size = options.partition_size.get();
    let deadline = Deadline::arm(options.timeout);
    let ledgers = Arc::new(Ledgers::new());
    let mut next_key = SequenceKey::FIRST;
    let mut batches = 0u64;

    loop {
        let mut batch = Batch::new(deadline, Arc::clone(&ledgers));
        let mut exhausted = false;
        while batch.len() < partition_size {
            let Some(item) = source.next() else {
                exhausted = true;
                break;
            };
            batch.dispatch(next_key, item, invocation.clone());
            next_key = next_key.next();
        }

        if batch.is_empty() {
            break;
        }
        batches += 1;
        let units = batch.len();
        tracing::debug!(batch = batches, units, "Dispatched batch");
        batch.barrier().await;
        tracing::debug!(
            batch = batches,
            faults = ledgers.fault_count(),
            "Batch barrier reached"
        );

        if exhausted {
            break;
        }
        if deadline.is_expired() {
            if source.next().is_some() {
                ledgers.append_fault(UnitFault::DeadlineExpired {
                    key: next_key,
                    timeout: deadline.timeout(),
                });
                next_key = next_key.next();
            }
            tracing::debug!(batch = batches, "Deadline expired; remaining input abandoned");
            break;
        }
    }

    let dispatched = next_key.get();
    let outcome = ledgers.drain(dispatched);
    let elapsed_ms = started.elapsed().as_millis();
    match &outcome {
        Ok(_) => tracing::info!(units = dispatched, batches, elapsed_ms, "Parallel loop completed"),
        Err(failure) => tracing::warn!(
            failed = failure.faults().len(),
            units = dispatched,
            batches,
            elapsed_ms,
            deadline_expired = failure.deadline_expired(),
            "Parallel loop failed"
        ),
    }
    outcome
}
