//! Result and fault ledgers shared by every unit of one operation.

use std::collections::BTreeMap;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use batchloop_types::SequenceKey;

use crate::error::{AggregateFailure, UnitFault};

#[derive(Debug)]
pub(crate) struct Ledgers<V> {
    results: Mutex<BTreeMap<SequenceKey, V>>,
    faults: Mutex<Vec<UnitFault>>,
}

// A unit that panicked while holding a lock has already been recorded as a
// fault; the data behind the lock is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V> Ledgers<V> {
    pub(crate) fn new() -> Self {
        Self {
            results: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn insert_result(&self, key: SequenceKey, value: V) {
        let previous = lock(&self.results).insert(key, value);
        debug_assert!(previous.is_none(), "sequence key {key} recorded twice");
    }

    pub(crate) fn append_fault(&self, fault: UnitFault) {
        lock(&self.faults).push(fault);
    }

    pub(crate) fn fault_count(&self) -> usize {
        lock(&self.faults).len()
    }

    /// Ordered results, or every fault if any unit failed. Successful results
    /// are discarded on failure.
    pub(crate) fn drain(&self, dispatched: u64) -> Result<Vec<V>, AggregateFailure> {
        let faults = mem::take(&mut *lock(&self.faults));
        let results = mem::take(&mut *lock(&self.results));
        if !faults.is_empty() {
            return Err(AggregateFailure::new(faults, dispatched));
        }
        Ok(results.into_values().collect())
    }
}
