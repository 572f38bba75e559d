use batchloop_types::{CounterRange, Operand};

use crate::error::LoopError;
use crate::invocation::Invocation;
use crate::parallel::{ParallelLoop, ScopedLoop};

impl ScopedLoop<'_> {
    /// Run `invocation` once per counter value of `range`.
    ///
    /// The range is validated before anything is dispatched. Results come
    /// back in the order the counter produced the values.
    pub fn for_range<T, I>(
        &self,
        range: CounterRange<T>,
        invocation: I,
    ) -> Result<Vec<I::Output>, LoopError>
    where
        T: Operand,
        I: Invocation<T>,
    {
        let mut counter = range.into_counter()?;
        let outcome = self.run(counter.by_ref(), invocation);
        if counter.overflowed() {
            tracing::debug!(
                relation = %range.relation,
                bound = %range.bound,
                assignment = %range.assignment,
                step = %range.step,
                "Counter range ended at the last representable value"
            );
        }
        outcome
    }
}

impl ParallelLoop {
    /// See [`ScopedLoop::for_range`].
    pub fn for_range<T, I>(
        &self,
        range: CounterRange<T>,
        invocation: I,
    ) -> Result<Vec<I::Output>, LoopError>
    where
        T: Operand,
        I: Invocation<T>,
    {
        self.default_scope().for_range(range, invocation)
    }
}
