use crate::error::LoopError;
use crate::invocation::Invocation;
use crate::parallel::{ParallelLoop, ScopedLoop};

impl ScopedLoop<'_> {
    /// Run `invocation` once per element of `items`, consumed one partition
    /// at a time. Results come back in source order.
    pub fn for_each<S, I>(&self, items: S, invocation: I) -> Result<Vec<I::Output>, LoopError>
    where
        S: IntoIterator,
        S::Item: Send + 'static,
        I: Invocation<S::Item>,
    {
        self.run(items.into_iter(), invocation)
    }
}

impl ParallelLoop {
    /// See [`ScopedLoop::for_each`].
    pub fn for_each<S, I>(&self, items: S, invocation: I) -> Result<Vec<I::Output>, LoopError>
    where
        S: IntoIterator,
        S::Item: Send + 'static,
        I: Invocation<S::Item>,
    {
        self.default_scope().for_each(items, invocation)
    }
}
