use std::iter;

use crate::error::LoopError;
use crate::invocation::Invocation;
use crate::parallel::{ParallelLoop, ScopedLoop};

/// Serial source of items for [`ScopedLoop::while_cursor`].
///
/// `advance` is called on the caller's thread, once per item, in order, and
/// never concurrently with itself. It may have side effects.
pub trait Cursor {
    type Item: Send + 'static;

    /// The next item, or `None` once the loop condition is false.
    fn advance(&mut self) -> Option<Self::Item>;
}

/// Cursor driven by a predicate over mutable state.
///
/// Each time the predicate returns true the cursor yields a snapshot (clone)
/// of the state as it stands after the predicate ran.
#[derive(Debug, Clone)]
pub struct PredicateCursor<S, P> {
    state: S,
    predicate: P,
}

pub fn predicate_cursor<S, P>(seed: S, predicate: P) -> PredicateCursor<S, P>
where
    P: FnMut(&mut S) -> bool,
{
    PredicateCursor {
        state: seed,
        predicate,
    }
}

impl<S, P> PredicateCursor<S, P> {
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S, P> Cursor for PredicateCursor<S, P>
where
    S: Clone + Send + 'static,
    P: FnMut(&mut S) -> bool,
{
    type Item = S;

    fn advance(&mut self) -> Option<S> {
        (self.predicate)(&mut self.state).then(|| self.state.clone())
    }
}

/// Cursor backed by a closure returning the next item.
#[derive(Debug, Clone)]
pub struct FnCursor<F>(F);

pub fn cursor_fn<T, F>(next: F) -> FnCursor<F>
where
    F: FnMut() -> Option<T>,
{
    FnCursor(next)
}

impl<T, F> Cursor for FnCursor<F>
where
    T: Send + 'static,
    F: FnMut() -> Option<T>,
{
    type Item = T;

    fn advance(&mut self) -> Option<T> {
        (self.0)()
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    type Item = C::Item;

    fn advance(&mut self) -> Option<C::Item> {
        (**self).advance()
    }
}

impl ScopedLoop<'_> {
    /// Run `invocation` for every item the cursor yields, until it yields
    /// `None`. Bodies are run for their side effects.
    pub fn while_cursor<C, I>(&self, mut cursor: C, invocation: I) -> Result<(), LoopError>
    where
        C: Cursor,
        I: Invocation<C::Item, Output = ()>,
    {
        self.run(iter::from_fn(|| cursor.advance()), invocation)
            .map(|_| ())
    }
}

impl ParallelLoop {
    /// See [`ScopedLoop::while_cursor`].
    pub fn while_cursor<C, I>(&self, cursor: C, invocation: I) -> Result<(), LoopError>
    where
        C: Cursor,
        I: Invocation<C::Item, Output = ()>,
    {
        self.default_scope().while_cursor(cursor, invocation)
    }
}
