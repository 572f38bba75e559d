//! The callable each concurrent unit executes.
//!
//! The scheduler clones the invocation once per unit, so any state it carries
//! (including bound extra arguments) is private to that unit.

/// A cloneable body operation applied to one logical item.
pub trait Invocation<T>: Clone + Send + 'static {
    type Output: Send + 'static;

    fn execute(&mut self, item: T) -> anyhow::Result<Self::Output>;
}

/// Invocation backed by a plain closure.
#[derive(Debug, Clone)]
pub struct FnInvocation<F> {
    body: F,
}

/// Wrap `body` as an [`Invocation`].
pub fn invocation<T, R, F>(body: F) -> FnInvocation<F>
where
    F: FnMut(T) -> anyhow::Result<R>,
{
    FnInvocation { body }
}

impl<T, R, F> Invocation<T> for FnInvocation<F>
where
    F: FnMut(T) -> anyhow::Result<R> + Clone + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn execute(&mut self, item: T) -> anyhow::Result<R> {
        (self.body)(item)
    }
}

/// Invocation carrying extra caller-supplied arguments.
///
/// The body receives `(item, &mut extras)`. Use a tuple to bind several
/// arguments. Mutations only affect the executing unit's clone.
#[derive(Debug, Clone)]
pub struct Bound<F, X> {
    body: F,
    extras: X,
}

/// Bind `extras` to `body`.
pub fn bind<T, R, F, X>(body: F, extras: X) -> Bound<F, X>
where
    F: FnMut(T, &mut X) -> anyhow::Result<R>,
{
    Bound { body, extras }
}

impl<F, X> Bound<F, X> {
    #[must_use]
    pub fn extras(&self) -> &X {
        &self.extras
    }
}

impl<T, R, F, X> Invocation<T> for Bound<F, X>
where
    F: FnMut(T, &mut X) -> anyhow::Result<R> + Clone + Send + 'static,
    X: Clone + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn execute(&mut self, item: T) -> anyhow::Result<R> {
        (self.body)(item, &mut self.extras)
    }
}
