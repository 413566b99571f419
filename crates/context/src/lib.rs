//! Task-scoped context propagation
//!
//! A generic carrier of "the value visible to this call chain and its
//! descendants, invisible to concurrent siblings." [`scope`] installs a
//! value for the causal extent of one future; [`current`] reads whatever
//! the calling chain installed, or `None`.
//!
//! Built on `tokio::task_local!` rather than a mutable global: the frame is
//! entered and exited around every poll of the scoped future, so the value
//! survives `.await` suspension points, sibling futures interleaved on the
//! same task (`join!`, `select!`) each see their own frame, and the parent
//! frame is restored when the scoped future completes, success or failure.
//!
//! Frames hold one slot per value type. Entering a scope for one type
//! copies the parent frame first, so nesting a scope of type `B` inside a
//! scope of type `A` hides neither.
//!
//! ## The `spawn` boundary
//!
//! `tokio::spawn` starts a new causal chain: task-locals do not cross it,
//! and a spawned task reads `None`. That is the isolation direction this
//! crate exists to guarantee. A caller who wants a spawned task to inherit
//! a value re-enters [`scope`] around the spawned future:
//!
//! ```ignore
//! let value = txscope_context::current::<Ctx>().unwrap();
//! tokio::spawn(txscope_context::scope(value, work()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static FRAME: Frame;
}

/// One immutable per-type map, installed for the causal extent of a poll
/// tree and discarded when the scoped future completes.
#[derive(Clone, Default)]
struct Frame {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// Execute `fut` with `value` visible to it and everything it awaits.
///
/// For the entire causal extent of `fut` (across suspension points and any
/// sibling futures it composes), `current::<T>()` returns `Some(value)`.
/// Once `fut` completes, the calling chain sees whatever it saw before.
///
/// This is a structural propagation mechanism, not a validating API: there
/// are no error conditions.
pub async fn scope<T, F>(value: Arc<T>, fut: F) -> F::Output
where
    T: Send + Sync + 'static,
    F: Future,
{
    let mut frame = FRAME.try_with(Frame::clone).unwrap_or_default();
    frame.entries.insert(TypeId::of::<T>(), value);
    FRAME.scope(frame, fut).await
}

/// The value of type `T` visible to the current call chain, if any.
///
/// Returns the innermost [`scope`]d value for `T`, or `None` when the chain
/// never entered a scope for `T`. An unrelated concurrent chain never
/// observes this chain's value.
pub fn current<T>() -> Option<Arc<T>>
where
    T: Send + Sync + 'static,
{
    FRAME
        .try_with(|frame| frame.entries.get(&TypeId::of::<T>()).cloned())
        .ok()
        .flatten()
        .and_then(|value| value.downcast::<T>().ok())
}

/// Whether a value of type `T` is visible to the current call chain.
pub fn is_scoped<T>() -> bool
where
    T: Send + Sync + 'static,
{
    current::<T>().is_some()
}
