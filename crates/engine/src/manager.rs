//! Join-or-create transaction manager.
//!
//! `run(callback)` is the sole way to open or extend a transactional unit
//! of work. The first `run` in a call chain opens a native transaction and
//! installs a [`TxContext`] in the task scope; every `run` reached from
//! inside that scope joins the open transaction instead of starting its
//! own. Exactly one native transaction exists per root call, and the whole
//! graph commits or rolls back together.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use txscope_core::{Error, InteractiveStore, TxBody, TxContext, TxId};

use crate::lifecycle::StoreLifecycle;

/// Join-or-create orchestrator over one [`InteractiveStore`].
///
/// Cheap to clone; clones share the lifecycle and counters.
pub struct TxManager<S: InteractiveStore> {
    lifecycle: Arc<StoreLifecycle<S>>,
    stats: Arc<TxStats>,
}

impl<S: InteractiveStore> Clone for TxManager<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            stats: self.stats.clone(),
        }
    }
}

#[derive(Default)]
struct TxStats {
    started: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    joined: AtomicU64,
}

/// Snapshot of manager counters. Observational only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxMetrics {
    /// Root transactions opened
    pub roots_started: u64,
    /// Root transactions that committed
    pub committed: u64,
    /// Root invocations that ended without a commit (callback error or
    /// failed begin)
    pub rolled_back: u64,
    /// Nested `run` calls that joined an open transaction
    pub joined: u64,
    /// Root transactions currently in flight
    pub active: usize,
}

impl<S: InteractiveStore> TxManager<S> {
    /// Create a manager over a shared lifecycle.
    pub fn new(lifecycle: Arc<StoreLifecycle<S>>) -> Self {
        Self {
            lifecycle,
            stats: Arc::new(TxStats::default()),
        }
    }

    /// Execute `f` inside a transaction, joining one if the call chain
    /// already opened it.
    ///
    /// ## Join path
    ///
    /// A [`TxContext`] is visible in the current scope: `f` is invoked
    /// directly, without opening a native transaction or creating a new
    /// context. The outcome belongs to the root: an error here rolls back
    /// the whole graph.
    ///
    /// ## Create path
    ///
    /// No context is visible: the lifecycle must be `Ready`, a fresh
    /// [`TxId`] is minted, and the store opens a native interactive
    /// transaction. `f` and everything it awaits see the new context via
    /// the resolver. The native primitive commits iff `f` returns `Ok`.
    ///
    /// ## Errors
    ///
    /// `f`'s own error type `E` propagates unchanged, with no translation
    /// and no retry. A failed native begin surfaces as
    /// `E::from(Error::Begin(..))`; callers wanting retry-on-conflict wrap
    /// `run` themselves.
    pub async fn run<T, E, F, Fut>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        if let Some(ctx) = txscope_context::current::<TxContext<S::Handle>>() {
            self.stats.joined.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(tx = %ctx.id(), "joining open transaction");
            return f().await;
        }

        self.lifecycle.ensure_ready().map_err(E::from)?;

        let id = TxId::new();
        let _guard = self.lifecycle.roots().enter();
        self.stats.started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(tx = %id, "opening root transaction");

        let body: TxBody<S::Handle, T, E> = Box::new(move |handle| {
            Box::pin(async move {
                let ctx = Arc::new(TxContext::new(handle, id));
                txscope_context::scope(ctx, f()).await
            })
        });
        let result = self.lifecycle.store().interact(body).await;

        match &result {
            Ok(_) => {
                self.stats.committed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(tx = %id, "root transaction committed");
            }
            Err(_) => {
                self.stats.rolled_back.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(tx = %id, "root transaction rolled back");
            }
        }
        result
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> TxMetrics {
        TxMetrics {
            roots_started: self.stats.started.load(Ordering::Relaxed),
            committed: self.stats.committed.load(Ordering::Relaxed),
            rolled_back: self.stats.rolled_back.load(Ordering::Relaxed),
            joined: self.stats.joined.load(Ordering::Relaxed),
            active: self.lifecycle.active_roots(),
        }
    }
}
