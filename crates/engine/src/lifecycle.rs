//! Default-handle lifecycle and shutdown drain.
//!
//! The default (non-transactional) handle moves through three states,
//! driven only by explicit calls from the owning process:
//!
//! ```text
//! Uninitialized --initialize()--> Ready --shutdown()--> Closed
//! ```
//!
//! A resolver read never triggers a transition. Reading the handle outside
//! `Ready` is a hard error: the layer refuses to hand out a
//! silently-allocated substitute resource.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Notify;
use txscope_core::{Error, InteractiveStore, Result};

/// Shutdown behavior for root transactions still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Wait until every in-flight root transaction settles.
    Wait,
    /// Wait up to the given limit, then give up with
    /// [`Error::DrainTimeout`]. The connection is still released.
    WaitTimeout(Duration),
    /// Release the connection without waiting.
    Immediate,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        DrainPolicy::Wait
    }
}

enum HandleState<H> {
    Uninitialized,
    Ready(H),
    Closed,
}

/// Owns the store, the default-handle state machine, and the active-root
/// gauge used by the shutdown drain.
///
/// Shared (behind `Arc`) by the manager and the resolver.
pub struct StoreLifecycle<S: InteractiveStore> {
    store: S,
    state: RwLock<HandleState<S::Handle>>,
    drain: DrainPolicy,
    roots: ActiveRoots,
}

impl<S: InteractiveStore> StoreLifecycle<S> {
    /// Wrap a store with the given drain policy. The handle starts
    /// `Uninitialized`.
    pub fn new(store: S, drain: DrainPolicy) -> Self {
        Self {
            store,
            state: RwLock::new(HandleState::Uninitialized),
            drain,
            roots: ActiveRoots::new(),
        }
    }

    /// Establish the connection and transition to `Ready`.
    ///
    /// Must complete before any resolver read can succeed. Calling it on a
    /// handle that is already `Ready` is [`Error::AlreadyInitialized`];
    /// after `shutdown()` it is [`Error::Closed`].
    pub async fn initialize(&self) -> Result<()> {
        {
            let state = self.state.read();
            match &*state {
                HandleState::Uninitialized => {}
                HandleState::Ready(_) => return Err(Error::AlreadyInitialized),
                HandleState::Closed => return Err(Error::Closed),
            }
        }
        let handle = self.store.connect().await?;
        let mut state = self.state.write();
        match &*state {
            HandleState::Uninitialized => {
                *state = HandleState::Ready(handle);
                tracing::info!("default store handle ready");
                Ok(())
            }
            HandleState::Ready(_) => Err(Error::AlreadyInitialized),
            HandleState::Closed => Err(Error::Closed),
        }
    }

    /// Transition to `Closed`, drain in-flight roots per policy, release
    /// the connection.
    ///
    /// New root transactions and resolver reads are rejected as soon as the
    /// state flips, so the drain only ever waits on work that was already
    /// running. A timed-out drain still disconnects before surfacing
    /// [`Error::DrainTimeout`].
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            match &*state {
                HandleState::Uninitialized => return Err(Error::NotInitialized),
                HandleState::Closed => return Err(Error::Closed),
                HandleState::Ready(_) => *state = HandleState::Closed,
            }
        }
        let drained = match self.drain {
            DrainPolicy::Immediate => Ok(()),
            DrainPolicy::Wait => {
                self.roots.drained().await;
                Ok(())
            }
            DrainPolicy::WaitTimeout(limit) => {
                match tokio::time::timeout(limit, self.roots.drained()).await {
                    Ok(()) => Ok(()),
                    Err(_) => Err(Error::DrainTimeout {
                        active: self.roots.active(),
                    }),
                }
            }
        };
        self.store.disconnect().await?;
        tracing::info!("default store handle closed");
        drained
    }

    /// The default handle, if `Ready`.
    pub fn default_handle(&self) -> Result<S::Handle> {
        match &*self.state.read() {
            HandleState::Uninitialized => Err(Error::NotInitialized),
            HandleState::Ready(handle) => Ok(handle.clone()),
            HandleState::Closed => Err(Error::Closed),
        }
    }

    /// Error unless the handle is `Ready`.
    pub fn ensure_ready(&self) -> Result<()> {
        self.default_handle().map(|_| ())
    }

    /// Whether the handle is currently `Ready`.
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.read(), HandleState::Ready(_))
    }

    /// Root transactions currently in flight.
    pub fn active_roots(&self) -> usize {
        self.roots.active()
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn roots(&self) -> &ActiveRoots {
        &self.roots
    }
}

/// Gauge of in-flight root transactions.
///
/// Guards are RAII: a cancelled root drops its guard with its future, so
/// the shutdown drain cannot wedge on abandoned work.
pub(crate) struct ActiveRoots {
    count: AtomicUsize,
    settled: Notify,
}

impl ActiveRoots {
    fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            settled: Notify::new(),
        }
    }

    pub(crate) fn enter(&self) -> RootGuard<'_> {
        self.count.fetch_add(1, Ordering::AcqRel);
        RootGuard { roots: self }
    }

    pub(crate) fn active(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Resolves once no root transaction is in flight.
    pub(crate) async fn drained(&self) {
        loop {
            let settled = self.settled.notified();
            if self.active() == 0 {
                return;
            }
            settled.await;
        }
    }
}

pub(crate) struct RootGuard<'a> {
    roots: &'a ActiveRoots,
}

impl Drop for RootGuard<'_> {
    fn drop(&mut self) {
        if self.roots.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.roots.settled.notify_waiters();
        }
    }
}
