//! Main entry point for txscope.
//!
//! This module provides the [`TxScope`] struct, the primary entry point
//! that wires the transaction manager and handle resolver over one store.

use std::sync::Arc;
use std::time::Duration;

use txscope_core::{InteractiveStore, Result};
use txscope_engine::{DrainPolicy, HandleResolver, StoreLifecycle, TxManager};

/// The txscope coordination layer over one store.
///
/// Create it with [`TxScope::new`] or [`TxScope::builder`], bring it up
/// with [`initialize`], and hand the public fields to your service layer:
/// [`tx`] opens/joins transactions, [`handles`] resolves the handle for
/// the current call chain.
///
/// # Example
///
/// ```ignore
/// use txscope::prelude::*;
///
/// let scope = TxScope::builder()
///     .drain_timeout(Duration::from_secs(5))
///     .build(store);
/// scope.initialize().await?;
///
/// let handles = scope.handles.clone();
/// scope.tx.run(move || async move {
///     handles.get()?.put("key", json!("value")).await?;
///     Ok::<_, Error>(())
/// }).await?;
///
/// scope.shutdown().await?;
/// ```
///
/// [`initialize`]: TxScope::initialize
/// [`tx`]: TxScope::tx
/// [`handles`]: TxScope::handles
pub struct TxScope<S: InteractiveStore> {
    /// Shared lifecycle (store, default handle state, active-root gauge)
    inner: Arc<StoreLifecycle<S>>,

    /// Join-or-create transaction manager
    pub tx: TxManager<S>,

    /// Handle resolver for business code
    pub handles: HandleResolver<S>,
}

impl<S: InteractiveStore> TxScope<S> {
    /// Wire the coordination layer over `store` with default settings
    /// (shutdown waits for in-flight transactions).
    pub fn new(store: S) -> Self {
        Self::builder().build(store)
    }

    /// Create a builder for shutdown configuration.
    pub fn builder() -> TxScopeBuilder {
        TxScopeBuilder::new()
    }

    /// Establish the store connection and make the default handle
    /// available to resolvers.
    ///
    /// Must complete before any [`HandleResolver::get`] outside a
    /// transaction can succeed; calling it twice is an error.
    pub async fn initialize(&self) -> Result<()> {
        self.inner.initialize().await
    }

    /// Gracefully shut down: reject new work, drain in-flight root
    /// transactions per the configured [`DrainPolicy`], then release the
    /// connection.
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.shutdown().await
    }

    /// Whether the default handle is ready.
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    /// Transaction counter snapshot.
    pub fn metrics(&self) -> txscope_engine::TxMetrics {
        self.tx.metrics()
    }
}

/// Builder for [`TxScope`] configuration.
pub struct TxScopeBuilder {
    drain: DrainPolicy,
}

impl TxScopeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            drain: DrainPolicy::default(),
        }
    }

    /// Set the shutdown drain policy.
    pub fn drain(mut self, policy: DrainPolicy) -> Self {
        self.drain = policy;
        self
    }

    /// Shutdown waits up to `limit` for in-flight transactions, then
    /// gives up loudly.
    pub fn drain_timeout(self, limit: Duration) -> Self {
        self.drain(DrainPolicy::WaitTimeout(limit))
    }

    /// Shutdown releases the connection without waiting.
    pub fn immediate_shutdown(self) -> Self {
        self.drain(DrainPolicy::Immediate)
    }

    /// Wire the coordination layer over `store`.
    pub fn build<S: InteractiveStore>(self, store: S) -> TxScope<S> {
        let inner = Arc::new(StoreLifecycle::new(store, self.drain));
        TxScope {
            tx: TxManager::new(inner.clone()),
            handles: HandleResolver::new(inner.clone()),
            inner,
        }
    }
}

impl Default for TxScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
