//! Resource resolver.
//!
//! The single accessor business code uses to reach the store. Inside a
//! `run` scope it returns the transactional handle; outside, the default
//! handle, provided initialization completed. A missing-readiness read is
//! a hard error, never a silently-created substitute handle.

use std::sync::Arc;

use txscope_core::{InteractiveStore, Result, TxContext, TxId};

use crate::lifecycle::StoreLifecycle;

/// Resolves the handle visible to the current call chain.
///
/// Cheap to clone; clones share the lifecycle.
pub struct HandleResolver<S: InteractiveStore> {
    lifecycle: Arc<StoreLifecycle<S>>,
}

impl<S: InteractiveStore> Clone for HandleResolver<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<S: InteractiveStore> HandleResolver<S> {
    /// Create a resolver over a shared lifecycle.
    pub fn new(lifecycle: Arc<StoreLifecycle<S>>) -> Self {
        Self { lifecycle }
    }

    /// The handle for the current call chain.
    ///
    /// Transactional handle when a [`TxContext`] is in scope, otherwise
    /// the default handle. Fails with a lifecycle error when the default
    /// handle is not `Ready`.
    pub fn get(&self) -> Result<S::Handle> {
        if let Some(ctx) = txscope_context::current::<TxContext<S::Handle>>() {
            return Ok(ctx.handle().clone());
        }
        self.lifecycle.default_handle()
    }

    /// Correlation id of the transaction this chain runs inside, if any.
    pub fn current_tx(&self) -> Option<TxId> {
        txscope_context::current::<TxContext<S::Handle>>().map(|ctx| ctx.id())
    }

    /// Whether the current chain runs inside an open transaction.
    pub fn in_transaction(&self) -> bool {
        self.current_tx().is_some()
    }
}
