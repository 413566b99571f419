//! Join-or-create transaction engine
//!
//! This crate implements the coordination core:
//! - [`TxManager`]: opens a native transaction for a root `run` call and
//!   lets every nested `run` join it
//! - [`HandleResolver`]: hands business code the transactional handle when
//!   one is in scope, the default handle otherwise
//! - [`StoreLifecycle`]: readiness gating for the default handle
//!   (`Uninitialized → Ready → Closed`) and shutdown drain
//!
//! The engine holds the store behind an `Arc`; it never subclasses or
//! re-implements it. Context propagation is delegated to
//! `txscope-context`, concurrency control to the store itself.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lifecycle;
pub mod manager;
pub mod resolver;

pub use lifecycle::{DrainPolicy, StoreLifecycle};
pub use manager::{TxManager, TxMetrics};
pub use resolver::HandleResolver;
