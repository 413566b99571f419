//! # txscope
//!
//! Transaction-scoped context propagation for layered async services.
//!
//! txscope lets a tree of service/repository calls share one database
//! transaction handle without threading it through every signature, and
//! guarantees that a nested "start a transaction" request joins the
//! already-open transaction instead of opening a second one.
//!
//! ## Quick Start
//!
//! ```ignore
//! use txscope::prelude::*;
//! use txscope_memstore::MemStore;
//!
//! // Wire the coordination layer over a store and bring it up.
//! let scope = TxScope::new(MemStore::new());
//! scope.initialize().await?;
//!
//! // One unit of work: everything inside commits or rolls back together.
//! let handles = scope.handles.clone();
//! scope.tx.run(move || async move {
//!     let db = handles.get()?;
//!     db.put("order:1", json!({"total": 42})).await?;
//!     db.put("audit:1", json!({"event": "created"})).await?;
//!     Ok::<_, Error>(())
//! }).await?;
//!
//! // Graceful shutdown (drains in-flight transactions).
//! scope.shutdown().await?;
//! ```
//!
//! ## Join semantics
//!
//! The first [`TxScope::tx`]`.run(..)` in a call chain opens a native
//! transaction; every `run` reached from inside it joins that transaction.
//! Business code never sees the difference: it calls
//! [`TxScope::handles`]`.get()` and receives whichever handle the current
//! chain should use.
//!
//! ## Components
//!
//! - [`TxManager`] - join-or-create transaction manager
//! - [`HandleResolver`] - scoped handle accessor for business code
//! - [`context`] - the underlying task-scoped propagation primitive
//! - [`InteractiveStore`] - the contract a backend implements

#![warn(missing_docs)]

mod scope;
mod types;

pub mod prelude;

// Re-export main entry points
pub use scope::{TxScope, TxScopeBuilder};
pub use txscope_core::{Error, Result};

// Re-export component and id types
pub use types::*;

// The scoped-context primitive, for callers who opt a spawned task into
// an open scope.
pub use txscope_context as context;
