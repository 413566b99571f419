//! Public types for the txscope unified API.
//!
//! This module re-exports types from internal crates with a clean public
//! interface.

// Store contract
pub use txscope_core::{InteractiveStore, TxBody};

// Transaction types
pub use txscope_core::{TxContext, TxId};

// Engine types
pub use txscope_engine::{DrainPolicy, HandleResolver, TxManager, TxMetrics};
