//! Convenient imports for txscope.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```ignore
//! use txscope::prelude::*;
//!
//! let scope = TxScope::new(store);
//! scope.initialize().await?;
//! ```

// Main entry point
pub use crate::scope::{TxScope, TxScopeBuilder};

// Error handling
pub use crate::{Error, Result};

// Components
pub use crate::types::{HandleResolver, TxManager};

// Store contract and transaction types
pub use crate::types::{DrainPolicy, InteractiveStore, TxContext, TxId, TxMetrics};

// Re-export serde_json for convenience
pub use serde_json::json;
