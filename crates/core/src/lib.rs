//! Core vocabulary for txscope
//!
//! This crate defines the types shared by every other txscope crate:
//! - [`Error`]: the canonical error taxonomy
//! - [`TxId`]: correlation identifier for one root transaction
//! - [`TxContext`]: the scoped state carried for one open root transaction
//! - [`InteractiveStore`]: the contract the underlying store must satisfy
//!
//! Nothing here executes transactions; this is the shared boundary between
//! the coordination engine and concrete store backends.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod store;
pub mod types;

pub use context::TxContext;
pub use error::{Error, Result};
pub use store::{InteractiveStore, TxBody};
pub use types::TxId;
