//! Unified error types for txscope.
//!
//! One canonical enum covers the whole coordination layer. Business
//! callbacks keep their own error type (any `E: From<Error>`), so callback
//! errors are never translated on their way out of a transaction.

use thiserror::Error;

/// All txscope errors.
///
/// Lifecycle variants are hard failures: the coordination layer never
/// substitutes an ad hoc resource when readiness is missing.
#[derive(Debug, Error)]
pub enum Error {
    /// Default handle read before `initialize()` completed
    #[error("default handle not initialized")]
    NotInitialized,

    /// Default handle used after `shutdown()`
    #[error("default handle closed")]
    Closed,

    /// `initialize()` called on an already-ready handle
    #[error("default handle already initialized")]
    AlreadyInitialized,

    /// Shutdown drain expired with root transactions still in flight
    #[error("shutdown drain timed out with {active} root transaction(s) in flight")]
    DrainTimeout {
        /// Root transactions still open when the drain gave up
        active: usize,
    },

    /// Underlying store could not open a native transaction
    #[error("begin transaction: {0}")]
    Begin(String),

    /// Connection establishment or teardown failed
    #[error("connection: {0}")]
    Connection(String),

    /// Other backend failure
    #[error("store error: {0}")]
    Store(String),
}

/// Result type for txscope operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a lifecycle error (readiness or shutdown ordering).
    ///
    /// Lifecycle errors indicate a wiring bug in the owning process, not a
    /// transient store condition.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Error::NotInitialized
                | Error::Closed
                | Error::AlreadyInitialized
                | Error::DrainTimeout { .. }
        )
    }

    /// Check if this is a failed native begin.
    pub fn is_begin(&self) -> bool {
        matches!(self, Error::Begin(_))
    }
}
