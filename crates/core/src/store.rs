//! The contract required from the underlying store.
//!
//! txscope coordinates transactions; it never executes SQL or manages a
//! connection pool itself. A backend plugs in by implementing
//! [`InteractiveStore`]: one native interactive-transaction primitive plus
//! connection establishment for the default (non-transactional) handle.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{Error, Result};

/// Callback executed inside one native interactive transaction.
///
/// The body receives a transactional handle and resolves to the value (or
/// error) that decides the transaction's fate.
pub type TxBody<H, T, E> =
    Box<dyn FnOnce(H) -> BoxFuture<'static, std::result::Result<T, E>> + Send>;

/// A transactional resource the coordination layer can drive.
///
/// `Handle` is the opaque reference business code operates through; the
/// same type serves as the default handle (from [`connect`]) and the
/// transactional handle (passed to an [`interact`] body).
///
/// [`connect`]: InteractiveStore::connect
/// [`interact`]: InteractiveStore::interact
#[async_trait]
pub trait InteractiveStore: Send + Sync + 'static {
    /// Opaque resource handle vended to business code.
    type Handle: Clone + Send + Sync + 'static;

    /// Establish the connection backing the default handle.
    async fn connect(&self) -> Result<Self::Handle>;

    /// Release the connection established by [`connect`].
    ///
    /// [`connect`]: InteractiveStore::connect
    async fn disconnect(&self) -> Result<()>;

    /// Execute `body` inside one native interactive transaction.
    ///
    /// ## Contract
    ///
    /// - Commits iff `body` returns `Ok`; rolls back when it returns `Err`.
    /// - Propagates `body`'s value or error unchanged; a failed begin
    ///   surfaces as `E::from(Error::Begin(..))`.
    /// - If the returned future is dropped before `body` settles
    ///   (cancellation), the transaction must still reach a definite
    ///   outcome; implementations treat an unfinished body as rollback.
    async fn interact<T, E>(&self, body: TxBody<Self::Handle, T, E>) -> std::result::Result<T, E>
    where
        T: Send + 'static,
        E: From<Error> + Send + 'static;
}
