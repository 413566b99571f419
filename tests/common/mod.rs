//! Shared helpers for integration tests.

use txscope::prelude::*;
use txscope_memstore::MemStore;

/// An initialized coordination layer plus a store clone for counter and
/// visibility assertions.
pub async fn ready_scope() -> (TxScope<MemStore>, MemStore) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = MemStore::new();
    let scope = TxScope::new(store.clone());
    scope.initialize().await.expect("initialize");
    (scope, store)
}
