//! The store: connection state, interactive transactions, counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use txscope_core::{Error, InteractiveStore, Result, TxBody};

use crate::handle::{MemHandle, TxState};

/// In-memory JSON key-value store.
///
/// Cheap to clone; clones share the map, connection state, and counters.
/// Keep one clone outside the coordination layer to read [`stats`] from
/// tests.
///
/// [`stats`]: MemStore::stats
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    data: Arc<RwLock<HashMap<String, Value>>>,
    connected: AtomicBool,
    fail_begins: AtomicBool,
    begins: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
}

/// Snapshot of transaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Native transactions opened
    pub begins: u64,
    /// Transactions that committed
    pub commits: u64,
    /// Transactions that rolled back
    pub rollbacks: u64,
}

impl MemStore {
    /// Create an empty, disconnected store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            begins: self.inner.begins.load(Ordering::SeqCst),
            commits: self.inner.commits.load(Ordering::SeqCst),
            rollbacks: self.inner.rollbacks.load(Ordering::SeqCst),
        }
    }

    /// Make every subsequent begin fail until reset. Test hook.
    pub fn fail_begins(&self, fail: bool) {
        self.inner.fail_begins.store(fail, Ordering::SeqCst);
    }

    /// Whether `connect` has run (and `disconnect` has not).
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InteractiveStore for MemStore {
    type Handle = MemHandle;

    async fn connect(&self) -> Result<MemHandle> {
        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(MemHandle::root(self.inner.data.clone()))
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn interact<T, E>(&self, body: TxBody<MemHandle, T, E>) -> std::result::Result<T, E>
    where
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        if !self.is_connected() {
            return Err(E::from(Error::Begin("store is not connected".into())));
        }
        if self.inner.fail_begins.load(Ordering::SeqCst) {
            return Err(E::from(Error::Begin("induced begin failure".into())));
        }

        self.inner.begins.fetch_add(1, Ordering::SeqCst);
        let tx = Arc::new(TxState::default());
        let handle = MemHandle::transactional(self.inner.data.clone(), tx.clone());

        // If the body never settles (cancellation), the write-set is
        // dropped with it: rollback by construction.
        match body(handle).await {
            Ok(value) => {
                let staged: Vec<_> = tx.writes.lock().drain().collect();
                let mut data = self.inner.data.write();
                for (key, op) in staged {
                    match op {
                        Some(v) => {
                            data.insert(key, v);
                        }
                        None => {
                            data.remove(&key);
                        }
                    }
                }
                self.inner.commits.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            Err(err) => {
                self.inner.rollbacks.fetch_add(1, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn commit_applies_the_write_set() {
        let store = MemStore::new();
        let root = store.connect().await.unwrap();

        store
            .interact::<_, Error>(Box::new(|h| {
                Box::pin(async move {
                    h.put("k", json!("v")).await?;
                    Ok(())
                })
            }))
            .await
            .unwrap();

        assert_eq!(root.get("k").await.unwrap(), Some(json!("v")));
        assert_eq!(
            store.stats(),
            StoreStats {
                begins: 1,
                commits: 1,
                rollbacks: 0
            }
        );
    }

    #[tokio::test]
    async fn error_discards_the_write_set() {
        let store = MemStore::new();
        let root = store.connect().await.unwrap();

        let out: std::result::Result<(), Error> = store
            .interact(Box::new(|h| {
                Box::pin(async move {
                    h.put("k", json!("v")).await?;
                    Err(Error::Store("boom".into()))
                })
            }))
            .await;

        assert!(out.is_err());
        assert_eq!(root.get("k").await.unwrap(), None);
        assert_eq!(store.stats().rollbacks, 1);
    }

    #[tokio::test]
    async fn buffered_writes_visible_inside_their_own_transaction() {
        let store = MemStore::new();
        store.connect().await.unwrap();

        store
            .interact::<_, Error>(Box::new(|h| {
                Box::pin(async move {
                    h.put("k", json!(1)).await?;
                    assert_eq!(h.get("k").await?, Some(json!(1)));
                    assert!(h.delete("k").await?);
                    assert_eq!(h.get("k").await?, None);
                    Ok(())
                })
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn begin_fails_when_disconnected_or_induced() {
        let store = MemStore::new();

        let out: std::result::Result<(), Error> = store
            .interact(Box::new(|_h| Box::pin(async { Ok(()) })))
            .await;
        assert!(matches!(out, Err(Error::Begin(_))));

        store.connect().await.unwrap();
        store.fail_begins(true);
        let out: std::result::Result<(), Error> = store
            .interact(Box::new(|_h| Box::pin(async { Ok(()) })))
            .await;
        assert!(matches!(out, Err(Error::Begin(_))));
        assert_eq!(store.stats().begins, 0);
    }

    #[tokio::test]
    async fn len_accounts_for_buffered_inserts_and_tombstones() {
        let store = MemStore::new();
        let root = store.connect().await.unwrap();
        root.put("a", json!(1)).await.unwrap();
        root.put("b", json!(2)).await.unwrap();

        store
            .interact::<_, Error>(Box::new(|h| {
                Box::pin(async move {
                    h.put("c", json!(3)).await?;
                    h.delete("a").await?;
                    assert_eq!(h.len().await?, 2);
                    Ok(())
                })
            }))
            .await
            .unwrap();

        assert_eq!(root.len().await.unwrap(), 2);
    }
}
