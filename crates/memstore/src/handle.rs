//! Store handles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use txscope_core::Result;

/// Per-transaction write-set. `None` marks a delete.
#[derive(Default)]
pub(crate) struct TxState {
    pub(crate) writes: Mutex<HashMap<String, Option<Value>>>,
}

/// Handle to the in-memory store.
///
/// The default handle (from `connect`) operates directly on the committed
/// map; a transactional handle (inside `interact`) routes writes into its
/// transaction's write-set and reads through it.
#[derive(Clone)]
pub struct MemHandle {
    data: Arc<RwLock<HashMap<String, Value>>>,
    tx: Option<Arc<TxState>>,
}

impl MemHandle {
    pub(crate) fn root(data: Arc<RwLock<HashMap<String, Value>>>) -> Self {
        Self { data, tx: None }
    }

    pub(crate) fn transactional(
        data: Arc<RwLock<HashMap<String, Value>>>,
        tx: Arc<TxState>,
    ) -> Self {
        Self { data, tx: Some(tx) }
    }

    /// Whether this handle is bound to an open transaction.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Whether two handles are views of the same underlying store, with
    /// the same transactional binding. Used by tests to assert the
    /// resolver hands out the one default handle.
    pub fn shares_storage_with(&self, other: &MemHandle) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.tx.is_some() == other.tx.is_some()
    }

    /// Store `value` under `key`.
    pub async fn put(&self, key: &str, value: Value) -> Result<()> {
        tokio::task::yield_now().await;
        match &self.tx {
            Some(tx) => {
                tx.writes.lock().insert(key.to_string(), Some(value));
            }
            None => {
                self.data.write().insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// The value under `key` visible to this handle.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        tokio::task::yield_now().await;
        if let Some(tx) = &self.tx {
            if let Some(op) = tx.writes.lock().get(key) {
                return Ok(op.clone());
            }
        }
        Ok(self.data.read().get(key).cloned())
    }

    /// Remove `key`; returns whether it was visible.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        tokio::task::yield_now().await;
        match &self.tx {
            Some(tx) => {
                let mut writes = tx.writes.lock();
                let existed = match writes.get(key) {
                    Some(op) => op.is_some(),
                    None => self.data.read().contains_key(key),
                };
                writes.insert(key.to_string(), None);
                Ok(existed)
            }
            None => Ok(self.data.write().remove(key).is_some()),
        }
    }

    /// Number of keys visible to this handle.
    pub async fn len(&self) -> Result<usize> {
        tokio::task::yield_now().await;
        match &self.tx {
            None => Ok(self.data.read().len()),
            Some(tx) => {
                // Lock order everywhere: write-set first, then the map.
                let writes = tx.writes.lock();
                let data = self.data.read();
                let mut count = data.len();
                for (key, op) in writes.iter() {
                    let committed = data.contains_key(key);
                    match op {
                        Some(_) if !committed => count += 1,
                        None if committed => count -= 1,
                        _ => {}
                    }
                }
                Ok(count)
            }
        }
    }
}

impl fmt::Debug for MemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemHandle")
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
