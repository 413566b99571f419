//! Identifier types.
//!
//! [`TxId`] tags one root transaction for diagnostics and tracing. It is
//! purely observational: nothing in the coordination layer consults it for
//! control flow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation identifier for one root transaction.
///
/// A fresh `TxId` is minted each time the manager opens a native
/// transaction; every nested join observes the same id. `Display` renders
/// the short 8-hex prefix used in log lines.
///
/// # Examples
///
/// ```
/// use txscope_core::TxId;
///
/// let id1 = TxId::new();
/// let id2 = TxId::new();
/// assert_ne!(id1, id2);
/// assert_eq!(id1.short().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(Uuid);

impl TxId {
    /// Mint a new random TxId using UUID v4
    pub fn new() -> Self {
        TxId(Uuid::new_v4())
    }

    /// Short 8-hex-char form for log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// The full underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx:{}", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_short_form() {
        let id = TxId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("tx:"));
        assert_eq!(shown.len(), "tx:".len() + 8);
    }

    #[test]
    fn short_is_prefix_of_full_uuid() {
        let id = TxId::new();
        assert!(id.as_uuid().simple().to_string().starts_with(&id.short()));
    }
}
