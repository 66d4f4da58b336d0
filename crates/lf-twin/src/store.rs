//! Variable store port.
//!
//! The control loop only reads and writes named scalar values. Any
//! industrial-protocol server can sit behind [`VariableStore`]; the crate
//! ships an in-memory implementation for the CLI and tests.

use crate::error::{TwinError, TwinResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Named `f64` variables shared with the outside world.
pub trait VariableStore: Send + Sync {
    fn read(&self, name: &str) -> impl Future<Output = TwinResult<f64>> + Send;

    fn write(&self, name: &str, value: f64) -> impl Future<Output = TwinResult<()>> + Send;
}

/// In-memory store backed by a shared map.
///
/// Clones share the same map, so a handle kept outside the control loop
/// observes published outputs and can change inputs between ticks.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, f64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let map = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: Arc::new(RwLock::new(map)),
        }
    }

    /// Copy of every variable currently held.
    pub async fn snapshot(&self) -> HashMap<String, f64> {
        self.values.read().await.clone()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.values.read().await.contains_key(name)
    }
}

impl VariableStore for MemoryStore {
    async fn read(&self, name: &str) -> TwinResult<f64> {
        self.values
            .read()
            .await
            .get(name)
            .copied()
            .ok_or_else(|| TwinError::Store {
                name: name.to_string(),
                message: "variable not registered".to_string(),
            })
    }

    async fn write(&self, name: &str, value: f64) -> TwinResult<()> {
        self.values.write().await.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let store = MemoryStore::new();
        store.write("x", 2.5).await.unwrap();
        assert_eq!(store.read("x").await.unwrap(), 2.5);
        assert!(store.contains("x").await);
    }

    #[tokio::test]
    async fn missing_variable_is_an_error() {
        let store = MemoryStore::new();
        let err = store.read("missing").await.unwrap_err();
        assert!(matches!(err, TwinError::Store { ref name, .. } if name == "missing"));
    }

    #[tokio::test]
    async fn clones_share_values() {
        let store = MemoryStore::with_values([("a", 1.0)]);
        let handle = store.clone();
        handle.write("a", 3.0).await.unwrap();
        assert_eq!(store.read("a").await.unwrap(), 3.0);
        assert_eq!(store.snapshot().await.len(), 1);
    }
}
