//! Compute-once-per-key cache shared between concurrent callers
//!
//! Every key owns a `tokio::sync::OnceCell`. Callers asking for the same key
//! at the same time wait on that cell, so the initialiser runs at most once
//! per key unless it fails; a failed initialiser leaves the cell empty.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Lazily populated map from key to a shared, write-once value
pub struct OnceMap<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> OnceMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing it with `init` if absent
    pub async fn get_or_try_init<E, F, Fut>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
            cells.entry(key).or_default().clone()
        };
        cell.get_or_try_init(init).await.cloned()
    }

    /// Returns the value for `key` if it has already been computed
    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys with a computed value
    #[cfg(test)]
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.values().filter(|cell| cell.initialized()).count()
    }

    /// Returns true if no value has been computed yet
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for OnceMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_computes_once_per_key() {
        let cache: OnceMap<&str, usize> = OnceMap::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_init("a", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&"a"), Some(42));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let cache: Arc<OnceMap<String, usize>> = Arc::new(OnceMap::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tasks.spawn(async move {
                cache
                    .get_or_try_init("go.mod".to_string(), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(7)
                    })
                    .await
            });
        }

        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_init_is_not_cached() {
        let cache: OnceMap<&str, usize> = OnceMap::new();

        let first = cache
            .get_or_try_init("a", || async { Err::<usize, _>("boom") })
            .await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty());

        let second = cache
            .get_or_try_init("a", || async { Ok::<_, &str>(1) })
            .await;
        assert_eq!(second, Ok(1));
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let cache: OnceMap<&str, &str> = OnceMap::new();
        let a = cache.get_or_try_init("a", || async { Ok::<_, ()>("x") }).await;
        let b = cache.get_or_try_init("b", || async { Ok::<_, ()>("y") }).await;
        assert_eq!((a, b), (Ok("x"), Ok("y")));
        assert_eq!(cache.len(), 2);
    }
}
