//! Keyed cancellation tokens for superseding in-flight post-deploy probes
//!
//! Lifecycle: `begin` inserts (cancelling any previous entry under the same
//! key); `finish` removes the entry once every probe of that dispatch has
//! ended, unless a newer dispatch has already replaced it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Token handed out by [`CancellationRegistry::begin`]
#[derive(Debug, Clone)]
pub struct Lease {
    pub key: String,
    pub generation: u64,
    pub token: CancellationToken,
}

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    entries: Mutex<HashMap<String, (u64, CancellationToken)>>,
    next_generation: AtomicU64,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, key: &str) -> Lease {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous =
            self.lock_entries(|entries| entries.insert(key.to_string(), (generation, token.clone())));
        if let Some((old_generation, old)) = previous {
            debug!(key, old_generation, "Cancelling superseded post-deploy probes");
            old.cancel();
        }

        Lease {
            key: key.to_string(),
            generation,
            token,
        }
    }

    /// Cancels and removes the entry for `key`; returns whether one existed
    pub fn cancel(&self, key: &str) -> bool {
        let removed = self.lock_entries(|entries| entries.remove(key));
        match removed {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn finish(&self, lease: &Lease) {
        self.lock_entries(|entries| {
            if entries.get(&lease.key).map(|(g, _)| *g) == Some(lease.generation) {
                entries.remove(&lease.key);
            }
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock_entries(|entries| entries.contains_key(key))
    }

    fn lock_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, (u64, CancellationToken)>) -> R) -> R {
        match self.entries.lock() {
            Ok(mut entries) => f(&mut entries),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous() {
        let registry = CancellationRegistry::new();
        let first = registry.begin("site-a");
        let second = registry.begin("site-a");

        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert!(registry.contains("site-a"));
    }

    #[test]
    fn test_keys_are_independent() {
        let registry = CancellationRegistry::new();
        let a = registry.begin("site-a");
        let b = registry.begin("site-b");

        assert!(registry.cancel("site-a"));
        assert!(a.token.is_cancelled());
        assert!(!b.token.is_cancelled());
        assert!(!registry.cancel("site-a"));
    }

    #[test]
    fn test_finish_only_removes_own_generation() {
        let registry = CancellationRegistry::new();
        let stale = registry.begin("site-a");
        let current = registry.begin("site-a");

        registry.finish(&stale);
        assert!(registry.contains("site-a"));

        registry.finish(&current);
        assert!(!registry.contains("site-a"));
    }
}
