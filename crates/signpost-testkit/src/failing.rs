//! A store wrapper that fails writes on demand.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use signpost_core::ResourceClass;
use signpost_store::{InsertResult, Mutation, Result, Store, StoreError};

/// Wraps a store and rejects chosen operations with [`StoreError::Unavailable`].
///
/// Reads always pass through.
pub struct FailingStore<S> {
    inner: S,
    fail_inserts: AtomicBool,
    fail_updates: AtomicBool,
    fail_removes: AtomicBool,
}

impl<S: Store> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_inserts: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Fail every write.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_inserts(fail);
        self.fail_updates(fail);
        self.fail_removes(fail);
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Store> Store for FailingStore<S> {
    async fn insert(&self, class: ResourceClass, key: &str, body: &[u8]) -> Result<InsertResult> {
        Self::check(&self.fail_inserts, "insert")?;
        self.inner.insert(class, key, body).await
    }

    async fn get(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(class, key).await
    }

    async fn list(&self, class: ResourceClass) -> Result<Vec<Vec<u8>>> {
        self.inner.list(class).await
    }

    async fn update(
        &self,
        class: ResourceClass,
        key: &str,
        mutation: Mutation,
    ) -> Result<Option<Vec<u8>>> {
        Self::check(&self.fail_updates, "update")?;
        self.inner.update(class, key, mutation).await
    }

    async fn remove(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        Self::check(&self.fail_removes, "remove")?;
        self.inner.remove(class, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signpost_core::Location;
    use signpost_store::{MemoryStore, StoreExt};

    #[tokio::test]
    async fn test_injected_failures() {
        let store = FailingStore::new(MemoryStore::new());
        store.insert_record(&Location::new("lobby")).await.unwrap();

        store.fail_writes(true);
        let err = store.insert_record(&Location::new("hall")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.remove_record::<Location>("lobby").await.is_err());

        // Reads still work.
        assert!(store.get_record::<Location>("lobby").await.unwrap().is_some());

        store.fail_writes(false);
        assert!(store.remove_record::<Location>("lobby").await.unwrap().is_some());
    }
}
