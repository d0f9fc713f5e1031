//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use signpost_core::ResourceClass;

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Mutation, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    records: RwLock<BTreeMap<(ResourceClass, String), Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of records held across all classes.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, class: ResourceClass, key: &str, body: &[u8]) -> Result<InsertResult> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let slot = (class, key.to_string());
        if records.contains_key(&slot) {
            return Ok(InsertResult::Duplicate);
        }
        records.insert(slot, body.to_vec());
        Ok(InsertResult::Inserted)
    }

    async fn get(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(&(class, key.to_string())).cloned())
    }

    async fn list(&self, class: ResourceClass) -> Result<Vec<Vec<u8>>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .filter(|((c, _), _)| *c == class)
            .map(|(_, body)| body.clone())
            .collect())
    }

    async fn update(
        &self,
        class: ResourceClass,
        key: &str,
        mutation: Mutation,
    ) -> Result<Option<Vec<u8>>> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let Some(current) = records.get_mut(&(class, key.to_string())) else {
            return Ok(None);
        };

        let updated = mutation(current.clone())?;
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn remove(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(records.remove(&(class, key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use signpost_core::{Location, LocationPatch, ValidationError, View};

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let lobby = Location::new("lobby").with_view("loop");

        let result = store.insert_record(&lobby).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let fetched: Location = store.get_record("lobby").await.unwrap().unwrap();
        assert_eq!(fetched, lobby);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_first() {
        let store = MemoryStore::new();
        store.insert_record(&Location::new("lobby")).await.unwrap();

        let second = Location::new("lobby").with_view("other");
        let result = store.insert_record(&second).await.unwrap();
        assert_eq!(result, InsertResult::Duplicate);

        let fetched: Location = store.get_record("lobby").await.unwrap().unwrap();
        assert!(fetched.views.is_empty());
    }

    #[tokio::test]
    async fn test_classes_do_not_collide() {
        let store = MemoryStore::new();
        store.insert_record(&Location::new("shared")).await.unwrap();
        let result = store.insert_record(&View::new("shared")).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let locations: Vec<Location> = store.list_records().await.unwrap();
        let views: Vec<View> = store.list_records().await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(views.len(), 1);
    }

    #[tokio::test]
    async fn test_list_ordered_by_key() {
        let store = MemoryStore::new();
        for name in ["c", "a", "b"] {
            store.insert_record(&View::new(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list_records::<View>()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store = MemoryStore::new();
        store.insert_record(&Location::new("lobby")).await.unwrap();

        let patch = LocationPatch {
            monitors: Some(vec!["east".into()]),
            views: None,
        };
        let updated: Location = store
            .update_record("lobby", move |l: &mut Location| {
                patch.apply(l);
                Ok(())
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.monitors, vec!["east".to_string()]);

        let missing = store
            .update_record("nowhere", |_: &mut Location| Ok(()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_rejected_update_writes_nothing() {
        let store = MemoryStore::new();
        store.insert_record(&Location::new("lobby")).await.unwrap();

        let err = store
            .update_record("lobby", |l: &mut Location| {
                l.views.push("x".into());
                Err(ValidationError::Empty { field: "views" }.into())
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let fetched: Location = store.get_record("lobby").await.unwrap().unwrap();
        assert!(fetched.views.is_empty());
    }

    #[tokio::test]
    async fn test_rename_rejected() {
        let store = MemoryStore::new();
        store.insert_record(&Location::new("lobby")).await.unwrap();

        let err = store
            .update_record("lobby", |l: &mut Location| {
                l.name = "hall".into();
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::KeyChanged { .. }));
        assert!(store.get_record::<Location>("hall").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_absent_is_quiet() {
        let store = MemoryStore::new();
        store.insert_record(&View::new("loop")).await.unwrap();

        let removed: Option<View> = store.remove_record("loop").await.unwrap();
        assert_eq!(removed.unwrap().name, "loop");

        let again: Option<View> = store.remove_record("loop").await.unwrap();
        assert!(again.is_none());
        assert!(store.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn one_insert_per_key_and_first_body_wins(
            names in proptest::collection::vec("[a-z]{1,6}", 1..24),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = MemoryStore::new();

            let mut first: std::collections::BTreeMap<String, usize> = Default::default();
            for (i, name) in names.iter().enumerate() {
                let location = Location::new(name.clone()).with_monitor(format!("m{i}"));
                let result = rt.block_on(store.insert_record(&location)).unwrap();

                let fresh = !first.contains_key(name);
                proptest::prop_assert_eq!(result == InsertResult::Inserted, fresh);
                first.entry(name.clone()).or_insert(i);
            }

            for (name, i) in &first {
                let stored: Location = rt.block_on(store.get_record(name)).unwrap().unwrap();
                proptest::prop_assert_eq!(stored.monitors, vec![format!("m{i}")]);
            }

            let listed: Vec<String> = rt
                .block_on(store.list_records::<Location>())
                .unwrap()
                .into_iter()
                .map(|l| l.name)
                .collect();
            let expected: Vec<String> = first.keys().cloned().collect();
            proptest::prop_assert_eq!(listed, expected);
        }
    }
}
