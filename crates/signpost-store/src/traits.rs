//! Store trait: the abstract interface for record persistence.
//!
//! [`Store`] works on encoded bodies so it stays object safe. [`StoreExt`]
//! layers typed access over it for anything implementing
//! [`Record`](signpost_core::Record).

use std::future::Future;

use async_trait::async_trait;
use signpost_core::{CoreError, Record, ResourceClass};

use crate::error::{Result, StoreError};

/// Result of inserting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The record was written.
    Inserted,
    /// A record with the same natural key already exists. Nothing was written.
    Duplicate,
}

/// A read-modify-write step applied to an encoded body while the store holds
/// the record exclusively.
pub type Mutation = Box<dyn FnOnce(Vec<u8>) -> Result<Vec<u8>> + Send>;

/// The Store trait: async interface for record persistence.
///
/// Every record is addressed by its [`ResourceClass`] and natural key, and
/// storage guarantees at most one record per pair. All other consistency is
/// left to callers.
///
/// # Design Notes
///
/// - **Unique inserts**: a second insert under the same key returns
///   [`InsertResult::Duplicate`] and leaves the first record untouched.
/// - **Atomic updates**: `update` applies the mutation with no interleaving
///   writer on the same record.
/// - **Quiet removal**: removing an absent key returns `None`, not an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new record body under `key`.
    async fn insert(&self, class: ResourceClass, key: &str, body: &[u8]) -> Result<InsertResult>;

    /// Fetch a record body.
    async fn get(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>>;

    /// All record bodies of a class, ordered by key.
    async fn list(&self, class: ResourceClass) -> Result<Vec<Vec<u8>>>;

    /// Replace a record body with the output of `mutation`.
    ///
    /// Returns the stored body, or `None` if no record exists under `key`.
    async fn update(
        &self,
        class: ResourceClass,
        key: &str,
        mutation: Mutation,
    ) -> Result<Option<Vec<u8>>>;

    /// Delete a record, returning the body it held.
    async fn remove(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Typed access to a [`Store`].
pub trait StoreExt: Store {
    /// Encode and insert a record under its natural key.
    fn insert_record<R: Record>(
        &self,
        record: &R,
    ) -> impl Future<Output = Result<InsertResult>> + Send;

    /// Fetch and decode a record.
    fn get_record<R: Record>(&self, key: &str) -> impl Future<Output = Result<Option<R>>> + Send;

    /// Fetch and decode every record of a class.
    fn list_records<R: Record>(&self) -> impl Future<Output = Result<Vec<R>>> + Send;

    /// Atomically decode, edit and re-encode a record.
    ///
    /// `edit` may reject the result by returning an error, in which case
    /// nothing is written. Changing the natural key is rejected with
    /// [`StoreError::KeyChanged`].
    fn update_record<R, F>(
        &self,
        key: &str,
        edit: F,
    ) -> impl Future<Output = Result<Option<R>>> + Send
    where
        R: Record,
        F: FnOnce(&mut R) -> std::result::Result<(), CoreError> + Send + 'static;

    /// Delete a record and decode what it held.
    fn remove_record<R: Record>(&self, key: &str)
        -> impl Future<Output = Result<Option<R>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn insert_record<R: Record>(&self, record: &R) -> Result<InsertResult> {
        let body = record.to_bytes()?;
        self.insert(R::CLASS, record.key(), &body).await
    }

    async fn get_record<R: Record>(&self, key: &str) -> Result<Option<R>> {
        match self.get(R::CLASS, key).await? {
            Some(body) => Ok(Some(R::from_bytes(&body)?)),
            None => Ok(None),
        }
    }

    async fn list_records<R: Record>(&self) -> Result<Vec<R>> {
        self.list(R::CLASS)
            .await?
            .iter()
            .map(|body| R::from_bytes(body).map_err(StoreError::from))
            .collect()
    }

    async fn update_record<R, F>(&self, key: &str, edit: F) -> Result<Option<R>>
    where
        R: Record,
        F: FnOnce(&mut R) -> std::result::Result<(), CoreError> + Send + 'static,
    {
        let expected = key.to_string();
        let mutation: Mutation = Box::new(move |body| {
            let mut record = R::from_bytes(&body)?;
            edit(&mut record)?;
            if record.key() != expected {
                return Err(StoreError::KeyChanged {
                    class: R::CLASS,
                    from: expected,
                    to: record.key().to_string(),
                });
            }
            Ok(record.to_bytes()?)
        });

        match self.update(R::CLASS, key, mutation).await? {
            Some(body) => Ok(Some(R::from_bytes(&body)?)),
            None => Ok(None),
        }
    }

    async fn remove_record<R: Record>(&self, key: &str) -> Result<Option<R>> {
        match self.remove(R::CLASS, key).await? {
            Some(body) => Ok(Some(R::from_bytes(&body)?)),
            None => Ok(None),
        }
    }
}
