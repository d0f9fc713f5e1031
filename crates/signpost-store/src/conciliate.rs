//! Create-or-reconcile on a uniqueness conflict.
//!
//! Concurrent creators of the same natural key race on the store's unique
//! insert. Exactly one wins; every loser re-reads the winner's record and
//! hands it back instead of failing.

use signpost_core::Record;

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store, StoreExt};

/// Outcome of [`create_or_reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<R> {
    /// The stored record: the caller's own on creation, the existing one otherwise.
    pub record: R,
    /// Whether this call wrote the record.
    pub was_created: bool,
}

impl<R> Reconciled<R> {
    pub fn created(record: R) -> Self {
        Self {
            record,
            was_created: true,
        }
    }

    pub fn existing(record: R) -> Self {
        Self {
            record,
            was_created: false,
        }
    }
}

/// Insert `record`, or return the record already stored under its key.
///
/// Errors other than the uniqueness conflict propagate unchanged. If the
/// conflicting record is gone by the time it is re-read, the call fails with
/// [`StoreError::Vanished`] rather than retrying.
pub async fn create_or_reconcile<S, R>(store: &S, record: R) -> Result<Reconciled<R>>
where
    S: Store + ?Sized,
    R: Record,
{
    match store.insert_record(&record).await? {
        InsertResult::Inserted => Ok(Reconciled::created(record)),
        InsertResult::Duplicate => {
            tracing::debug!(class = %R::CLASS, key = record.key(), "reconciling with existing record");
            match store.get_record::<R>(record.key()).await? {
                Some(existing) => Ok(Reconciled::existing(existing)),
                None => Err(StoreError::Vanished {
                    class: R::CLASS,
                    key: record.key().to_string(),
                }),
            }
        }
    }
}
