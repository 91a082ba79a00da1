#![forbid(unsafe_code)]

//! The record store contract.
//!
//! A [`RecordStore`] owns records and their change notifications. The
//! binding controller only calls the three operations below; storage,
//! querying and concurrency control are the store's business.
//!
//! # Contract
//!
//! 1. `fetch_one` completes `done` exactly once, either before it returns
//!    or later from the store's own event loop.
//! 2. A subscription callback receives every write to its key, including
//!    writes that leave the data unchanged.
//! 3. After `unsubscribe(handle)` returns, the callback registered under
//!    `handle` is never invoked again.
//! 4. Unsubscribing an unknown or already released handle is a no-op.

use std::rc::Rc;

use recbind_core::{LookupKey, Record};

/// Failures reported by a record store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the key.
    #[error("no record for key `{key}`")]
    NotFound { key: LookupKey },
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),
}

/// Identifies one open subscription within a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wrap a store-assigned id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Outcome of a fetch.
pub type FetchResult = Result<Record, StoreError>;

/// Completion callback for [`RecordStore::fetch_one`].
pub type FetchCallback = Box<dyn FnOnce(FetchResult)>;

/// Change callback for [`RecordStore::subscribe`]: the record as written, or
/// the failure the store hit while delivering it.
pub type ChangeCallback = Rc<dyn Fn(Result<&Record, &StoreError>)>;

/// Keyed record repository with change notification.
pub trait RecordStore {
    /// Fetch the current record for `key` and hand it to `done`.
    fn fetch_one(&self, key: &LookupKey, done: FetchCallback);

    /// Register `on_change` for every later write to `key`.
    fn subscribe(
        &self,
        key: &LookupKey,
        on_change: ChangeCallback,
    ) -> Result<SubscriptionHandle, StoreError>;

    /// Release a subscription.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

impl<S: RecordStore + ?Sized> RecordStore for Rc<S> {
    fn fetch_one(&self, key: &LookupKey, done: FetchCallback) {
        (**self).fetch_one(key, done);
    }

    fn subscribe(
        &self,
        key: &LookupKey,
        on_change: ChangeCallback,
    ) -> Result<SubscriptionHandle, StoreError> {
        (**self).subscribe(key, on_change)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        (**self).unsubscribe(handle);
    }
}
