#![forbid(unsafe_code)]

//! In-memory [`RecordStore`] for tests, demos and embedding.
//!
//! `MemoryStore` is a shared handle: clones see the same records and the
//! same subscribers, the same way [`Observable`](crate::reactive::Observable)
//! handles share state.
//!
//! # Fetch Modes
//!
//! | Mode | `fetch_one` completes | Used for |
//! |------|-----------------------|----------|
//! | [`FetchMode::Immediate`] | before returning | synchronous embedding |
//! | [`FetchMode::Deferred`] | on [`MemoryStore::run_pending`] | simulating async I/O |
//!
//! # Fault Injection
//!
//! `fail_next_fetch`, `fail_next_subscribe` and `notify_error` let tests
//! drive every store failure path of the binding controller.
//!
//! # Re-entrancy
//!
//! No internal borrow is held while callbacks run, so a callback may call
//! back into the store (e.g. unsubscribe itself, or fetch again).

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use recbind_core::{KeyResolver, LookupKey, Record, RecordError};

use crate::store::{
    ChangeCallback, FetchCallback, FetchResult, RecordStore, StoreError, SubscriptionHandle,
};

/// When `fetch_one` delivers its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Complete inside `fetch_one`.
    #[default]
    Immediate,
    /// Queue until [`MemoryStore::run_pending`].
    Deferred,
}

struct Subscriber {
    handle: SubscriptionHandle,
    key: LookupKey,
    callback: ChangeCallback,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<LookupKey, Record>,
    subscribers: Vec<Subscriber>,
    pending: VecDeque<(LookupKey, FetchCallback)>,
    mode: FetchMode,
    next_handle: u64,
    peak_subscribers: usize,
    fail_next_fetch: Option<StoreError>,
    fail_next_subscribe: Option<StoreError>,
}

impl StoreInner {
    fn lookup(&mut self, key: &LookupKey) -> FetchResult {
        if let Some(err) = self.fail_next_fetch.take() {
            return Err(err);
        }
        self.records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    fn callbacks_for(&self, key: &LookupKey) -> Vec<ChangeCallback> {
        self.subscribers
            .iter()
            .filter(|s| &s.key == key)
            .map(|s| Rc::clone(&s.callback))
            .collect()
    }
}

/// Shared in-memory record store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl MemoryStore {
    /// Empty store completing fetches immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with the given fetch mode.
    #[must_use]
    pub fn with_mode(mode: FetchMode) -> Self {
        let store = Self::new();
        store.set_mode(mode);
        store
    }

    /// Store pre-populated with `records`. No notifications are sent.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().records.extend(
            records
                .into_iter()
                .map(|record| (record.key().clone(), record)),
        );
        store
    }

    /// Add every record in a JSON catalog (an array of objects keyed by their
    /// `id` attribute). Returns the number of records loaded.
    pub fn load_catalog_json(
        &self,
        text: &str,
        resolver: &dyn KeyResolver,
    ) -> Result<usize, RecordError> {
        let records = Record::list_from_json_str(text, resolver)?;
        let count = records.len();
        for record in records {
            self.insert(record);
        }
        tracing::debug!(count, "loaded catalog");
        Ok(count)
    }

    /// Switch between immediate and deferred fetch completion.
    pub fn set_mode(&self, mode: FetchMode) {
        self.inner.borrow_mut().mode = mode;
    }

    /// Upsert a record and notify subscribers of its key. Returns the
    /// previous version.
    pub fn insert(&self, record: Record) -> Option<Record> {
        let key = record.key().clone();
        let previous = self
            .inner
            .borrow_mut()
            .records
            .insert(key.clone(), record.clone());
        self.notify(&key, Ok(&record));
        previous
    }

    /// Modify a record in place and notify subscribers. Returns `false` if
    /// no record exists under `key`.
    pub fn update(&self, key: &LookupKey, f: impl FnOnce(&mut Record)) -> bool {
        let updated = {
            let mut inner = self.inner.borrow_mut();
            let Some(record) = inner.records.get_mut(key) else {
                return false;
            };
            f(record);
            record.clone()
        };
        self.notify(key, Ok(&updated));
        true
    }

    /// Delete a record. Subscribers of its key receive
    /// [`StoreError::NotFound`].
    pub fn remove(&self, key: &LookupKey) -> Option<Record> {
        let removed = self.inner.borrow_mut().records.remove(key);
        if removed.is_some() {
            self.notify(key, Err(&StoreError::NotFound { key: key.clone() }));
        }
        removed
    }

    /// Deliver a failure to every subscriber of `key`.
    pub fn notify_error(&self, key: &LookupKey, err: StoreError) {
        self.notify(key, Err(&err));
    }

    /// Current record under `key`.
    #[must_use]
    pub fn get(&self, key: &LookupKey) -> Option<Record> {
        self.inner.borrow().records.get(key).cloned()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().records.is_empty()
    }

    /// Make the next fetch fail with `err`.
    pub fn fail_next_fetch(&self, err: StoreError) {
        self.inner.borrow_mut().fail_next_fetch = Some(err);
    }

    /// Make the next subscribe fail with `err`.
    pub fn fail_next_subscribe(&self, err: StoreError) {
        self.inner.borrow_mut().fail_next_subscribe = Some(err);
    }

    /// Complete every queued fetch in request order. Returns how many ran.
    ///
    /// Fetches queued by the completions themselves also run before this
    /// returns.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let (result, done) = {
                let mut inner = self.inner.borrow_mut();
                let Some((key, done)) = inner.pending.pop_front() else {
                    break;
                };
                (inner.lookup(&key), done)
            };
            done(result);
            ran += 1;
        }
        ran
    }

    /// Number of queued fetches.
    #[must_use]
    pub fn pending_fetches(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Number of open subscriptions on `key`.
    #[must_use]
    pub fn subscriber_count_for(&self, key: &LookupKey) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| &s.key == key)
            .count()
    }

    /// Highest number of simultaneously open subscriptions seen so far.
    #[must_use]
    pub fn peak_subscriber_count(&self) -> usize {
        self.inner.borrow().peak_subscribers
    }

    fn notify(&self, key: &LookupKey, notification: Result<&Record, &StoreError>) {
        let callbacks = self.inner.borrow().callbacks_for(key);
        if callbacks.is_empty() {
            return;
        }
        tracing::trace!(key = %key, subscribers = callbacks.len(), "notifying");
        for cb in callbacks {
            // A callback may have released a later subscriber; honor that.
            if self.is_live(&cb) {
                cb(notification);
            }
        }
    }

    fn is_live(&self, cb: &ChangeCallback) -> bool {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .any(|s| Rc::ptr_eq(&s.callback, cb))
    }
}

impl RecordStore for MemoryStore {
    fn fetch_one(&self, key: &LookupKey, done: FetchCallback) {
        let result = {
            let mut inner = self.inner.borrow_mut();
            match inner.mode {
                FetchMode::Deferred => {
                    inner.pending.push_back((key.clone(), done));
                    return;
                }
                FetchMode::Immediate => inner.lookup(key),
            }
        };
        done(result);
    }

    fn subscribe(
        &self,
        key: &LookupKey,
        on_change: ChangeCallback,
    ) -> Result<SubscriptionHandle, StoreError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(err) = inner.fail_next_subscribe.take() {
            return Err(err);
        }
        inner.next_handle += 1;
        let handle = SubscriptionHandle::new(inner.next_handle);
        inner.subscribers.push(Subscriber {
            handle,
            key: key.clone(),
            callback: on_change,
        });
        inner.peak_subscribers = inner.peak_subscribers.max(inner.subscribers.len());
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|s| s.handle != handle);
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryStore")
            .field("records", &inner.records.len())
            .field("subscribers", &inner.subscribers.len())
            .field("pending", &inner.pending.len())
            .field("mode", &inner.mode)
            .finish()
    }
}
