#![forbid(unsafe_code)]

//! Live binding between one record and a view.
//!
//! A [`BindingController`] resolves a [`LookupKey`] from navigation context,
//! fetches the matching record, subscribes to its changes and republishes
//! every change through an [`Observable`] the view subscribes to. It is owned
//! by the view and driven from the view's mount/unmount hooks.
//!
//! # State Machine
//!
//! ```text
//!            activate()             fetch + subscribe ok
//! Inactive ─────────────► Activating ───────────────────► Bound
//!    ▲                        │                              │
//!    │      failure           │                              │
//!    ├────────────────────────┘                              │
//!    │                     deactivate()                      │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one store subscription is open per controller. A new one is
//!    only requested after the previous one was released.
//! 2. Store notifications only reach the held record while `Bound`.
//! 3. Every activation carries a generation token; `deactivate()` bumps the
//!    generation, so a fetch completing afterwards is discarded.
//! 4. Duplicate notifications with identical data do not re-render (the
//!    record observable ignores equal values).
//!
//! # Failure Modes
//!
//! | Failure | Phase afterwards | Surfaced as |
//! |---------|------------------|-------------|
//! | Route parameter absent | `Inactive` | `Err(BindError::MissingContext)` |
//! | No record for key | `Inactive` | `Err(BindError::NotFound)` |
//! | Fetch/subscribe fails | `Inactive` | `Err(BindError::Store)` |
//! | Notification failure | `Bound` | error observable, `warn!` log |
//!
//! Failures of a deferred fetch happen after `activate()` returned
//! [`Activation::Pending`]; they are published on the phase and error
//! observables instead.

use std::cell::RefCell;
use std::rc::Rc;

use recbind_core::{
    BindingPolicy, KeyResolver, LookupKey, MissingContextError, Record, RouteParams,
};

use crate::reactive::{Observable, Subscription};
use crate::route_context::RouteContext;
use crate::store::{ChangeCallback, FetchResult, RecordStore, StoreError, SubscriptionHandle};

/// Lifecycle phase of a [`BindingController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindPhase {
    /// No subscription; nothing in flight.
    #[default]
    Inactive,
    /// Fetch requested, not yet subscribed.
    Activating,
    /// Subscribed; the held record tracks the store.
    Bound,
}

/// What [`BindingController::activate`] achieved by the time it returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Fetched and subscribed.
    Bound,
    /// The store will complete the fetch later.
    Pending,
    /// The controller was deactivated while the fetch was completing.
    Cancelled,
}

/// Errors from binding a record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The route lacks a parameter the key needs.
    #[error(transparent)]
    MissingContext(#[from] MissingContextError),
    /// No record matches the resolved key.
    #[error("no record found for key `{key}`")]
    NotFound { key: LookupKey },
    /// The store failed.
    #[error("record store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for BindError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => Self::NotFound { key },
            other => Self::Store(other),
        }
    }
}

/// Read access to the navigation context a key is resolved from.
pub trait ContextSource {
    /// Parameters of the current route.
    fn route_params(&self) -> RouteParams;
}

impl<F: Fn() -> RouteParams> ContextSource for F {
    fn route_params(&self) -> RouteParams {
        self()
    }
}

impl ContextSource for RouteParams {
    fn route_params(&self) -> RouteParams {
        self.clone()
    }
}

#[derive(Default)]
struct ControllerState {
    generation: u64,
    /// Set by `activate`, cleared by `deactivate`: the view wants a binding.
    engaged: bool,
    key: Option<LookupKey>,
    handle: Option<SubscriptionHandle>,
    /// Failure of the activation currently returning from `activate`.
    failure: Option<BindError>,
}

struct Inner<S> {
    store: S,
    resolver: Box<dyn KeyResolver>,
    context: Box<dyn ContextSource>,
    policy: BindingPolicy,
    state: RefCell<ControllerState>,
    record: Observable<Option<Record>>,
    phase: Observable<BindPhase>,
    error: Observable<Option<BindError>>,
}

/// Manages one live binding between a lookup key and a record store.
///
/// Dropping the controller deactivates it.
///
/// # Example
///
/// ```
/// use recbind_core::{CompositeKeyResolver, Record, Attributes, RouteParams};
/// use recbind_runtime::{BindingController, BindPhase, MemoryStore};
///
/// let store = MemoryStore::from_records([
///     Record::new("lodash/4.17.0", Attributes::new()).with("description", "utilities"),
/// ]);
/// let route = RouteParams::new().with("name", "lodash").with("version", "4.17.0");
/// let controller = BindingController::new(store.clone(), CompositeKeyResolver::package(), route);
///
/// controller.activate().unwrap();
/// assert_eq!(controller.phase(), BindPhase::Bound);
/// assert_eq!(store.subscriber_count(), 1);
///
/// controller.deactivate();
/// assert_eq!(store.subscriber_count(), 0);
/// ```
pub struct BindingController<S: RecordStore + 'static> {
    inner: Rc<Inner<S>>,
}

impl<S: RecordStore + 'static> BindingController<S> {
    /// Controller with the default binding policy.
    pub fn new(
        store: S,
        resolver: impl KeyResolver + 'static,
        context: impl ContextSource + 'static,
    ) -> Self {
        Self::with_policy(store, resolver, context, BindingPolicy::default())
    }

    /// Controller with an explicit binding policy.
    pub fn with_policy(
        store: S,
        resolver: impl KeyResolver + 'static,
        context: impl ContextSource + 'static,
        policy: BindingPolicy,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                store,
                resolver: Box::new(resolver),
                context: Box::new(context),
                policy,
                state: RefCell::new(ControllerState::default()),
                record: Observable::new(None),
                phase: Observable::new(BindPhase::Inactive),
                error: Observable::new(None),
            }),
        }
    }

    /// Resolve the key from the current context, fetch the record and
    /// subscribe to it.
    ///
    /// Any existing binding is released first, so calling this while bound
    /// is a rebind.
    pub fn activate(&self) -> Result<Activation, BindError> {
        self.inner.activate()
    }

    /// Rebind only if the context now resolves to a different key (or the
    /// controller is not bound). A no-op while bound to the current key.
    pub fn sync(&self) -> Result<Activation, BindError> {
        self.inner.sync()
    }

    /// Release the subscription. Safe to call in any phase, any number of
    /// times. No store notification affects the controller once this returns.
    pub fn deactivate(&self) {
        self.inner.deactivate();
    }

    /// Rebind whenever `route` navigates while the controller is engaged.
    ///
    /// Honors [`BindingPolicy::rebind_on_route_change`]. Drop the returned
    /// guard to stop following.
    pub fn follow(&self, route: &RouteContext) -> Subscription {
        let weak = Rc::downgrade(&self.inner);
        route.subscribe(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.policy.rebind_on_route_change || !inner.state.borrow().engaged {
                return;
            }
            if let Err(err) = inner.sync() {
                tracing::warn!(error = %err, "rebind after navigation failed");
            }
        })
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> BindPhase {
        self.inner.phase.get()
    }

    /// Whether the controller is subscribed.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.phase() == BindPhase::Bound
    }

    /// Clone of the held record.
    #[must_use]
    pub fn record(&self) -> Option<Record> {
        self.inner.record.get()
    }

    /// Borrow the held record without cloning.
    pub fn with_record<R>(&self, f: impl FnOnce(Option<&Record>) -> R) -> R {
        self.inner.record.with(|r| f(r.as_ref()))
    }

    /// Key of the current (or in-flight) binding.
    #[must_use]
    pub fn key(&self) -> Option<LookupKey> {
        self.inner.state.borrow().key.clone()
    }

    /// Most recent failure, cleared when an activation starts.
    #[must_use]
    pub fn last_error(&self) -> Option<BindError> {
        self.inner.error.get()
    }

    /// Number of times the held record changed.
    #[must_use]
    pub fn record_version(&self) -> u64 {
        self.inner.record.version()
    }

    /// Re-render trigger: `callback` runs once per change of the held record.
    pub fn subscribe(&self, callback: impl Fn(Option<&Record>) + 'static) -> Subscription {
        self.inner.record.subscribe(move |r| callback(r.as_ref()))
    }

    /// Subscribe to phase transitions.
    pub fn subscribe_phase(&self, callback: impl Fn(&BindPhase) + 'static) -> Subscription {
        self.inner.phase.subscribe(callback)
    }

    /// Subscribe to failures (and their clearing).
    pub fn subscribe_errors(
        &self,
        callback: impl Fn(Option<&BindError>) + 'static,
    ) -> Subscription {
        self.inner.error.subscribe(move |e| callback(e.as_ref()))
    }
}

impl<S: RecordStore + 'static> Drop for BindingController<S> {
    fn drop(&mut self) {
        self.inner.deactivate();
    }
}

impl<S: RecordStore + 'static> std::fmt::Debug for BindingController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("BindingController")
            .field("phase", &self.inner.phase.get())
            .field("key", &state.key)
            .field("generation", &state.generation)
            .field("subscribed", &state.handle.is_some())
            .finish()
    }
}

impl<S: RecordStore + 'static> Inner<S> {
    fn activate(self: &Rc<Self>) -> Result<Activation, BindError> {
        self.release(true);
        self.state.borrow_mut().engaged = true;
        let params = self.context.route_params();
        match self.resolver.resolve(&params) {
            Ok(key) => self.bind(key),
            Err(missing) => {
                let err = BindError::from(missing);
                tracing::warn!(error = %err, "cannot resolve lookup key");
                self.error.set(Some(err.clone()));
                Err(err)
            }
        }
    }

    fn sync(self: &Rc<Self>) -> Result<Activation, BindError> {
        if let Ok(key) = self.resolver.resolve(&self.context.route_params()) {
            let same_key = self.state.borrow().key.as_ref() == Some(&key);
            if same_key {
                match self.phase.get() {
                    BindPhase::Bound => return Ok(Activation::Bound),
                    BindPhase::Activating => return Ok(Activation::Pending),
                    BindPhase::Inactive => {}
                }
            }
        }
        self.activate()
    }

    fn deactivate(&self) {
        self.state.borrow_mut().engaged = false;
        self.release(self.policy.clear_on_deactivate);
    }

    fn bind(self: &Rc<Self>, key: LookupKey) -> Result<Activation, BindError> {
        let token = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.key = Some(key.clone());
            state.failure = None;
            state.generation
        };
        let _span = tracing::debug_span!("activate", key = %key, generation = token).entered();
        self.error.set(None);
        self.phase.set(BindPhase::Activating);

        let weak = Rc::downgrade(self);
        self.store.fetch_one(
            &key,
            Box::new(move |result: FetchResult| {
                if let Some(inner) = weak.upgrade() {
                    inner.complete_fetch(token, result);
                }
            }),
        );

        let mut state = self.state.borrow_mut();
        if state.generation != token {
            return Ok(Activation::Cancelled);
        }
        match self.phase.get() {
            BindPhase::Bound => Ok(Activation::Bound),
            BindPhase::Activating => Ok(Activation::Pending),
            BindPhase::Inactive => match state.failure.take() {
                Some(err) => Err(err),
                None => Ok(Activation::Cancelled),
            },
        }
    }

    fn complete_fetch(self: &Rc<Self>, token: u64, result: FetchResult) {
        if !self.is_current(token, BindPhase::Activating) {
            tracing::debug!(generation = token, "discarding stale fetch completion");
            return;
        }
        let record = match result {
            Ok(record) => record,
            Err(err) => return self.fail(token, err.into()),
        };
        let Some(key) = self.state.borrow().key.clone() else {
            return;
        };

        let weak = Rc::downgrade(self);
        let on_change: ChangeCallback =
            Rc::new(move |notification: Result<&Record, &StoreError>| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_change(token, notification);
                }
            });
        let handle = match self.store.subscribe(&key, on_change) {
            Ok(handle) => handle,
            Err(err) => return self.fail(token, err.into()),
        };

        {
            let mut state = self.state.borrow_mut();
            if state.generation != token {
                drop(state);
                self.store.unsubscribe(handle);
                return;
            }
            state.handle = Some(handle);
        }
        tracing::debug!(key = %key, handle = handle.id(), "bound");
        self.phase.set(BindPhase::Bound);
        // A phase observer may have torn the binding down.
        if !self.is_current(token, BindPhase::Bound) {
            tracing::debug!(generation = token, "binding released by phase observer");
            return;
        }
        self.record.set(Some(record));
    }

    fn on_change(&self, token: u64, notification: Result<&Record, &StoreError>) {
        if !self.is_current(token, BindPhase::Bound) {
            tracing::debug!(generation = token, "dropping notification for released binding");
            return;
        }
        match notification {
            Ok(record) => {
                if self.record.set(Some(record.clone())) {
                    tracing::trace!(key = %record.key(), "record changed");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "store notification failed");
                let err = BindError::from(err.clone());
                if matches!(err, BindError::NotFound { .. }) {
                    self.record.set(None);
                }
                self.error.set(Some(err));
            }
        }
    }

    fn fail(&self, token: u64, err: BindError) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != token {
                return;
            }
            state.key = None;
            state.failure = Some(err.clone());
        }
        tracing::warn!(error = %err, "activation failed");
        self.phase.set(BindPhase::Inactive);
        self.error.set(Some(err));
    }

    /// Invalidate in-flight work and release the subscription.
    fn release(&self, clear_record: bool) {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.key = None;
            state.handle.take()
        };
        if let Some(handle) = handle {
            self.store.unsubscribe(handle);
            tracing::debug!(handle = handle.id(), "released subscription");
        }
        self.phase.set(BindPhase::Inactive);
        if clear_record {
            self.record.set(None);
        }
    }

    fn is_current(&self, token: u64, phase: BindPhase) -> bool {
        self.state.borrow().generation == token && self.phase.get() == phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::{FetchMode, MemoryStore};
    use recbind_core::{Attributes, CompositeKeyResolver};
    use std::cell::Cell;
    use tracing_test::traced_test;

    fn lodash_route() -> RouteParams {
        RouteParams::new()
            .with("name", "lodash")
            .with("version", "4.17.0")
    }

    fn lodash() -> Record {
        Record::new("lodash/4.17.0", Attributes::new())
            .with("description", "Lodash modular utilities.")
    }

    fn controller(store: &MemoryStore, route: RouteParams) -> BindingController<MemoryStore> {
        BindingController::new(store.clone(), CompositeKeyResolver::package(), route)
    }

    #[test]
    fn activate_binds_existing_record() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        assert_eq!(ctl.phase(), BindPhase::Inactive);

        assert_eq!(ctl.activate(), Ok(Activation::Bound));
        assert!(ctl.is_bound());
        assert_eq!(ctl.record(), Some(lodash()));
        assert_eq!(ctl.key(), Some(LookupKey::from("lodash/4.17.0")));
        assert_eq!(store.subscriber_count_for(&"lodash/4.17.0".into()), 1);
    }

    #[test]
    fn missing_record_is_not_found_and_inactive() {
        let store = MemoryStore::new();
        let ctl = controller(&store, lodash_route());
        let err = ctl.activate().unwrap_err();
        assert_eq!(
            err,
            BindError::NotFound {
                key: "lodash/4.17.0".into()
            }
        );
        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert_eq!(ctl.last_error(), Some(err));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn missing_param_is_missing_context() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, RouteParams::new().with("name", "lodash"));
        let err = ctl.activate().unwrap_err();
        assert_eq!(err, BindError::MissingContext(MissingContextError::new("version")));
        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn store_fetch_failure_propagates_as_is() {
        let store = MemoryStore::from_records([lodash()]);
        store.fail_next_fetch(StoreError::Unavailable("connection reset".into()));
        let ctl = controller(&store, lodash_route());
        assert_eq!(
            ctl.activate(),
            Err(BindError::Store(StoreError::Unavailable(
                "connection reset".into()
            )))
        );
        assert_eq!(ctl.phase(), BindPhase::Inactive);
    }

    #[test]
    fn subscribe_failure_leaves_nothing_registered() {
        let store = MemoryStore::from_records([lodash()]);
        store.fail_next_subscribe(StoreError::Rejected("too many watchers".into()));
        let ctl = controller(&store, lodash_route());
        assert!(matches!(ctl.activate(), Err(BindError::Store(_))));
        assert_eq!(ctl.record(), None);
        assert_eq!(store.subscriber_count(), 0);
        // Recovers on the next attempt.
        assert_eq!(ctl.activate(), Ok(Activation::Bound));
    }

    #[test]
    fn changes_rerender_and_duplicates_do_not() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        let renders = Rc::new(Cell::new(0u32));
        let r = Rc::clone(&renders);
        let _sub = ctl.subscribe(move |_| r.set(r.get() + 1));

        ctl.activate().unwrap();
        assert_eq!(renders.get(), 1);

        store.update(&"lodash/4.17.0".into(), |rec| rec.set("license", "MIT"));
        assert_eq!(renders.get(), 2);
        assert_eq!(
            ctl.with_record(|r| r.and_then(|r| r.get_str("license")).map(str::to_owned)),
            Some("MIT".to_owned())
        );

        let same = store.get(&"lodash/4.17.0".into()).unwrap();
        store.insert(same.clone());
        store.insert(same);
        assert_eq!(renders.get(), 2, "identical data must not re-render");
    }

    #[test]
    fn deactivate_is_idempotent_and_silences_store() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        ctl.activate().unwrap();
        ctl.deactivate();
        ctl.deactivate();
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert_eq!(ctl.record(), None);

        let version = ctl.record_version();
        store.update(&"lodash/4.17.0".into(), |rec| rec.set("description", "changed"));
        assert_eq!(ctl.record_version(), version);
        assert_eq!(ctl.record(), None);
    }

    #[test]
    fn deactivate_can_keep_last_record() {
        let store = MemoryStore::from_records([lodash()]);
        let policy = BindingPolicy {
            clear_on_deactivate: false,
            ..BindingPolicy::default()
        };
        let ctl = BindingController::with_policy(
            store.clone(),
            CompositeKeyResolver::package(),
            lodash_route(),
            policy,
        );
        ctl.activate().unwrap();
        ctl.deactivate();
        assert_eq!(ctl.record(), Some(lodash()));
        store.update(&"lodash/4.17.0".into(), |rec| rec.set("description", "changed"));
        assert_eq!(ctl.record(), Some(lodash()), "frozen after deactivate");
    }

    #[test]
    fn deferred_fetch_reports_pending_then_binds() {
        let store = MemoryStore::with_mode(FetchMode::Deferred);
        store.insert(lodash());
        let ctl = controller(&store, lodash_route());

        assert_eq!(ctl.activate(), Ok(Activation::Pending));
        assert_eq!(ctl.phase(), BindPhase::Activating);
        assert_eq!(ctl.record(), None);

        store.run_pending();
        assert_eq!(ctl.phase(), BindPhase::Bound);
        assert_eq!(ctl.record(), Some(lodash()));
    }

    #[test]
    fn deferred_not_found_is_published() {
        let store = MemoryStore::with_mode(FetchMode::Deferred);
        let ctl = controller(&store, lodash_route());
        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&errors);
        let _sub = ctl.subscribe_errors(move |err| e.borrow_mut().push(err.cloned()));

        assert_eq!(ctl.activate(), Ok(Activation::Pending));
        store.run_pending();
        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert!(matches!(
            errors.borrow().last(),
            Some(Some(BindError::NotFound { .. }))
        ));
    }

    #[traced_test]
    #[test]
    fn fetch_completing_after_deactivate_is_discarded() {
        let store = MemoryStore::with_mode(FetchMode::Deferred);
        store.insert(lodash());
        let ctl = controller(&store, lodash_route());

        ctl.activate().unwrap();
        ctl.deactivate();
        store.run_pending();

        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert_eq!(ctl.record(), None);
        assert_eq!(store.subscriber_count(), 0);
        assert!(logs_contain("discarding stale fetch completion"));
    }

    #[test]
    fn notifications_during_activating_are_ignored() {
        let store = MemoryStore::with_mode(FetchMode::Deferred);
        store.insert(lodash());
        let ctl = controller(&store, lodash_route());
        ctl.activate().unwrap();

        store.update(&"lodash/4.17.0".into(), |rec| rec.set("license", "MIT"));
        assert_eq!(ctl.record(), None);

        store.run_pending();
        assert_eq!(
            ctl.record().and_then(|r| r.get_str("license").map(str::to_owned)),
            Some("MIT".to_owned()),
            "the fetch reads the latest data"
        );
    }

    #[test]
    fn notification_error_keeps_binding() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        ctl.activate().unwrap();

        store.notify_error(
            &"lodash/4.17.0".into(),
            StoreError::Unavailable("stream dropped".into()),
        );
        assert!(ctl.is_bound());
        assert_eq!(ctl.record(), Some(lodash()));
        assert!(matches!(ctl.last_error(), Some(BindError::Store(_))));
    }

    #[test]
    fn removed_record_clears_held_value() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        ctl.activate().unwrap();
        store.remove(&"lodash/4.17.0".into());
        assert_eq!(ctl.record(), None);
        assert!(matches!(ctl.last_error(), Some(BindError::NotFound { .. })));
    }

    #[test]
    fn sync_is_noop_for_same_key() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        ctl.activate().unwrap();
        let version = ctl.record_version();
        assert_eq!(ctl.sync(), Ok(Activation::Bound));
        assert_eq!(ctl.record_version(), version);
        assert_eq!(store.peak_subscriber_count(), 1);
    }

    #[test]
    fn drop_deactivates() {
        let store = MemoryStore::from_records([lodash()]);
        {
            let ctl = controller(&store, lodash_route());
            ctl.activate().unwrap();
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn phase_transitions_are_observable() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = controller(&store, lodash_route());
        let phases = Rc::new(RefCell::new(Vec::new()));
        let p = Rc::clone(&phases);
        let _sub = ctl.subscribe_phase(move |phase| p.borrow_mut().push(*phase));

        ctl.activate().unwrap();
        ctl.deactivate();
        assert_eq!(
            *phases.borrow(),
            [BindPhase::Activating, BindPhase::Bound, BindPhase::Inactive]
        );
    }

    #[test]
    fn deactivate_from_phase_observer_cancels_activation() {
        let store = MemoryStore::from_records([lodash()]);
        let ctl = Rc::new(controller(&store, lodash_route()));
        let weak = Rc::downgrade(&ctl);
        let _sub = ctl.subscribe_phase(move |phase| {
            if *phase == BindPhase::Bound {
                if let Some(ctl) = weak.upgrade() {
                    ctl.deactivate();
                }
            }
        });

        assert_eq!(ctl.activate(), Ok(Activation::Cancelled));
        assert_eq!(ctl.phase(), BindPhase::Inactive);
        assert_eq!(ctl.record(), None);
        assert_eq!(store.subscriber_count(), 0);

        store.update(&"lodash/4.17.0".into(), |rec| rec.set("license", "MIT"));
        assert_eq!(ctl.record(), None);
    }

    #[test]
    fn closure_context_is_read_at_activation() {
        let store = MemoryStore::from_records([
            lodash(),
            Record::new("lodash/4.17.21", Attributes::new()),
        ]);
        let version = Rc::new(RefCell::new(String::from("4.17.0")));
        let v = Rc::clone(&version);
        let ctl = BindingController::new(
            store.clone(),
            CompositeKeyResolver::package(),
            move || {
                RouteParams::new()
                    .with("name", "lodash")
                    .with("version", v.borrow().clone())
            },
        );
        ctl.activate().unwrap();
        *version.borrow_mut() = "4.17.21".into();
        assert_eq!(ctl.sync(), Ok(Activation::Bound));
        assert_eq!(ctl.key(), Some(LookupKey::from("lodash/4.17.21")));
        assert_eq!(store.subscriber_count(), 1);
    }
}
