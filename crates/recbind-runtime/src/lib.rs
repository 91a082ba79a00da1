#![forbid(unsafe_code)]

//! Single-record binding runtime for recbind.
//!
//! - [`BindingController`]: resolves a key, fetches and subscribes to one
//!   record, republishes its changes, and tears down on deactivate.
//! - [`RecordStore`]: the store contract the controller drives, with
//!   [`MemoryStore`] as the in-memory implementation.
//! - [`RouteContext`]: observable route parameters used as the controller's
//!   context source.
//! - [`reactive`]: the observable/subscription primitives underneath.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and meant to run on
//! the UI event loop.

pub mod controller;
pub mod memory_store;
pub mod reactive;
pub mod route_context;
pub mod store;

pub use controller::{Activation, BindError, BindPhase, BindingController, ContextSource};
pub use memory_store::{FetchMode, MemoryStore};
pub use reactive::{BindingScope, Observable, Subscription};
pub use route_context::RouteContext;
pub use store::{
    ChangeCallback, FetchCallback, FetchResult, RecordStore, StoreError, SubscriptionHandle,
};
