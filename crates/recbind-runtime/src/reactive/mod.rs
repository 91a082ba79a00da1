#![forbid(unsafe_code)]

//! Change-tracking primitives used by the binding controller and views.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: collects a view's subscriptions and releases them
//!   together on unmount.
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and cleaned
//! up lazily during notification.

pub mod observable;
pub mod scope;

pub use observable::{Observable, Subscription};
pub use scope::BindingScope;
