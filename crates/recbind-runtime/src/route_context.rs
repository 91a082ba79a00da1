#![forbid(unsafe_code)]

//! Route context provider.
//!
//! The [`RouteContext`] owns the parameters of the current navigation route
//! and publishes changes to them. Navigation is versioned so views can tell
//! whether the route moved since they last looked. It is the usual
//! [`ContextSource`] handed to a binding controller.

use recbind_core::RouteParams;

use crate::controller::ContextSource;
use crate::reactive::{Observable, Subscription};

/// Observable route parameters.
///
/// Clones share state: navigating through one handle is visible through
/// every other.
#[derive(Clone, Debug, Default)]
pub struct RouteContext {
    current: Observable<RouteParams>,
}

impl RouteContext {
    /// Context starting at `params`.
    #[must_use]
    pub fn new(params: RouteParams) -> Self {
        Self {
            current: Observable::new(params),
        }
    }

    /// Replace the current route parameters. Returns `true` if they changed.
    pub fn navigate(&self, params: RouteParams) -> bool {
        let changed = self.current.set(params);
        if changed {
            tracing::debug!(version = self.current.version(), "route changed");
        }
        changed
    }

    /// Set a single parameter, keeping the others.
    pub fn set_param(&self, name: &str, value: &str) -> bool {
        let mut params = self.current.get();
        params.insert(name, value);
        self.navigate(params)
    }

    /// Snapshot of the current parameters.
    #[must_use]
    pub fn params(&self) -> RouteParams {
        self.current.get()
    }

    /// A single current parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.current.with(|p| p.get(name).map(str::to_owned))
    }

    /// Subscribe to route changes.
    pub fn subscribe(&self, callback: impl Fn(&RouteParams) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    /// Navigation counter; bumps once per effective route change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }
}

impl ContextSource for RouteContext {
    fn route_params(&self) -> RouteParams {
        self.params()
    }
}
