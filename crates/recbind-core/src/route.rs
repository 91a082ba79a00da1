//! Route parameters and route descriptors.
//!
//! The routing subsystem itself lives outside this workspace. These types are
//! the data it exchanges with the binding layer: the parameters of the
//! current route, and descriptors naming a route to navigate to.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameters of the current navigation route.
///
/// Ordered by name so that two parameter sets with the same entries compare
/// and print identically regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A navigation target: a named route plus its parameters.
///
/// Building a descriptor has no side effects; the router resolves it into a
/// link when the view renders it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Route name as registered with the router (e.g. `"new-campaign"`).
    pub route: String,
    /// Route parameters.
    pub params: RouteParams,
}

impl RouteDescriptor {
    /// Create a descriptor for `route` with the given parameters.
    #[must_use]
    pub fn new(route: impl Into<String>, params: RouteParams) -> Self {
        Self {
            route: route.into(),
            params,
        }
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route)?;
        let mut first = true;
        for (name, value) in self.params.iter() {
            let sep = if first { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}
