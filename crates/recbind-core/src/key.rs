//! Lookup keys and the key resolver contract.
//!
//! # Invariants
//!
//! 1. **Deterministic**: resolving the same [`RouteParams`] twice yields the
//!    same [`LookupKey`].
//! 2. **Pure**: resolvers read their input and nothing else.
//! 3. **Fails only on absence**: the single failure mode is a required
//!    parameter that is missing or empty ([`MissingContextError`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::KeyConfig;
use crate::route::RouteParams;

/// Opaque identifier of exactly one record in a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(String);

impl LookupKey {
    /// Wrap an already-derived key string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LookupKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LookupKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A required route parameter was absent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("missing route parameter `{field}`")]
pub struct MissingContextError {
    /// Name of the absent parameter.
    pub field: String,
}

impl MissingContextError {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Maps navigation context to a store lookup key.
///
/// Any `Fn(&RouteParams) -> Result<LookupKey, MissingContextError>` is a
/// resolver, so ad-hoc key schemes do not need a named type.
pub trait KeyResolver {
    /// Derive the lookup key for `params`.
    fn resolve(&self, params: &RouteParams) -> Result<LookupKey, MissingContextError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&RouteParams) -> Result<LookupKey, MissingContextError>,
{
    fn resolve(&self, params: &RouteParams) -> Result<LookupKey, MissingContextError> {
        self(params)
    }
}

/// Joins a fixed list of route parameters into one key.
///
/// ```
/// use recbind_core::{CompositeKeyResolver, KeyResolver, RouteParams};
///
/// let resolver = CompositeKeyResolver::package();
/// let params = RouteParams::new().with("name", "lodash").with("version", "4.17.0");
/// assert_eq!(resolver.resolve(&params).unwrap().as_str(), "lodash/4.17.0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeKeyResolver {
    fields: Vec<String>,
    separator: String,
}

impl CompositeKeyResolver {
    /// Resolver joining `fields` (in the given order) with `separator`.
    #[must_use]
    pub fn new<I, S>(fields: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            separator: separator.into(),
        }
    }

    /// The package key scheme: `name/version`.
    #[must_use]
    pub fn package() -> Self {
        Self::from_config(&KeyConfig::default())
    }

    /// Build a resolver from the `[key]` configuration section.
    #[must_use]
    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(config.fields.iter().cloned(), config.separator.clone())
    }

    /// The parameter names this resolver reads, in key order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Default for CompositeKeyResolver {
    fn default() -> Self {
        Self::package()
    }
}

impl KeyResolver for CompositeKeyResolver {
    fn resolve(&self, params: &RouteParams) -> Result<LookupKey, MissingContextError> {
        let mut key = String::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let value = params
                .get(field)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MissingContextError::new(field.as_str()))?;
            if idx > 0 {
                key.push_str(&self.separator);
            }
            key.push_str(value);
        }
        Ok(LookupKey(key))
    }
}
