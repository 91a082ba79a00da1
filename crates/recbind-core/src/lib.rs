#![forbid(unsafe_code)]

//! Core data types for recbind.
//!
//! This crate provides:
//! - [`LookupKey`] and the [`KeyResolver`] contract for deriving store keys
//!   from navigation context
//! - [`RouteParams`] and [`RouteDescriptor`] for reading and building routes
//! - [`Record`], the keyed attribute map a store hands out
//! - [`BindConfig`] for key and binding policy

pub mod config;
pub mod key;
pub mod record;
pub mod route;

pub use config::{BindConfig, BindingPolicy, ConfigError, KeyConfig};
pub use key::{CompositeKeyResolver, KeyResolver, LookupKey, MissingContextError};
pub use record::{Attributes, Record, RecordError};
pub use route::{RouteDescriptor, RouteParams};
