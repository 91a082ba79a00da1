//! Key and binding policy configuration.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! package key scheme with rebind-on-navigate behavior. TOML loading is
//! available with the `policy-config` feature.
//!
//! ```toml
//! [key]
//! fields = ["name", "version"]
//! separator = "/"
//!
//! [binding]
//! clear_on_deactivate = true
//! rebind_on_route_change = true
//! ```

use serde::{Deserialize, Serialize};

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file was not valid TOML for [`BindConfig`].
    #[cfg(feature = "policy-config")]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A key scheme with no fields cannot identify anything.
    #[error("key.fields must name at least one route parameter")]
    EmptyKey,
}

/// `[key]` section: how route parameters become a lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Route parameters joined into the key, in order.
    pub fields: Vec<String>,
    /// Text placed between fields.
    pub separator: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            fields: vec!["name".to_string(), "version".to_string()],
            separator: "/".to_string(),
        }
    }
}

/// `[binding]` section: controller lifecycle policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingPolicy {
    /// Drop the held record when the controller deactivates.
    pub clear_on_deactivate: bool,
    /// Tear down and rebind when the route's key changes while mounted.
    pub rebind_on_route_change: bool,
}

impl Default for BindingPolicy {
    fn default() -> Self {
        Self {
            clear_on_deactivate: true,
            rebind_on_route_change: true,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    pub key: KeyConfig,
    pub binding: BindingPolicy,
}

impl BindConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.fields.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    #[cfg(feature = "policy-config")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            fields = ?config.key.fields,
            "loaded binding config"
        );
        Ok(config)
    }
}
