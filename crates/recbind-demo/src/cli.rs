#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use recbind_core::RouteParams;
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(
    name = "recbind-demo",
    about = "Mount a package detail screen over a JSON catalog and replay live edits"
)]
pub struct Cli {
    /// JSON array of package records, each keyed by its `id` attribute.
    #[arg(long, default_value = "demos/catalog.json")]
    pub catalog: PathBuf,

    /// Package name route parameter.
    #[arg(long)]
    pub name: String,

    /// Package version route parameter.
    #[arg(long)]
    pub version: String,

    /// TOML file with `[key]` and `[binding]` sections.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Live update applied to the bound package after mount (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub sets: Vec<Assignment>,

    /// Route change applied after the updates.
    #[arg(long, value_name = "NAME@VERSION")]
    pub navigate: Option<Target>,
}

impl Cli {
    /// Route parameters of the initial screen.
    pub fn route(&self) -> RouteParams {
        RouteParams::new()
            .with("name", self.name.as_str())
            .with("version", self.version.as_str())
    }
}

/// `field=value` pair. Values that parse as JSON keep their type; anything
/// else is stored as a string.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("empty field name in `{raw}`"));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
        Ok(Self {
            field: field.to_owned(),
            value,
        })
    }
}

/// `name@version` navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub version: String,
}

impl Target {
    pub fn route(&self) -> RouteParams {
        RouteParams::new()
            .with("name", self.name.as_str())
            .with("version", self.version.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.rsplit_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => Ok(Self {
                name: name.to_owned(),
                version: version.to_owned(),
            }),
            _ => Err(format!("expected NAME@VERSION, got `{raw}`")),
        }
    }
}
