#![forbid(unsafe_code)]

//! Package detail sheet.
//!
//! A [`PackageSheet`] is the presentational form of one package record: a
//! heading, the description, a "new campaign" action and an attribute table.
//! Building a sheet is a pure function of the record.

use std::fmt::Write as _;

use recbind_core::record::{ID_FIELD, value_text};
use recbind_core::{Record, RouteDescriptor, RouteParams};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// Heading shown above every package.
pub const HEADING: &str = "Package Details";

/// Label of the new-campaign action.
pub const NEW_CAMPAIGN_LABEL: &str = "NEW CAMPAIGN";

/// Route the new-campaign action navigates to.
pub const NEW_CAMPAIGN_ROUTE: &str = "new-campaign";

/// Target of the new-campaign action for `record`.
///
/// Parameters come from the record's `id` attribute (`{name, version}`).
/// Returns `None` if the id lacks either field.
#[must_use]
pub fn new_campaign_route(record: &Record) -> Option<RouteDescriptor> {
    let Some(Value::Object(id)) = record.get(ID_FIELD) else {
        return None;
    };
    let name = id.get("name")?.as_str()?;
    let version = id.get("version")?.as_str()?;
    Some(RouteDescriptor::new(
        NEW_CAMPAIGN_ROUTE,
        RouteParams::new()
            .with("name", name)
            .with("version", version),
    ))
}

/// Presentational snapshot of one package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageSheet {
    pub heading: &'static str,
    pub description: Option<String>,
    /// Table header; the record's `name` attribute, else its key.
    pub title: String,
    /// One `(field, value)` row per attribute, in field order.
    pub rows: Vec<(String, String)>,
    pub new_campaign: Option<RouteDescriptor>,
}

impl PackageSheet {
    /// Build the sheet for `record`.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            heading: HEADING,
            description: record.get_str("description").map(str::to_owned),
            title: record
                .get_str("name")
                .map_or_else(|| record.key().to_string(), str::to_owned),
            rows: record
                .attributes()
                .iter()
                .map(|(field, value)| (field.clone(), value_text(value)))
                .collect(),
            new_campaign: new_campaign_route(record),
        }
    }

    /// Lay the sheet out as text lines.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(self.heading);
        out.push('\n');
        if let Some(description) = &self.description {
            out.push('\n');
            out.push_str(description);
            out.push('\n');
        }
        if let Some(route) = &self.new_campaign {
            let _ = write!(out, "\n[{NEW_CAMPAIGN_LABEL}] -> {route}\n");
        }
        out.push('\n');

        let key_width = self
            .rows
            .iter()
            .map(|(k, _)| k.width())
            .chain(std::iter::once(self.title.width()))
            .max()
            .unwrap_or(0);
        let value_width = self.rows.iter().map(|(_, v)| v.width()).max().unwrap_or(0);

        push_row(&mut out, &self.title, "", key_width, value_width);
        let _ = writeln!(
            out,
            "|{}|{}|",
            "-".repeat(key_width + 2),
            "-".repeat(value_width + 2)
        );
        for (field, value) in &self.rows {
            push_row(&mut out, field, value, key_width, value_width);
        }
        out
    }
}

fn push_row(out: &mut String, left: &str, right: &str, left_width: usize, right_width: usize) {
    out.push_str("| ");
    pad(out, left, left_width);
    out.push_str(" | ");
    pad(out, right, right_width);
    out.push_str(" |\n");
}

fn pad(out: &mut String, text: &str, width: usize) {
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(text.width())));
}
