#![forbid(unsafe_code)]

//! Package detail view for recbind.

pub mod screen;
pub mod sheet;

pub use screen::{Frame, PackageScreen};
pub use sheet::{PackageSheet, new_campaign_route};
