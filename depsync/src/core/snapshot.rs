//! Parsing of the package manager's dependency listing.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::types::InstalledSnapshot;

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    dependencies: Option<InstalledSnapshot>,
}

/// Parse `npm ls --json` style output into a snapshot of direct dependencies.
///
/// Output that is not a JSON object is an error. A listing without a
/// `dependencies` object (a project with no dependencies) yields an empty
/// snapshot.
pub fn parse_snapshot(raw: &str) -> Result<InstalledSnapshot> {
    let listing: Listing =
        serde_json::from_str(raw).context("parse dependency listing as json")?;
    Ok(listing.dependencies.unwrap_or_default())
}

/// Names the listing flags as declared but not installed, in name order.
pub fn unresolved_names(snapshot: &InstalledSnapshot) -> Vec<&str> {
    snapshot
        .iter()
        .filter(|(_, pkg)| pkg.missing)
        .map(|(name, _)| name.as_str())
        .collect()
}
