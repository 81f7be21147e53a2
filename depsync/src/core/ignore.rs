//! Ignore-list parsing.

use crate::core::types::IgnoreSet;

/// Build the ignore set from an optional comma-separated argument.
///
/// Tokens are taken literally: no trimming, and an empty token is kept as the
/// empty name (which never matches a package).
pub fn parse_ignore_arg(arg: Option<&str>) -> IgnoreSet {
    match arg {
        Some(raw) => raw.split(',').map(str::to_string).collect(),
        None => IgnoreSet::new(),
    }
}
