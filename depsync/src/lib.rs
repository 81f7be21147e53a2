//! Exact dependency-version enforcement.
//!
//! Reads a project's direct dependencies from the package manager, compares
//! them with a declared name → exact-version mapping, and removes/reinstalls
//! whatever differs. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (ignore parsing, snapshot parsing,
//!   plan construction). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, process execution,
//!   package-manager commands). Isolated behind [`io::shell::CommandRunner`]
//!   so tests can script command results.
//!
//! [`reconcile`] coordinates the two to implement the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod reconcile;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
