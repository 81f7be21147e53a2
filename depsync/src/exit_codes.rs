//! Stable exit codes for the depsync CLI.

/// Plan drained (partial failures included unless `--strict`).
pub const OK: i32 = 0;
/// Invalid config, or the dependency snapshot could not be fetched or parsed.
pub const INVALID: i32 = 1;
/// `--strict` run where at least one package failed to converge.
pub const PARTIAL: i32 = 2;
