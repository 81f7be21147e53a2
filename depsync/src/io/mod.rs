//! I/O for depsync: configuration, process execution, and the package manager.

pub mod config;
pub mod package_manager;
pub mod process;
pub mod shell;
