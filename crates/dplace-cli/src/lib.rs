//! Command implementations and logging setup of the `dplace` binary.

pub mod commands;
pub mod logging;
pub mod summary;
