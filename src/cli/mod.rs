//! Command-line interface

pub mod args;
pub mod commands;
mod host;

pub use args::{Cli, Commands};
pub use host::HostEnv;
