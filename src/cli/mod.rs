//! Command-line interface module.

mod args;
pub mod auth;
pub mod build;
pub mod serve;

pub use args::{AuthArgs, BuildArgs, Cli, Commands};
