//! Command-line interface module.

mod args;
pub mod agent;
pub mod entries;
pub mod serve;

pub use args::{Cli, Commands, EntryArgs, NetArgs};
