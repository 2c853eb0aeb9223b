//! Command-line interface for agentscope
//!
//! This module contains CLI argument parsing and configuration

pub mod args;

pub use args::{Args, Command, DumpCommand};
