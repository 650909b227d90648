//! Streaming-history statistics CLI library.
//!
//! This crate provides the command-line boundary layer: argument parsing,
//! configuration, and report rendering over the core engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{By, Cli, Commands, Kind};
pub use config::Config;
