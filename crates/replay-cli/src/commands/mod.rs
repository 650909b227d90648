//! Subcommand implementations.

pub mod days;
pub mod summary;
pub mod top;
pub mod years;
mod util;
