//! Subcommand implementations.

pub mod check;
pub mod import;
pub mod node;
pub mod tree;
