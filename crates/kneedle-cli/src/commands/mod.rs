//! CLI subcommand implementations.

pub mod columns;
pub mod find;
