//! CLI subcommands.

pub mod batch;
pub mod parse;
pub mod templates;
