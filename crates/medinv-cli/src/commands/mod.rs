//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod date;
pub mod inventory;
pub mod scan;
