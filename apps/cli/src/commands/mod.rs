//! CLI subcommand implementations.

pub mod config;
pub mod item;
pub mod lessons;
pub mod review;
pub mod stats;
