//! Command handlers for the CargoLens CLI.

pub mod analyze;
pub mod config;
pub mod models;
pub mod query;
pub mod rank;
