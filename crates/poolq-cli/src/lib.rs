//! Pool quoting CLI: catalog loading, aggregation, and quote printing.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
