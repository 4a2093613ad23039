//! CLI library components for the rule template marshaller.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
