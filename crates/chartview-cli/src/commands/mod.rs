//! CLI commands

pub mod analyze;
pub mod catalog;
pub mod render;
pub mod seed;
pub mod serve;
