//! CLI module for loop-market

pub mod app;
pub mod commands;
pub mod demo;
pub mod lines;
pub mod render;

pub use app::{MarketApp, OutputFormat, Reply};
pub use commands::{Cli, Commands};
pub use demo::run_demo;
pub use lines::InputLines;
