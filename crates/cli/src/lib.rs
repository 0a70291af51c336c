//! taskpilot CLI library
//!
//! Command decoding, configuration, rendering and the interactive session.

pub mod commands;
pub mod config;
pub mod render;
pub mod repl;
pub mod util;

pub use commands::Command;
pub use config::AppConfig;
pub use repl::{Flow, Session};
