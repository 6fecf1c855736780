//! The `deck` command-line application.
pub mod cli;
pub mod platform;
pub mod replay;
pub mod script;
