//! Word Search application shell.
//!
//! Terminal front end for the word search puzzle builder. All state lives in
//! a `wordsearch_core::Workspace`; this crate only adapts stdin commands to
//! workspace calls and prints their outcomes.

pub mod cli;
pub mod commands;
pub mod shell;

pub use cli::Cli;
pub use commands::{Command, DrawAction, parse_line};
pub use shell::{Shell, ShellError, connect};
