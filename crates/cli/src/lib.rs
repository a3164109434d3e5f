//! # rankset-cli
//!
//! Redis-style command shell over a [`rankset_core::Registry`]. The binary
//! in `main.rs` wires stdin or a script file into [`shell::run`].

/// Command parsing, execution, and replies.
pub mod command;
/// Read-execute-print loop.
pub mod shell;

pub use command::{Command, CommandError, Reply};
pub use shell::{run, OutputFormat, SessionStats};
