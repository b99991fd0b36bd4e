//! Procura console - interactive terminal client
//!
//! Wires the session core and the backend services to terminal adapters
//! and runs them as a single-process shell.

pub mod cli;
pub mod console;
pub mod shell;
pub mod terminal;

pub use cli::{Cli, Command};
pub use console::Console;
pub use shell::{Reply, Shell};
pub use terminal::{StderrNotifier, TerminalRedirect};
