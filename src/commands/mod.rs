// ABOUTME: Command module aggregator for the reimage CLI.
// ABOUTME: Re-exports check, update, and exec command handlers.

mod exec;
mod runtime_connection;
mod session;

pub use exec::exec_command;
pub use session::{check, update};
