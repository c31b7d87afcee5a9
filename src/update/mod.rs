// ABOUTME: The container replacement protocol.
// ABOUTME: Staleness detection, ordered shutdown, recreation, command execution, sessions.

mod client;
mod error;
mod exec;
pub mod poll;
mod recreate;
mod replacement;
mod session;
mod shutdown;
mod staleness;
mod state;

pub use client::{UpdateClient, UpdateOptions};
pub use error::{UpdateError, UpdateErrorKind};
pub use exec::{ExecOutcome, execute_command};
pub use poll::{PollOutcome, PollSchedule, poll_until};
pub use recreate::{select_simple_network, start_container};
pub use replacement::{Checked, Replacement};
pub use session::{SessionMode, SessionOptions, run_session};
pub use shutdown::stop_container;
pub use staleness::{StalenessCheck, check_staleness, is_stale};
pub use state::{Fresh, Recreated, Removed, Snapshotted, Stale};
