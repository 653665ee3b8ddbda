//! Runs one external program with a hard deadline and captures its output.
//!
//! The runner never interprets the program's exit status. A run that
//! outlives its deadline is killed and reported with the sentinel exit code
//! [`TIMEOUT_EXIT_CODE`]; only a failure to launch is an error.

mod error;
mod runner;
mod spec;

pub use error::{RunnerError, RunnerResult};
pub use runner::CommandRunner;
pub use spec::{CommandResult, CommandSpec, TIMEOUT_EXIT_CODE};
