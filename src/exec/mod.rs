// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] describes a fully resolved invocation (`CommandSpec`).
//! - [`backend`] provides the `ProcessLauncher` / `ManagedChild` seam and
//!   the `tokio::process` implementation used in production.
//! - [`outcome`] models how a process ended (`ExitOutcome`).
//! - [`resolve`] finds the companion executables.
//! - [`build`] runs the blocking build step.

pub mod backend;
pub mod build;
pub mod command;
pub mod outcome;
pub mod resolve;

pub use backend::{
    BoxFuture, ManagedChild, ProcessLauncher, RealChild, RealProcessLauncher, TerminateOutcome,
};
pub use build::run_build;
pub use command::CommandSpec;
pub use outcome::{ExitOutcome, EXPECTED_STOP_SIGNAL, TERMINATE_SIGNAL};
pub use resolve::ExecutableResolver;
