// src/exec/outcome.rs

//! How a child process ended.

use std::fmt;
use std::process::ExitStatus;

/// Signal the coordinator delivers (or expects the terminal to deliver) to
/// stop the foreground process.
#[cfg(unix)]
pub const EXPECTED_STOP_SIGNAL: i32 = nix::sys::signal::Signal::SIGINT as i32;
#[cfg(not(unix))]
pub const EXPECTED_STOP_SIGNAL: i32 = 2;

/// Signal used to terminate the background process.
#[cfg(unix)]
pub const TERMINATE_SIGNAL: i32 = nix::sys::signal::Signal::SIGTERM as i32;
#[cfg(not(unix))]
pub const TERMINATE_SIGNAL: i32 = 15;

/// Exit code of a Windows console process stopped by Ctrl-C
/// (`STATUS_CONTROL_C_EXIT`).
pub const CONSOLE_CTRL_C_EXIT: i32 = 0xC000_013Au32 as i32;

/// Termination reason of a process: either an exit code or a signal,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Code(i32),
    Signal(i32),
}

impl ExitOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ExitOutcome::Signal(sig);
            }
        }
        // Neither code nor signal is only possible for exotic unix states
        // (e.g. stopped); treat as a failed exit.
        ExitOutcome::Code(-1)
    }

    pub fn success(self) -> bool {
        self == ExitOutcome::Code(0)
    }

    /// True for the ways a process ends when the orchestrator stops it on
    /// purpose: death by the interrupt or termination signal, the shell
    /// convention `128 + signal` used by wrappers that catch them, or the
    /// Windows console Ctrl-C exit code.
    pub fn is_expected_stop(self) -> bool {
        match self {
            ExitOutcome::Signal(sig) => is_stop_signal(sig),
            ExitOutcome::Code(code) if cfg!(windows) => code == CONSOLE_CTRL_C_EXIT,
            ExitOutcome::Code(code) => code > 128 && is_stop_signal(code - 128),
        }
    }

    /// Clean end of a session: stopped on purpose, or exited with code 0.
    pub fn is_clean(self) -> bool {
        self.success() || self.is_expected_stop()
    }
}

fn is_stop_signal(sig: i32) -> bool {
    sig == EXPECTED_STOP_SIGNAL || sig == TERMINATE_SIGNAL
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Code(code) => write!(f, "exited with code {code}"),
            ExitOutcome::Signal(sig) => write!(f, "terminated by signal {sig}"),
        }
    }
}
