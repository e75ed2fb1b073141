// src/engine/coordinator.rs

//! Shutdown coordination.
//!
//! [`ShutdownCoordinator`] is shared (behind an `Arc`) between the control
//! task, the background supervisor task and the interrupt listener. Its only
//! mutable state is the "shutdown requested" flag, flipped at most once by
//! [`ShutdownCoordinator::request_shutdown`]; everyone interested in the
//! shutdown waits on [`ShutdownCoordinator::shutdown_requested`] and acts on
//! the processes it owns itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::engine::state::{OrchestrationState, StateCell, Verdict};
use crate::errors::Result;
use crate::exec::{
    ExitOutcome, ManagedChild, TerminateOutcome, EXPECTED_STOP_SIGNAL, TERMINATE_SIGNAL,
};

/// What started the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// The operator interrupted the session (Ctrl-C).
    Interrupt,
    /// The foreground process' wait returned.
    ForegroundExited,
    /// The background process exited abnormally on its own.
    BackgroundExited,
    /// The foreground process could not be started.
    LaunchFailed,
}

/// How to ask a child to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    Interrupt,
    Terminate,
}

impl StopRequest {
    /// Signal that carries this request.
    pub fn signal(self) -> i32 {
        match self {
            StopRequest::Interrupt => EXPECTED_STOP_SIGNAL,
            StopRequest::Terminate => TERMINATE_SIGNAL,
        }
    }
}

/// How the background process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundReport {
    pub outcome: ExitOutcome,
    /// `true` if it exited before being asked to stop.
    pub exited_on_own: bool,
}

#[derive(Debug)]
pub struct ShutdownCoordinator {
    requested: AtomicBool,
    trigger: OnceLock<ShutdownTrigger>,
    state: StateCell,
    notify: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            requested: AtomicBool::new(false),
            trigger: OnceLock::new(),
            state: StateCell::new(),
            notify,
        }
    }

    pub fn state(&self) -> OrchestrationState {
        self.state.get()
    }

    pub fn advance(&self, next: OrchestrationState) -> bool {
        let moved = self.state.advance(next);
        if moved {
            debug!(state = ?next, "session state changed");
        }
        moved
    }

    /// Request shutdown. Only the first call has an effect; it records the
    /// trigger and wakes every waiter. Returns whether this call was first.
    pub fn request_shutdown(&self, trigger: ShutdownTrigger) -> bool {
        if self
            .requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(?trigger, "shutdown already requested; ignoring");
            return false;
        }

        let _ = self.trigger.set(trigger);
        self.advance(OrchestrationState::ShuttingDown);
        self.notify.send_replace(true);
        info!(?trigger, "shutting down");
        true
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub fn trigger(&self) -> Option<ShutdownTrigger> {
        self.trigger.get().copied()
    }

    /// Resolves once shutdown has been requested (immediately if it already
    /// was).
    pub async fn shutdown_requested(&self) {
        let mut rx = self.notify.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|requested| *requested).await;
    }

    /// Decide the session result from the foreground outcome.
    ///
    /// Success needs a clean foreground exit (stopped with an expected stop
    /// signal, or code 0) and no abnormal background exit.
    pub fn verdict(&self, foreground: ExitOutcome) -> Verdict {
        if self.trigger() == Some(ShutdownTrigger::BackgroundExited) {
            return Verdict::Failure;
        }
        if foreground.is_clean() {
            Verdict::Success
        } else {
            Verdict::Failure
        }
    }

    pub fn finish(&self, verdict: Verdict) {
        self.advance(OrchestrationState::Done(verdict));
    }

    /// Own the background process until it exits or shutdown is requested,
    /// then stop it.
    pub async fn supervise_background(
        self: Arc<Self>,
        mut child: Box<dyn ManagedChild>,
        grace: Duration,
    ) -> Result<BackgroundReport> {
        tokio::select! {
            biased;

            _ = self.shutdown_requested() => {
                let outcome = stop_child(child.as_mut(), StopRequest::Terminate, grace).await?;
                debug!(%outcome, "background process stopped");
                Ok(BackgroundReport { outcome, exited_on_own: false })
            }

            res = child.wait() => {
                let outcome = res?;
                Ok(BackgroundReport { outcome, exited_on_own: true })
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Ask `child` to stop and wait for it, killing it if it is still alive
/// after `grace`.
///
/// A child that already exited is not an error. A child that had to be
/// ended outright because the request cannot be delivered is reported as
/// stopped by the requested signal.
pub async fn stop_child(
    child: &mut dyn ManagedChild,
    request: StopRequest,
    grace: Duration,
) -> Result<ExitOutcome> {
    let sent = match request {
        StopRequest::Interrupt => child.interrupt(),
        StopRequest::Terminate => child.terminate(),
    };
    let forced = matches!(sent, Ok(TerminateOutcome::Forced));
    match sent {
        Ok(TerminateOutcome::Requested) => debug!(pid = ?child.id(), ?request, "stop requested"),
        Ok(TerminateOutcome::Forced) => debug!(pid = ?child.id(), ?request, "process ended on request"),
        Ok(TerminateOutcome::AlreadyExited) => debug!(?request, "process already exited"),
        Err(e) => warn!(?request, error = %e, "failed to deliver stop request"),
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(res) => {
            let outcome = res?;
            if forced {
                debug!(%outcome, ?request, "exit forced by the stop request");
                return Ok(ExitOutcome::Signal(request.signal()));
            }
            Ok(outcome)
        }
        Err(_) => {
            warn!(pid = ?child.id(), ?grace, "process did not stop in time; killing it");
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to kill process");
            }
            child.wait().await
        }
    }
}
