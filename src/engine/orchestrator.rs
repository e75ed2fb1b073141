// src/engine/orchestrator.rs

//! Session driver: build, spawn background, arm interrupts, spawn and wait
//! on the foreground, then tear everything down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::engine::coordinator::{
    stop_child, BackgroundReport, ShutdownCoordinator, ShutdownTrigger, StopRequest,
};
use crate::engine::plan::SessionPlan;
use crate::engine::signals::InterruptSource;
use crate::engine::state::{OrchestrationState, Verdict};
use crate::errors::{DevrunError, Result};
use crate::exec::{run_build, ExitOutcome, ManagedChild, ProcessLauncher};
use crate::fs::{ensure_dir, FileSystem};
use crate::types::Role;

type BackgroundTask = JoinHandle<Result<BackgroundReport>>;

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub foreground: Role,
    pub foreground_outcome: ExitOutcome,
    pub background: BackgroundReport,
    pub trigger: Option<ShutdownTrigger>,
    pub verdict: Verdict,
}

impl SessionReport {
    pub fn exit_code(&self) -> i32 {
        match self.verdict {
            Verdict::Success => 0,
            Verdict::Failure => 1,
        }
    }

    /// Turn a failed session into the error describing the abnormal exit.
    pub fn into_result(self) -> Result<()> {
        if self.verdict == Verdict::Success {
            return Ok(());
        }
        if self.trigger == Some(ShutdownTrigger::BackgroundExited) {
            let role = self.foreground.other();
            return Err(DevrunError::LaunchFailed {
                role,
                reason: format!("{role} {} unexpectedly", self.background.outcome),
            });
        }
        Err(DevrunError::LaunchFailed {
            role: self.foreground,
            reason: format!("{} {}", self.foreground, self.foreground_outcome),
        })
    }
}

pub struct Orchestrator<L: ProcessLauncher, I: InterruptSource> {
    launcher: L,
    interrupts: I,
    fs: Arc<dyn FileSystem>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl<L: ProcessLauncher, I: InterruptSource> Orchestrator<L, I> {
    pub fn new(launcher: L, interrupts: I, fs: Arc<dyn FileSystem>) -> Self {
        Self::with_coordinator(launcher, interrupts, fs, Arc::new(ShutdownCoordinator::new()))
    }

    pub fn with_coordinator(
        launcher: L,
        interrupts: I,
        fs: Arc<dyn FileSystem>,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Self {
        Self {
            launcher,
            interrupts,
            fs,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Run a whole session.
    ///
    /// `Err` is returned for failures before both processes are running
    /// (build, preparation, spawn). Once they are, the result is a
    /// [`SessionReport`] whose verdict tells whether the session ended
    /// cleanly.
    pub async fn run(mut self, plan: &SessionPlan) -> Result<SessionReport> {
        let result = self.run_session(plan).await;
        match &result {
            Ok(report) => self.coordinator.finish(report.verdict),
            Err(_) => self.coordinator.finish(Verdict::Failure),
        }
        result
    }

    async fn run_session(&mut self, plan: &SessionPlan) -> Result<SessionReport> {
        run_build(&mut self.launcher, &plan.build).await?;
        self.coordinator.advance(OrchestrationState::Built);

        self.prepare_output_dir(plan)?;

        let fg_role = plan.foreground;
        let bg_role = fg_role.other();

        let background = self
            .launcher
            .spawn(plan.spec_for(bg_role))
            .map_err(|e| launch_failed(bg_role, e))?;
        info!(role = %bg_role, pid = ?background.id(), cmd = %plan.spec_for(bg_role), "started background process");
        self.coordinator.advance(OrchestrationState::Launched);

        let mut bg_task: BackgroundTask = tokio::spawn(
            Arc::clone(&self.coordinator).supervise_background(background, plan.stop_grace),
        );
        self.interrupts.arm(Arc::clone(&self.coordinator));

        let mut foreground = match self.launcher.spawn(plan.spec_for(fg_role)) {
            Ok(child) => child,
            Err(e) => {
                error!(role = %fg_role, error = %e, "failed to start foreground process");
                abandon_background(&self.coordinator, &mut bg_task, ShutdownTrigger::LaunchFailed)
                    .await;
                return Err(launch_failed(fg_role, e));
            }
        };
        info!(role = %fg_role, pid = ?foreground.id(), cmd = %plan.spec_for(fg_role), "started foreground process");
        self.coordinator.advance(OrchestrationState::Running);

        let (foreground_outcome, background) = self
            .supervise_foreground(foreground.as_mut(), bg_task, plan.stop_grace)
            .await?;

        let verdict = self.coordinator.verdict(foreground_outcome);
        let report = SessionReport {
            foreground: fg_role,
            foreground_outcome,
            background,
            trigger: self.coordinator.trigger(),
            verdict,
        };
        match verdict {
            Verdict::Success => info!(outcome = %foreground_outcome, "session ended"),
            Verdict::Failure => error!(
                foreground = %foreground_outcome,
                background = %background.outcome,
                trigger = ?report.trigger,
                "session ended abnormally"
            ),
        }
        Ok(report)
    }

    fn prepare_output_dir(&self, plan: &SessionPlan) -> Result<()> {
        match ensure_dir(self.fs.as_ref(), &plan.output_dir) {
            Ok(true) => info!(path = %plan.output_dir.display(), "created output directory"),
            Ok(false) => info!(path = %plan.output_dir.display(), "output directory already exists"),
            Err(e) => {
                return Err(DevrunError::LaunchFailed {
                    role: Role::Frontend,
                    reason: format!(
                        "preparing output directory {}: {e}",
                        plan.output_dir.display()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Block on the foreground process.
    ///
    /// While waiting, also react to a shutdown request (interrupt the
    /// foreground) and to the background process exiting by itself. Once the
    /// foreground is gone, the background is stopped and reaped.
    async fn supervise_foreground(
        &mut self,
        foreground: &mut dyn ManagedChild,
        mut bg_task: BackgroundTask,
        grace: Duration,
    ) -> Result<(ExitOutcome, BackgroundReport)> {
        let mut bg_report: Option<BackgroundReport> = None;

        let outcome = loop {
            tokio::select! {
                res = foreground.wait() => match res {
                    Ok(outcome) => break outcome,
                    Err(e) => {
                        error!(error = %e, "lost track of the foreground process");
                        if bg_report.is_none() {
                            abandon_background(
                                &self.coordinator,
                                &mut bg_task,
                                ShutdownTrigger::ForegroundExited,
                            )
                            .await;
                        }
                        return Err(e);
                    }
                },

                joined = &mut bg_task, if bg_report.is_none() => {
                    let report = match flatten_join(joined) {
                        Ok(report) => report,
                        Err(e) => {
                            error!(error = %e, "lost track of the background process");
                            self.coordinator.request_shutdown(ShutdownTrigger::BackgroundExited);
                            if let Err(fg_err) =
                                stop_child(foreground, StopRequest::Interrupt, grace).await
                            {
                                warn!(error = %fg_err, "foreground process cleanup failed");
                            }
                            return Err(e);
                        }
                    };
                    if report.exited_on_own && !report.outcome.is_clean() {
                        warn!(outcome = %report.outcome, "background process exited unexpectedly");
                        self.coordinator.request_shutdown(ShutdownTrigger::BackgroundExited);
                    } else {
                        info!(outcome = %report.outcome, "background process exited");
                    }
                    bg_report = Some(report);
                }

                _ = self.coordinator.shutdown_requested() => {
                    match stop_child(foreground, StopRequest::Interrupt, grace).await {
                        Ok(outcome) => break outcome,
                        Err(e) => {
                            error!(error = %e, "failed to stop the foreground process");
                            if bg_report.is_none() {
                                abandon_background(
                                    &self.coordinator,
                                    &mut bg_task,
                                    ShutdownTrigger::ForegroundExited,
                                )
                                .await;
                            }
                            return Err(e);
                        }
                    }
                }
            }
        };
        info!(%outcome, "foreground process exited");

        self.coordinator.request_shutdown(ShutdownTrigger::ForegroundExited);
        let background = match bg_report {
            Some(report) => report,
            None => flatten_join(bg_task.await)?,
        };
        Ok((outcome, background))
    }
}

/// Stop and reap the background process on a path that ends the session
/// with an error.
async fn abandon_background(
    coordinator: &ShutdownCoordinator,
    bg_task: &mut BackgroundTask,
    trigger: ShutdownTrigger,
) {
    coordinator.request_shutdown(trigger);
    if let Err(e) = flatten_join(bg_task.await) {
        warn!(error = %e, "background process cleanup failed");
    }
}

fn launch_failed(role: Role, err: DevrunError) -> DevrunError {
    DevrunError::LaunchFailed {
        role,
        reason: err.to_string(),
    }
}

fn flatten_join(
    joined: std::result::Result<Result<BackgroundReport>, JoinError>,
) -> Result<BackgroundReport> {
    joined.map_err(|e| {
        DevrunError::Other(anyhow::Error::new(e).context("background supervisor task failed"))
    })?
}
