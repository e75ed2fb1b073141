// tests/real_processes.rs
#![cfg(unix)]

mod common;
use crate::common::builders::{SessionPlanBuilder, Step};
use crate::common::interrupts::ManualInterrupts;
use crate::common::{init_tracing, wait_for_state, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use devrun::engine::{OrchestrationState, Orchestrator, ShutdownCoordinator, Verdict};
use devrun::env::base_environment;
use devrun::errors::DevrunError;
use devrun::exec::{
    ExitOutcome, ManagedChild, ProcessLauncher, RealProcessLauncher, TerminateOutcome,
    EXPECTED_STOP_SIGNAL, TERMINATE_SIGNAL,
};
use devrun::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

struct RealSession {
    root: TempDir,
    interrupts: ManualInterrupts,
    coordinator: Arc<ShutdownCoordinator>,
    orchestrator: Orchestrator<RealProcessLauncher, ManualInterrupts>,
}

fn real_session() -> RealSession {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("frontend")).unwrap();

    let interrupts = ManualInterrupts::new();
    let coordinator = Arc::new(ShutdownCoordinator::new());
    let orchestrator = Orchestrator::with_coordinator(
        RealProcessLauncher::new(),
        interrupts.clone(),
        Arc::new(RealFileSystem),
        Arc::clone(&coordinator),
    );
    RealSession {
        root,
        interrupts,
        coordinator,
        orchestrator,
    }
}

fn plan_builder(root: &TempDir) -> SessionPlanBuilder {
    SessionPlanBuilder::new(root.path())
        .env(base_environment())
        .stop_grace(Duration::from_secs(2))
        .shell(Step::Build, "exit 0")
}

#[tokio::test]
async fn failed_build_leaves_children_unstarted() -> TestResult {
    init_tracing();
    let s = real_session();
    let marker = s.root.path().join("started");

    let plan = plan_builder(&s.root)
        .shell(Step::Build, "exit 2")
        .shell(Step::Backend, &format!("touch '{}'", marker.display()))
        .shell(Step::Frontend, &format!("touch '{}'", marker.display()))
        .build();

    match with_timeout(s.orchestrator.run(&plan)).await {
        Err(DevrunError::BuildFailed(outcome)) => assert_eq!(outcome, ExitOutcome::Code(2)),
        other => panic!("expected BuildFailed, got {other:?}"),
    }
    assert!(!marker.exists());
    assert!(!s.root.path().join("frontend/dist").exists());
    Ok(())
}

#[tokio::test]
async fn interrupt_stops_real_children() -> TestResult {
    init_tracing();
    let s = real_session();
    let plan = plan_builder(&s.root)
        .shell(Step::Backend, "exec sleep 30")
        .shell(Step::Frontend, "exec sleep 30")
        .build();

    let orchestrator = s.orchestrator;
    let session = tokio::spawn(async move { orchestrator.run(&plan).await });

    wait_for_state(&s.coordinator, OrchestrationState::Running).await;
    assert!(s.root.path().join("frontend/dist").is_dir());
    assert_eq!(s.interrupts.fire(), Some(true));

    let report = with_timeout(session).await??;
    assert_eq!(
        report.foreground_outcome,
        ExitOutcome::Signal(EXPECTED_STOP_SIGNAL)
    );
    assert_eq!(report.background.outcome, ExitOutcome::Signal(TERMINATE_SIGNAL));
    assert_eq!(report.verdict, Verdict::Success);
    Ok(())
}

#[tokio::test]
async fn foreground_crash_takes_down_background() -> TestResult {
    init_tracing();
    let s = real_session();
    let plan = plan_builder(&s.root)
        .shell(Step::Backend, "exec sleep 30")
        .shell(Step::Frontend, "sleep 0.2; exit 3")
        .build();

    let report = with_timeout(s.orchestrator.run(&plan)).await?;
    assert_eq!(report.foreground_outcome, ExitOutcome::Code(3));
    assert_eq!(report.background.outcome, ExitOutcome::Signal(TERMINATE_SIGNAL));
    assert_eq!(report.verdict, Verdict::Failure);
    assert_eq!(report.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn foreground_dying_from_sigint_is_success() -> TestResult {
    init_tracing();
    let s = real_session();
    let plan = plan_builder(&s.root)
        .shell(Step::Backend, "exec sleep 30")
        .shell(Step::Frontend, "sleep 0.2; kill -INT $$")
        .build();

    let report = with_timeout(s.orchestrator.run(&plan)).await?;
    assert!(report.foreground_outcome.is_expected_stop());
    assert_eq!(report.verdict, Verdict::Success);
    Ok(())
}

#[tokio::test]
async fn children_see_composed_environment() -> TestResult {
    init_tracing();
    let s = real_session();
    let out = s.root.path().join("seen");

    let mut env = base_environment();
    env.insert("DEVRUN_PROBE".to_string(), "42".to_string());
    let plan = plan_builder(&s.root)
        .env(env)
        .shell(Step::Backend, "exec sleep 30")
        .shell(
            Step::Frontend,
            &format!("printf %s \"$DEVRUN_PROBE\" > '{}'", out.display()),
        )
        .build();

    let report = with_timeout(s.orchestrator.run(&plan)).await?;
    assert_eq!(report.verdict, Verdict::Success);
    assert_eq!(std::fs::read_to_string(&out)?, "42");
    Ok(())
}

#[tokio::test]
async fn stopping_an_exited_child_is_harmless() -> TestResult {
    init_tracing();
    let root = TempDir::new()?;
    let plan = SessionPlanBuilder::new(root.path())
        .env(base_environment())
        .shell(Step::Backend, "exit 0")
        .build();

    let mut launcher = RealProcessLauncher::new();
    let mut child = launcher.spawn(&plan.backend)?;
    assert_eq!(with_timeout(child.wait()).await?, ExitOutcome::Code(0));

    assert_eq!(child.terminate()?, TerminateOutcome::AlreadyExited);
    assert_eq!(child.terminate()?, TerminateOutcome::AlreadyExited);
    assert_eq!(child.interrupt()?, TerminateOutcome::AlreadyExited);
    Ok(())
}
