use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use devrun::errors::{DevrunError, Result};
use devrun::exec::{
    BoxFuture, CommandSpec, ExitOutcome, ManagedChild, ProcessLauncher, TerminateOutcome,
    EXPECTED_STOP_SIGNAL, TERMINATE_SIGNAL,
};
use devrun::types::Role;

/// Everything the fake launcher and its children did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Ran(String),
    Spawned(String),
    Interrupted(String),
    Terminated(String),
    Killed(String),
}

pub type EventLog = Arc<Mutex<Vec<ProcessEvent>>>;

/// How a fake child reacts to stop requests.
///
/// `None` means the request is ignored and the child keeps running.
#[derive(Debug, Clone, Copy)]
pub struct ChildBehaviour {
    pub on_interrupt: Option<ExitOutcome>,
    pub on_terminate: Option<ExitOutcome>,
    /// Stop requests end the child outright, like on a platform without
    /// signals.
    pub forced_stop: bool,
}

impl Default for ChildBehaviour {
    /// A well-behaved long-running service: dies by whatever signal it gets.
    fn default() -> Self {
        Self {
            on_interrupt: Some(ExitOutcome::Signal(EXPECTED_STOP_SIGNAL)),
            on_terminate: Some(ExitOutcome::Signal(TERMINATE_SIGNAL)),
            forced_stop: false,
        }
    }
}

/// Test-side handle to make a fake child exit.
#[derive(Debug, Clone)]
pub struct ChildControl {
    exit: Arc<watch::Sender<Option<ExitOutcome>>>,
}

impl ChildControl {
    /// Make the process exit now (first exit wins).
    pub fn exit(&self, outcome: ExitOutcome) {
        self.exit.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(outcome);
                true
            } else {
                false
            }
        });
    }

    pub fn outcome(&self) -> Option<ExitOutcome> {
        *self.exit.borrow()
    }
}

pub struct FakeChild {
    label: String,
    pid: u32,
    behaviour: ChildBehaviour,
    wait_fails: bool,
    control: ChildControl,
    rx: watch::Receiver<Option<ExitOutcome>>,
    log: EventLog,
}

impl FakeChild {
    fn record(&self, event: ProcessEvent) {
        self.log.lock().unwrap().push(event);
    }

    fn stop(&mut self, reaction: Option<ExitOutcome>) -> TerminateOutcome {
        if self.control.outcome().is_some() {
            return TerminateOutcome::AlreadyExited;
        }
        if let Some(outcome) = reaction {
            self.control.exit(outcome);
        }
        if self.behaviour.forced_stop {
            TerminateOutcome::Forced
        } else {
            TerminateOutcome::Requested
        }
    }
}

impl ManagedChild for FakeChild {
    fn id(&self) -> Option<u32> {
        self.control.outcome().is_none().then_some(self.pid)
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitOutcome>> {
        Box::pin(async move {
            if self.wait_fails {
                return Err(io::Error::other("lost the process handle").into());
            }
            let outcome = *self
                .rx
                .wait_for(|o| o.is_some())
                .await
                .map_err(|e| DevrunError::Other(anyhow::Error::new(e)))?;
            Ok(outcome.expect("wait_for guarantees Some"))
        })
    }

    fn terminate(&mut self) -> Result<TerminateOutcome> {
        self.record(ProcessEvent::Terminated(self.label.clone()));
        Ok(self.stop(self.behaviour.on_terminate))
    }

    fn interrupt(&mut self) -> Result<TerminateOutcome> {
        self.record(ProcessEvent::Interrupted(self.label.clone()));
        Ok(self.stop(self.behaviour.on_interrupt))
    }

    fn kill(&mut self) -> Result<TerminateOutcome> {
        self.record(ProcessEvent::Killed(self.label.clone()));
        Ok(self.stop(Some(ExitOutcome::Signal(9))))
    }
}

/// Launcher that never starts a real process.
///
/// - the build step finishes immediately with the configured outcome;
/// - spawned children run until a test calls [`ChildControl::exit`] or the
///   orchestrator stops them.
pub struct FakeLauncher {
    build_outcome: ExitOutcome,
    behaviours: HashMap<String, ChildBehaviour>,
    failing: HashSet<String>,
    broken_waits: HashSet<String>,
    controls: Arc<Mutex<HashMap<String, ChildControl>>>,
    log: EventLog,
    next_pid: u32,
}

impl FakeLauncher {
    pub fn new(log: EventLog) -> Self {
        Self {
            build_outcome: ExitOutcome::Code(0),
            behaviours: HashMap::new(),
            failing: HashSet::new(),
            broken_waits: HashSet::new(),
            controls: Arc::new(Mutex::new(HashMap::new())),
            log,
            next_pid: 1000,
        }
    }

    pub fn build_exits(mut self, outcome: ExitOutcome) -> Self {
        self.build_outcome = outcome;
        self
    }

    pub fn behaviour(mut self, role: Role, behaviour: ChildBehaviour) -> Self {
        self.behaviours.insert(role.to_string(), behaviour);
        self
    }

    /// Spawning this role fails as if the executable were missing.
    pub fn fail_spawn(mut self, role: Role) -> Self {
        self.failing.insert(role.to_string());
        self
    }

    /// Waiting on this role's child fails instead of reporting an exit.
    pub fn wait_fails(mut self, role: Role) -> Self {
        self.broken_waits.insert(role.to_string());
        self
    }

    /// Shared map of controls, filled as children are spawned.
    pub fn controls(&self) -> Arc<Mutex<HashMap<String, ChildControl>>> {
        Arc::clone(&self.controls)
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&mut self, spec: &CommandSpec) -> Result<Box<dyn ManagedChild>> {
        if self.failing.contains(&spec.label) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file or directory").into());
        }

        self.log
            .lock()
            .unwrap()
            .push(ProcessEvent::Spawned(spec.label.clone()));

        let (tx, rx) = watch::channel(None);
        let control = ChildControl { exit: Arc::new(tx) };
        self.controls
            .lock()
            .unwrap()
            .insert(spec.label.clone(), control.clone());

        self.next_pid += 1;
        Ok(Box::new(FakeChild {
            label: spec.label.clone(),
            pid: self.next_pid,
            behaviour: self.behaviours.get(&spec.label).copied().unwrap_or_default(),
            wait_fails: self.broken_waits.contains(&spec.label),
            control,
            rx,
            log: Arc::clone(&self.log),
        }))
    }

    fn run_to_completion(&mut self, spec: &CommandSpec) -> BoxFuture<'_, Result<ExitOutcome>> {
        self.log
            .lock()
            .unwrap()
            .push(ProcessEvent::Ran(spec.label.clone()));
        let outcome = self.build_outcome;
        Box::pin(async move { Ok(outcome) })
    }
}
