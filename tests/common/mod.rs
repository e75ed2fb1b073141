#![allow(dead_code, unused_imports)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use devrun_test_utils::builders;
pub use devrun_test_utils::fake_process;
pub use devrun_test_utils::interrupts;
pub use devrun_test_utils::{init_tracing, wait_for_state, with_timeout};

use devrun::engine::{Orchestrator, ShutdownCoordinator};
use devrun::fs::mock::MockFileSystem;
use devrun::types::Role;

use fake_process::{ChildControl, EventLog, FakeLauncher, ProcessEvent};
use interrupts::ManualInterrupts;

/// Project root used by fake sessions.
pub const ROOT: &str = "/proj";

/// Handles a test keeps after handing the orchestrator off to a task.
pub struct Harness {
    pub log: EventLog,
    pub interrupts: ManualInterrupts,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub fs: MockFileSystem,
    pub controls: Arc<Mutex<HashMap<String, ChildControl>>>,
}

impl Harness {
    pub fn events(&self) -> Vec<ProcessEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn control(&self, role: Role) -> ChildControl {
        self.controls
            .lock()
            .unwrap()
            .get(&role.to_string())
            .cloned()
            .unwrap_or_else(|| panic!("{role} was never spawned"))
    }
}

/// Orchestrator over a fake launcher and a mock filesystem in which the
/// front-end directory exists.
pub fn harness(
    configure: impl FnOnce(FakeLauncher) -> FakeLauncher,
) -> (Orchestrator<FakeLauncher, ManualInterrupts>, Harness) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let launcher = configure(FakeLauncher::new(Arc::clone(&log)));
    let controls = launcher.controls();

    let fs = MockFileSystem::new();
    fs.add_dir(format!("{ROOT}/frontend"));

    let interrupts = ManualInterrupts::new();
    let coordinator = Arc::new(ShutdownCoordinator::new());
    let orchestrator = Orchestrator::with_coordinator(
        launcher,
        interrupts.clone(),
        Arc::new(fs.clone()),
        Arc::clone(&coordinator),
    );

    (
        orchestrator,
        Harness {
            log,
            interrupts,
            coordinator,
            fs,
            controls,
        },
    )
}
