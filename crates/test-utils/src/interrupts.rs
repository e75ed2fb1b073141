use std::sync::{Arc, Mutex};

use devrun::engine::{InterruptSource, ShutdownCoordinator, ShutdownTrigger};

/// Interrupt source driven by the test instead of Ctrl-C.
#[derive(Debug, Clone, Default)]
pub struct ManualInterrupts {
    armed: Arc<Mutex<Option<Arc<ShutdownCoordinator>>>>,
}

impl ManualInterrupts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.lock().unwrap().is_some()
    }

    /// Deliver an interrupt like the Ctrl-C listener would. Returns whether
    /// it started the shutdown; `None` if not armed yet.
    pub fn fire(&self) -> Option<bool> {
        let armed = self.armed.lock().unwrap();
        armed
            .as_ref()
            .map(|c| c.request_shutdown(ShutdownTrigger::Interrupt))
    }
}

impl InterruptSource for ManualInterrupts {
    fn arm(&mut self, coordinator: Arc<ShutdownCoordinator>) {
        *self.armed.lock().unwrap() = Some(coordinator);
    }
}
