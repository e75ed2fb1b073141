// src/engine/signals.rs

//! Interrupt delivery.
//!
//! An [`InterruptSource`] is armed once the background process exists. The
//! production source listens for Ctrl-C and does nothing but call
//! [`ShutdownCoordinator::request_shutdown`]; it never touches a process.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::coordinator::{ShutdownCoordinator, ShutdownTrigger};

pub trait InterruptSource: Send {
    fn arm(&mut self, coordinator: Arc<ShutdownCoordinator>);
}

/// Ctrl-C (SIGINT / console Ctrl-C) listener.
///
/// The listener keeps running after the first interrupt so that repeated
/// Ctrl-C presses are absorbed instead of killing the orchestrator halfway
/// through its cleanup. It is aborted when this value is dropped.
#[derive(Debug, Default)]
pub struct CtrlCInterrupts {
    listener: Option<JoinHandle<()>>,
}

impl CtrlCInterrupts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InterruptSource for CtrlCInterrupts {
    fn arm(&mut self, coordinator: Arc<ShutdownCoordinator>) {
        if self.listener.is_some() {
            return;
        }
        self.listener = Some(tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
                if !coordinator.request_shutdown(ShutdownTrigger::Interrupt) {
                    debug!("interrupt received while already shutting down");
                }
            }
        }));
        debug!("interrupt handler armed");
    }
}

impl Drop for CtrlCInterrupts {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
