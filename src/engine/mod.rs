// src/engine/mod.rs

//! Orchestration engine for devrun.
//!
//! - [`plan`] turns configuration into concrete invocations.
//! - [`orchestrator`] drives a session: build, spawn, wait, tear down.
//! - [`coordinator`] owns the at-most-once shutdown decision and the
//!   background process' lifetime.
//! - [`signals`] delivers operator interrupts to the coordinator.
//! - [`state`] is the session lifecycle.

pub mod coordinator;
pub mod orchestrator;
pub mod plan;
pub mod signals;
pub mod state;

pub use coordinator::{
    stop_child, BackgroundReport, ShutdownCoordinator, ShutdownTrigger, StopRequest,
};
pub use orchestrator::{Orchestrator, SessionReport};
pub use plan::SessionPlan;
pub use signals::{CtrlCInterrupts, InterruptSource};
pub use state::{OrchestrationState, StateCell, Verdict};
