// src/engine/state.rs

//! Session lifecycle: `idle -> built -> launched -> running -> shutting-down
//! -> done`.
//!
//! The state lives in an atomic so the interrupt path can move a running
//! session to `shutting-down` without coordination with the control task.

use std::sync::atomic::{AtomicU8, Ordering};

/// Final result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationState {
    Idle,
    Built,
    Launched,
    Running,
    ShuttingDown,
    Done(Verdict),
}

impl OrchestrationState {
    fn encode(self) -> u8 {
        match self {
            OrchestrationState::Idle => 0,
            OrchestrationState::Built => 1,
            OrchestrationState::Launched => 2,
            OrchestrationState::Running => 3,
            OrchestrationState::ShuttingDown => 4,
            OrchestrationState::Done(Verdict::Success) => 5,
            OrchestrationState::Done(Verdict::Failure) => 6,
        }
    }

    fn decode(raw: u8) -> Self {
        match raw {
            0 => OrchestrationState::Idle,
            1 => OrchestrationState::Built,
            2 => OrchestrationState::Launched,
            3 => OrchestrationState::Running,
            4 => OrchestrationState::ShuttingDown,
            5 => OrchestrationState::Done(Verdict::Success),
            _ => OrchestrationState::Done(Verdict::Failure),
        }
    }

    /// Position in the lifecycle; both `Done` variants share the last rank.
    fn rank(self) -> u8 {
        self.encode().min(5)
    }
}

/// Forward-only state holder.
#[derive(Debug)]
pub struct StateCell {
    raw: AtomicU8,
}

impl StateCell {
    pub fn new() -> Self {
        Self {
            raw: AtomicU8::new(OrchestrationState::Idle.encode()),
        }
    }

    pub fn get(&self) -> OrchestrationState {
        OrchestrationState::decode(self.raw.load(Ordering::Acquire))
    }

    /// Move to `next` if it lies strictly ahead of the current state.
    ///
    /// Returns `false` (and leaves the state alone) for backward moves,
    /// repeated moves, and anything after `Done`.
    pub fn advance(&self, next: OrchestrationState) -> bool {
        self.raw
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                let current = OrchestrationState::decode(raw);
                (next.rank() > current.rank()).then(|| next.encode())
            })
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_forward_and_may_skip_states() {
        let cell = StateCell::new();
        assert!(cell.advance(OrchestrationState::Built));
        assert!(cell.advance(OrchestrationState::Running));
        assert_eq!(cell.get(), OrchestrationState::Running);
    }

    #[test]
    fn rejects_backward_and_repeated_moves() {
        let cell = StateCell::new();
        assert!(cell.advance(OrchestrationState::ShuttingDown));
        assert!(!cell.advance(OrchestrationState::ShuttingDown));
        assert!(!cell.advance(OrchestrationState::Running));
        assert_eq!(cell.get(), OrchestrationState::ShuttingDown);
    }

    #[test]
    fn done_is_terminal() {
        let cell = StateCell::new();
        assert!(cell.advance(OrchestrationState::Done(Verdict::Failure)));
        assert!(!cell.advance(OrchestrationState::Done(Verdict::Success)));
        assert_eq!(cell.get(), OrchestrationState::Done(Verdict::Failure));
        assert!(matches!(cell.get(), OrchestrationState::Done(_)));
    }
}
