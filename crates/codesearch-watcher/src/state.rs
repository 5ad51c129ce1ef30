//! Per-source watcher state machine (§4.6):
//! `Idle → Pending (events accumulating) → Running (pass in progress) →
//! Idle | Pending (if events arrived during Running)`.
//!
//! A pass failure returns the source to `Idle` — it is recorded, not
//! treated as disabling the watcher.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Pending,
    Running { events_arrived_during_run: bool },
}

/// Tracks one source's watch state. Not thread-safe on its own; callers
/// hold it behind a lock keyed by `source_id`.
#[derive(Debug, Clone, Copy)]
pub struct SourceWatch {
    state: WatchState,
}

impl Default for SourceWatch {
    fn default() -> Self {
        Self { state: WatchState::Idle }
    }
}

impl SourceWatch {
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// A filesystem event arrived for this source.
    pub fn record_event(&mut self) {
        self.state = match self.state {
            WatchState::Idle | WatchState::Pending => WatchState::Pending,
            WatchState::Running { .. } => WatchState::Running {
                events_arrived_during_run: true,
            },
        };
    }

    /// The quiescence window elapsed with the source `Pending`. Returns
    /// `true` if a pass should start now, transitioning to `Running`.
    pub fn try_start_pass(&mut self) -> bool {
        if matches!(self.state, WatchState::Pending) {
            self.state = WatchState::Running {
                events_arrived_during_run: false,
            };
            true
        } else {
            false
        }
    }

    /// The in-flight pass completed (successfully or not). Moves to
    /// `Pending` if events accumulated during the run, else `Idle`.
    pub fn finish_pass(&mut self) {
        self.state = match self.state {
            WatchState::Running { events_arrived_during_run: true } => WatchState::Pending,
            _ => WatchState::Idle,
        };
    }
}
