//! Rest countdown between sets.
//!
//! Every `start` hands out a fresh [`RestHandle`]. Ticks carry the handle they
//! were scheduled for, so a tick belonging to a cancelled or replaced countdown
//! is recognised as stale and ignored instead of decrementing the live one.

use crate::RestState;

/// Identifies one scheduled countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RestHandle(u64);

/// What a tick did to the timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown still running with this many seconds left
    Running(u32),
    /// Countdown reached zero; the timer is idle again
    Expired,
    /// Tick did not belong to the live countdown
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct Countdown {
    handle: RestHandle,
    remaining: u32,
}

/// Single-slot countdown timer
#[derive(Debug, Default)]
pub struct RestTimer {
    generation: u64,
    active: Option<Countdown>,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, replacing any running one.
    ///
    /// A zero-length countdown still produces a handle but leaves the timer idle.
    pub fn start(&mut self, seconds: u32) -> RestHandle {
        if let Some(prev) = self.active.take() {
            tracing::debug!(
                "Rest timer restarted with {}s left on previous countdown",
                prev.remaining
            );
        }

        self.generation += 1;
        let handle = RestHandle(self.generation);
        if seconds > 0 {
            self.active = Some(Countdown {
                handle,
                remaining: seconds,
            });
        }
        handle
    }

    /// Apply one elapsed second to the countdown identified by `handle`.
    pub fn tick(&mut self, handle: RestHandle) -> TickOutcome {
        let Some(countdown) = self.active.as_mut() else {
            return TickOutcome::Stale;
        };
        if countdown.handle != handle {
            return TickOutcome::Stale;
        }

        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining == 0 {
            self.active = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(countdown.remaining)
        }
    }

    /// Stop the countdown. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Handle of the live countdown, if any
    pub fn handle(&self) -> Option<RestHandle> {
        self.active.map(|c| c.handle)
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.active.map_or(0, |c| c.remaining)
    }

    pub fn state(&self) -> RestState {
        RestState {
            is_resting: self.is_running(),
            seconds_remaining: self.seconds_remaining(),
        }
    }
}
