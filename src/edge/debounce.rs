use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::{Duration, Instant};

use crate::domain::entity::EdgeSignal;

/// Time-based debouncer for a single edge signal.
///
/// An edge is accepted when at least `quiet_interval` has passed since the
/// last accepted edge. Rejected edges leave the stored tick untouched.
#[derive(Debug, Clone, Copy)]
pub struct DebounceGate {
    last_accepted: Instant,
    quiet_interval: Duration,
}

impl DebounceGate {
    /// Seeding with the start tick suppresses edges caused by lines settling
    /// during startup.
    pub const fn new(start: Instant, quiet_interval: Duration) -> Self {
        Self {
            last_accepted: start,
            quiet_interval,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        let quiet = now
            .checked_duration_since(self.last_accepted)
            .is_some_and(|elapsed| elapsed >= self.quiet_interval);

        if quiet {
            self.last_accepted = now;
        }
        quiet
    }

    pub const fn last_accepted(&self) -> Instant {
        self.last_accepted
    }
}

/// Debounce gates of both pipelines, shareable with interrupt context.
///
/// Detection and removal edges never debounce against each other.
pub struct EdgeGates {
    gates: Mutex<CriticalSectionRawMutex, RefCell<[DebounceGate; 2]>>,
}

impl EdgeGates {
    pub const fn new(start: Instant, quiet_interval: Duration) -> Self {
        let gate = DebounceGate::new(start, quiet_interval);
        Self {
            gates: Mutex::new(RefCell::new([gate, gate])),
        }
    }

    pub fn accept(&self, signal: EdgeSignal, now: Instant) -> bool {
        self.gates
            .lock(|cell| cell.borrow_mut()[signal.index()].accept(now))
    }

    pub fn last_accepted(&self, signal: EdgeSignal) -> Instant {
        self.gates
            .lock(|cell| cell.borrow()[signal.index()].last_accepted())
    }
}
