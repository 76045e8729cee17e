//! Loading/ready state machine
//!
//! Counts successful asset completions against a batch size fixed at
//! construction and flips to ready exactly once, when the last one lands.
//! The reveal notification that actually unhides the scene is delayed by
//! [`REVEAL_DELAY`] so the progress bar is seen reaching 100%.
//!
//! Time is passed in as `Instant` values rather than read internally,
//! which keeps the transitions deterministic under test.

use std::time::{Duration, Instant};

/// Grace period between readiness and the one-shot reveal notification.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Aggregate progress of one scene's asset batch.
///
/// Invariants: `completed` never decreases, never exceeds `expected`, and
/// `ready` holds exactly when `completed == expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingState {
    completed: usize,
    expected: usize,
    ready: bool,
}

impl LoadingState {
    fn new(expected: usize) -> Self {
        Self {
            completed: 0,
            expected,
            // An empty batch must not wait for an increment that will
            // never happen.
            ready: expected == 0,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Fraction of the batch completed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.expected == 0 {
            1.0
        } else {
            self.completed as f32 / self.expected as f32
        }
    }
}

/// Tracks batch completion and owns the one-shot reveal transition.
pub struct ReadinessGate {
    state: LoadingState,
    ready_since: Option<Instant>,
    revealed: bool,
}

impl ReadinessGate {
    /// Creates a gate expecting `expected` successful completions. A zero
    /// batch is ready immediately; its reveal delay counts from `now`.
    pub fn new(expected: usize, now: Instant) -> Self {
        let state = LoadingState::new(expected);
        Self {
            ready_since: state.is_ready().then_some(now),
            state,
            revealed: false,
        }
    }

    /// Records one successful completion. Must be called once per success;
    /// calls past readiness are logged and ignored.
    pub fn on_asset_complete(&mut self, now: Instant) {
        if self.state.ready {
            log::warn!("asset completion reported after readiness; ignoring");
            return;
        }
        self.state.completed += 1;
        if self.state.completed == self.state.expected {
            self.state.ready = true;
            self.ready_since = Some(now);
        }
    }

    /// Idempotent, safe to poll. Never reverts to false.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn progress(&self) -> f32 {
        self.state.progress()
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    /// One-shot reveal: returns true exactly once, no earlier than
    /// [`REVEAL_DELAY`] after readiness.
    pub fn take_reveal(&mut self, now: Instant) -> bool {
        match self.ready_since {
            Some(since) if !self.revealed && now.duration_since(since) >= REVEAL_DELAY => {
                self.revealed = true;
                true
            }
            _ => false,
        }
    }

    /// Whether the reveal notification has already fired.
    pub fn revealed(&self) -> bool {
        self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after_delay(now: Instant) -> Instant {
        now + REVEAL_DELAY + Duration::from_millis(100)
    }

    #[test]
    fn test_full_batch_reaches_ready_once() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(4, t0);

        let mut progress = Vec::new();
        for _ in 0..4 {
            assert!(!gate.is_ready());
            gate.on_asset_complete(t0);
            progress.push(gate.progress());
        }

        assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(gate.is_ready());
        assert_eq!(gate.state().completed(), 4);
    }

    #[test]
    fn test_reveal_fires_exactly_once_after_delay() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(2, t0);
        gate.on_asset_complete(t0);
        gate.on_asset_complete(t0);

        // Not yet: the delay has not elapsed.
        assert!(!gate.take_reveal(t0));
        assert!(!gate.revealed());

        assert!(gate.take_reveal(after_delay(t0)));
        assert!(gate.revealed());

        // One-shot: never again, no matter how late.
        assert!(!gate.take_reveal(after_delay(after_delay(t0))));
    }

    #[test]
    fn test_incomplete_batch_never_reveals() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(3, t0);
        gate.on_asset_complete(t0);
        gate.on_asset_complete(t0);

        assert!(!gate.is_ready());
        assert!(!gate.take_reveal(after_delay(t0)));
        assert_eq!(gate.state().completed(), 2);
    }

    #[test]
    fn test_empty_batch_is_ready_at_construction() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(0, t0);

        assert!(gate.is_ready());
        assert_eq!(gate.progress(), 1.0);
        assert!(!gate.take_reveal(t0));
        assert!(gate.take_reveal(after_delay(t0)));
    }

    #[test]
    fn test_is_ready_is_idempotent() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(1, t0);
        gate.on_asset_complete(t0);

        for _ in 0..10 {
            assert!(gate.is_ready());
        }
    }

    #[test]
    fn test_extra_completions_are_ignored() {
        let t0 = Instant::now();
        let mut gate = ReadinessGate::new(1, t0);
        gate.on_asset_complete(t0);
        gate.on_asset_complete(t0);

        assert_eq!(gate.state().completed(), 1);
        assert_eq!(gate.progress(), 1.0);
    }
}
