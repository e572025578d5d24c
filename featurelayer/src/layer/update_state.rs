//! Per-(tile, layer) update gating.
//!
//! Each tile owns one `LayerUpdateState` per layer, created lazily on first
//! visit. The state machine guarantees at most one fetch in flight per
//! (tile, layer) pair and gives the orchestrator a cheap permanent "no data
//! here" memo so ineligible tiles are skipped on every later frame without
//! re-evaluating geometry.
//!
//! # State Machine
//!
//! ```text
//! Idle    --new_try()-->                  Pending
//! Pending --success()-->                  Loaded
//! Pending --failure()-->                  Idle      (error counted)
//! Loaded  --new_try()-->                  Pending   (re-fetch)
//! any     --no_more_update_possible()--> Blocked   (terminal)
//! any     --reset()-->                    Idle      (external reset)
//! ```

/// Update state for one (tile, layer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// No fetch attempted, or the last attempt failed and may be retried.
    Idle,
    /// Exactly one fetch command is in flight.
    Pending,
    /// The last fetch completed and its meshes were integrated.
    Loaded,
    /// No data will ever be available here; terminal until reset.
    Blocked,
}

/// State machine gating fetch attempts for one (tile, layer) pair.
#[derive(Debug, Clone)]
pub struct LayerUpdateState {
    state: UpdateState,
    error_count: u32,
}

impl Default for LayerUpdateState {
    fn default() -> Self {
        Self {
            state: UpdateState::Idle,
            error_count: 0,
        }
    }
}

impl LayerUpdateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Number of failed fetch attempts since the last reset.
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Whether a new fetch attempt is allowed: true unless a fetch is in
    /// flight or the pair is permanently blocked.
    pub fn can_try_update(&self) -> bool {
        !matches!(self.state, UpdateState::Pending | UpdateState::Blocked)
    }

    /// Begin a fetch attempt. Precondition: `can_try_update()`.
    pub fn new_try(&mut self) {
        debug_assert!(self.can_try_update(), "new_try() without can_try_update()");
        self.state = UpdateState::Pending;
    }

    /// The in-flight fetch completed and was integrated.
    pub fn success(&mut self) {
        if self.state == UpdateState::Pending {
            self.state = UpdateState::Loaded;
        }
    }

    /// The in-flight fetch failed; release the gate so a later cycle may
    /// retry, and count the error for the handler's give-up decision.
    pub fn failure(&mut self) {
        if self.state == UpdateState::Blocked {
            return;
        }
        self.error_count += 1;
        if self.state == UpdateState::Pending {
            self.state = UpdateState::Idle;
        }
    }

    /// No data exists for this pair; block permanently.
    pub fn no_more_update_possible(&mut self) {
        self.state = UpdateState::Blocked;
    }

    /// External reset: back to `Idle`, error count cleared. The only way out
    /// of `Blocked`.
    pub fn reset(&mut self) {
        self.state = UpdateState::Idle;
        self.error_count = 0;
    }
}
