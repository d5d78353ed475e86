use std::time::Duration;

// A tick result describes what a call to `App::tick()` did
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Number of deferred tasks that ran during this tick
    pub tasks_run: usize,
    /// Tasks still waiting for their deadline
    pub pending_tasks: usize,
    /// When should we trigger a next tick. None when no pending task has a
    /// reachable deadline.
    pub next_tick_in: Option<Duration>,
}

impl TickResult {
    pub fn is_idle(&self) -> bool {
        self.pending_tasks == 0
    }
}
