//! Fetch scheduler collaborator.
//!
//! Submission never blocks: the orchestrator hands a command over and returns
//! to the refresh cycle. Execution and completion delivery belong to the
//! host, which resolves each command by calling
//! [`FeatureUpdater::complete`](super::FeatureUpdater::complete) on the same
//! cooperative loop.

use std::collections::VecDeque;

use super::command::FetchCommand;

/// Accepts fetch commands for asynchronous execution.
pub trait FetchScheduler {
    fn execute(&mut self, command: FetchCommand);
}

/// Default scheduler: a FIFO the host drains each cycle.
#[derive(Debug, Default)]
pub struct QueueScheduler {
    queue: VecDeque<FetchCommand>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next command to execute, oldest first.
    pub fn pop(&mut self) -> Option<FetchCommand> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FetchScheduler for QueueScheduler {
    fn execute(&mut self, command: FetchCommand) {
        self.queue.push_back(command);
    }
}
