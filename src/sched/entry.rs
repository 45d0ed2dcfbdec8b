/*!
 * Scheduler Entry Types
 * Heap ordering wrappers for process selection
 */

use crate::process::Process;
use std::cmp::Ordering;

/// Wrapper that turns the std max-heap into a shortest-remaining-time-first
/// queue: comparison is inverted so `BinaryHeap::pop` yields the process
/// with the least CPU time left, pid breaking ties for determinism.
#[derive(Debug, Clone)]
pub(super) struct ShortestFirst(pub Process);

impl PartialEq for ShortestFirst {
    fn eq(&self, other: &Self) -> bool {
        self.0.remaining_time == other.0.remaining_time && self.0.pid == other.0.pid
    }
}

impl Eq for ShortestFirst {}

impl Ord for ShortestFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.0.remaining_time, other.0.pid).cmp(&(self.0.remaining_time, self.0.pid))
    }
}

impl PartialOrd for ShortestFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
