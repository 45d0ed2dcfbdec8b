/*!
 * Process Record
 * The unit of work replayed by the simulator
 */

use crate::core::types::{Pid, Size, Tick};
use serde::{Deserialize, Serialize};

/// One traced process.
///
/// Owned by the scheduler for the whole run; allocators only ever see a
/// shared reference and key their own records by `pid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub arrival_time: Tick,
    /// Requested memory footprint in bytes
    pub memory: Size,
    /// Total CPU time the job needs
    pub job_time: Tick,
    /// CPU time still owed; counts down while executing
    pub remaining_time: Tick,
    /// Tick of the last execution unit, `-1` until finished
    pub finish_time: Tick,
}

impl Process {
    pub fn new(arrival_time: Tick, pid: Pid, memory: Size, job_time: Tick) -> Self {
        Self {
            pid,
            arrival_time,
            memory,
            job_time,
            remaining_time: job_time,
            finish_time: -1,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_time <= 0
    }

    /// Turnaround time once finished
    pub fn turnaround(&self) -> Tick {
        self.finish_time - self.arrival_time
    }
}
