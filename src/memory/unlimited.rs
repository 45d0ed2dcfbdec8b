/*!
 * Unlimited Allocator
 * The degenerate strategy: memory is never scarce
 */

use super::{Allocator, MemoryResult};
use crate::core::types::{Size, Tick};
use crate::output::{Event, EventLog};
use crate::process::Process;

/// Allocator with no memory model at all. Every request succeeds, nothing
/// loads, nothing faults, nothing is ever evicted.
#[derive(Debug, Default)]
pub struct UnlimitedAllocator;

impl UnlimitedAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for UnlimitedAllocator {
    fn require_allocation(&self, _process: &Process) -> Size {
        0
    }

    fn allocate(
        &mut self,
        _process: &Process,
        _clock: Tick,
        _log: &mut EventLog,
    ) -> MemoryResult<()> {
        Ok(())
    }

    fn status(&self, process: &Process, clock: Tick, log: &mut EventLog) {
        log.emit(Event::RunningUnbounded {
            clock,
            pid: process.pid,
            remaining_time: process.remaining_time,
        });
    }

    fn load_time_left(&self, _process: &Process) -> Tick {
        0
    }

    fn load(&mut self, _process: &Process) {}

    fn touch(&mut self, _process: &Process, _clock: Tick) {}

    fn page_fault(&self, _process: &Process) -> Size {
        0
    }

    fn free(&mut self, _process: &Process, _clock: Tick, _log: &mut EventLog) {}
}
