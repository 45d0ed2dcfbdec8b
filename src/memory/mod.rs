/*!
 * Memory Management
 *
 * Three interchangeable allocation strategies behind one contract:
 *
 * - **Unlimited**: every request trivially succeeds
 * - **Swapping**: contiguous first-fit placement with LRU eviction over an
 *   address-ordered fragment list
 * - **Virtual memory**: demand paging with a minimum working set and a
 *   choice of LRU or LFU-with-aging frame eviction
 *
 * The scheduler drives an allocator once per tick per running process, in a
 * fixed order: `require_allocation`, then `allocate` when residency is
 * incomplete, then `status`, then `load_time_left`/`load` or execute plus
 * `touch`, and finally `free` after the last tick of execution.
 */

pub mod fragment;
pub mod paging;
pub mod swapping;
pub mod types;
pub mod unlimited;

pub use fragment::{Fragment, FragmentKind, FragmentList};
pub use paging::{EvictionPolicy, PageTable, VirtualMemory};
pub use swapping::SwappingAllocator;
pub use types::{
    pages_available, pages_required, usage_percent, AllocatorKind, MemoryError, MemoryResult,
};
pub use unlimited::UnlimitedAllocator;

use crate::config::SimConfig;
use crate::core::types::{Size, Tick};
use crate::output::EventLog;
use crate::process::Process;

/// The allocator contract shared by all strategies.
pub trait Allocator {
    /// Residency check: `0` when the process may execute, a positive count
    /// of pages still needed when partially resident, `-1` when the process
    /// has no record yet. The scheduler calls `allocate` only on a nonzero
    /// answer.
    fn require_allocation(&self, process: &Process) -> Size;

    /// Place the process, evicting other processes' memory as needed.
    /// Eviction side effects are emitted to `log`. Fails only on the
    /// permanent condition where the request can never fit.
    fn allocate(
        &mut self,
        process: &Process,
        clock: Tick,
        log: &mut EventLog,
    ) -> MemoryResult<()>;

    /// Emit the RUNNING status line for a dispatched process.
    fn status(&self, process: &Process, clock: Tick, log: &mut EventLog);

    /// Ticks of simulated disk transfer still required before execution.
    fn load_time_left(&self, process: &Process) -> Tick;

    /// One tick of disk transfer; called instead of executing while
    /// `load_time_left` is positive.
    fn load(&mut self, process: &Process);

    /// Mark the process's resident memory as referenced at `clock`.
    fn touch(&mut self, process: &Process, clock: Tick);

    /// Pages logically owned but not resident; a delay-penalty estimate for
    /// the scheduler, never used internally.
    fn page_fault(&self, process: &Process) -> Size;

    /// Release everything the process holds. Called exactly once, after its
    /// last tick of execution and before it is reported finished.
    fn free(&mut self, process: &Process, clock: Tick, log: &mut EventLog);
}

/// Build the allocator selected by the configuration.
pub fn build_allocator(config: &SimConfig) -> Box<dyn Allocator> {
    match config.allocator {
        AllocatorKind::Unlimited => Box::new(UnlimitedAllocator::new()),
        AllocatorKind::Swapping => Box::new(
            SwappingAllocator::new(config.memory_size, config.page_size)
                .with_loading_time(config.loading_time_per_page),
        ),
        AllocatorKind::VirtualLru => Box::new(
            VirtualMemory::new(config.memory_size, config.page_size, EvictionPolicy::Lru)
                .with_min_pages(config.min_pages_to_run)
                .with_loading_time(config.loading_time_per_page),
        ),
        AllocatorKind::VirtualLfu => Box::new(
            VirtualMemory::new(config.memory_size, config.page_size, EvictionPolicy::LfuAging)
                .with_min_pages(config.min_pages_to_run)
                .with_loading_time(config.loading_time_per_page),
        ),
    }
}
