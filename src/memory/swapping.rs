/*!
 * Swapping Allocator
 * Contiguous allocation with first-fit placement and LRU eviction
 *
 * A process is resident as exactly one occupied fragment. When no hole fits,
 * least-recently-executed processes are swapped out whole until one does.
 * Every placement pays full reload cost: swapping has no notion of a page
 * already being warm.
 */

use super::fragment::FragmentList;
use super::types::{pages_required, usage_percent, MemoryError, MemoryResult};
use super::Allocator;
use crate::core::limits::LOADING_TIME_PER_PAGE;
use crate::core::types::{Size, Tick};
use crate::output::{Event, EventLog};
use crate::process::Process;
use log::{info, trace, warn};

pub struct SwappingAllocator {
    fragments: FragmentList,
    loading_time_per_page: Tick,
}

impl SwappingAllocator {
    pub fn new(memory_size: Size, page_size: Size) -> Self {
        Self {
            fragments: FragmentList::new(memory_size, page_size),
            loading_time_per_page: LOADING_TIME_PER_PAGE,
        }
    }

    pub fn with_loading_time(mut self, ticks_per_page: Tick) -> Self {
        self.loading_time_per_page = ticks_per_page;
        self
    }

    pub fn fragments(&self) -> &FragmentList {
        &self.fragments
    }
}

impl Allocator for SwappingAllocator {
    fn require_allocation(&self, process: &Process) -> Size {
        match self.fragments.fragment_of(process.pid) {
            Some(_) => 0,
            None => -1,
        }
    }

    fn allocate(
        &mut self,
        process: &Process,
        clock: Tick,
        log: &mut EventLog,
    ) -> MemoryResult<()> {
        let pages = pages_required(process.memory, self.fragments.page_size());
        loop {
            if let Some(hole) = self.fragments.first_fit(pages) {
                let placed =
                    self.fragments
                        .allocate_at(hole, process.pid, pages, self.loading_time_per_page);
                info!(
                    "first fit for pid {} ({} pages) is at page {}",
                    process.pid,
                    pages,
                    self.fragments.get(placed).page_start
                );
                return Ok(());
            }
            warn!(
                "insufficient memory for process {} requiring {} bytes",
                process.pid, process.memory
            );
            let victim = match self.fragments.find_least_recently_used() {
                Some(index) => index,
                None => {
                    return Err(MemoryError::OutOfMemory {
                        pid: process.pid,
                        requested_pages: pages,
                        total_pages: self.fragments.total_pages(),
                    })
                }
            };
            log.emit_evicted(clock, self.fragments.get(victim).page_addresses());
            self.fragments.evict(victim);
        }
    }

    fn status(&self, process: &Process, clock: Tick, log: &mut EventLog) {
        let fragment = self
            .fragments
            .fragment_of(process.pid)
            .expect("status for a process with no resident fragment");
        log.emit(Event::Running {
            clock,
            pid: process.pid,
            remaining_time: process.remaining_time,
            load_time: fragment.load_time,
            usage_percent: usage_percent(
                self.fragments.pages_in_use(),
                self.fragments.total_pages(),
            ),
            addresses: fragment.page_addresses(),
        });
    }

    fn load_time_left(&self, process: &Process) -> Tick {
        self.fragments
            .fragment_of(process.pid)
            .map(|f| f.load_time)
            .unwrap_or(-1)
    }

    fn load(&mut self, process: &Process) {
        if let Some(fragment) = self.fragments.fragment_of_mut(process.pid) {
            if fragment.load_time > 0 {
                fragment.load_time -= 1;
                trace!(
                    "loading pages for process {}, ETA {} ticks",
                    process.pid,
                    fragment.load_time
                );
            }
        }
    }

    fn touch(&mut self, process: &Process, clock: Tick) {
        self.fragments
            .fragment_of_mut(process.pid)
            .expect("touch for a process with no resident fragment")
            .last_access = clock;
    }

    fn page_fault(&self, _process: &Process) -> Size {
        // A swapped-in process is fully resident.
        0
    }

    fn free(&mut self, process: &Process, clock: Tick, log: &mut EventLog) {
        let mut index = 0;
        while index < self.fragments.len() {
            if self.fragments.get(index).owner() == Some(process.pid) {
                log.emit_evicted(clock, self.fragments.get(index).page_addresses());
                index = self.fragments.evict(index) + 1;
            } else {
                index += 1;
            }
        }
    }
}
