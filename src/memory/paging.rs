/*!
 * Virtual Memory Allocator
 * Demand paging over per-process page tables and a global frame table
 *
 * A process gets a page table sized to its full footprint but may execute
 * once a minimum working set is resident. Frames are claimed lowest-index
 * first; under pressure a victim frame is chosen by LRU (oldest process,
 * its lowest frame) or LFU-with-aging (smallest decayed reference counter).
 */

use super::types::{pages_required, usage_percent, MemoryError, MemoryResult};
use super::Allocator;
use crate::core::limits::{LOADING_TIME_PER_PAGE, MIN_PAGES_TO_RUN};
use crate::core::types::{Pid, Size, Tick};
use crate::output::{Event, EventLog};
use crate::process::Process;
use log::{debug, info, trace};

/// High bit OR-ed into the aging counter of a referenced frame.
const AGING_HIGH_BIT: u8 = 0x80;

/// Frame eviction policy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    Lru,
    LfuAging,
}

/// One virtual page's mapping state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTableEntry {
    pub valid: bool,
    /// Physical frame index when valid, `-1` otherwise
    pub frame: Size,
    /// Set on every execution tick, harvested by the aging pass
    pub referenced: bool,
}

impl PageTableEntry {
    fn unmapped() -> Self {
        Self {
            valid: false,
            frame: -1,
            referenced: false,
        }
    }
}

/// Per-process page table.
#[derive(Debug, Clone)]
pub struct PageTable {
    pub pid: Pid,
    /// Total virtual pages the process needs
    pub page_count: Size,
    /// Pages currently resident; always the count of valid entries
    pub valid_page_count: Size,
    /// Accrued disk transfer time, reported in status lines
    pub loading_time_left: Tick,
    pub last_access: Tick,
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    fn new(pid: Pid, page_count: Size) -> Self {
        Self {
            pid,
            page_count,
            valid_page_count: 0,
            loading_time_left: 0,
            last_access: -1,
            entries: vec![PageTableEntry::unmapped(); page_count as usize],
        }
    }

    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }

    /// Map `frame` into the first unmapped entry.
    fn map(&mut self, frame: Size) -> bool {
        for entry in &mut self.entries {
            if !entry.valid {
                entry.valid = true;
                entry.frame = frame;
                self.valid_page_count += 1;
                return true;
            }
        }
        false
    }

    /// Unmap whichever entry holds `frame`.
    fn unmap_frame(&mut self, frame: Size) -> bool {
        for entry in &mut self.entries {
            if entry.valid && entry.frame == frame {
                entry.valid = false;
                entry.frame = -1;
                self.valid_page_count -= 1;
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone)]
struct FrameSlot {
    owner: Option<Pid>,
    counter: u8,
}

/// Global frame occupancy and reference-frequency table.
#[derive(Debug, Clone)]
pub struct FrameTable {
    slots: Vec<FrameSlot>,
    free_frames: Size,
}

impl FrameTable {
    fn new(total_frames: Size) -> Self {
        Self {
            slots: vec![
                FrameSlot {
                    owner: None,
                    counter: 0,
                };
                total_frames as usize
            ],
            free_frames: total_frames,
        }
    }

    pub fn total_frames(&self) -> Size {
        self.slots.len() as Size
    }

    pub fn free_frames(&self) -> Size {
        self.free_frames
    }

    pub fn owner(&self, frame: Size) -> Option<Pid> {
        self.slots[frame as usize].owner
    }

    pub fn counter(&self, frame: Size) -> u8 {
        self.slots[frame as usize].counter
    }

    /// Frames owned by `pid`, ascending.
    pub fn frames_of(&self, pid: Pid) -> Vec<Size> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.owner == Some(pid))
            .map(|(index, _)| index as Size)
            .collect()
    }

    fn first_frame_of(&self, pid: Pid) -> Option<Size> {
        self.slots
            .iter()
            .position(|slot| slot.owner == Some(pid))
            .map(|index| index as Size)
    }

    /// Claim the lowest-index free frame for `pid`.
    fn claim_first_free(&mut self, pid: Pid) -> Option<Size> {
        let index = self.slots.iter().position(|slot| slot.owner.is_none())?;
        self.slots[index].owner = Some(pid);
        self.slots[index].counter = 0;
        self.free_frames -= 1;
        Some(index as Size)
    }

    fn release(&mut self, frame: Size) {
        let slot = &mut self.slots[frame as usize];
        slot.owner = None;
        slot.counter = 0;
        self.free_frames += 1;
    }

    /// Occupied frame with the smallest counter not owned by `exclude`;
    /// scan order breaks ties toward the lowest index.
    fn min_counter_frame_excluding(&self, exclude: Pid) -> Option<Size> {
        let mut found: Option<(usize, u8)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot.owner {
                Some(owner) if owner != exclude => match found {
                    Some((_, best)) if slot.counter >= best => {}
                    _ => found = Some((index, slot.counter)),
                },
                _ => {}
            }
        }
        found.map(|(index, _)| index as Size)
    }

    /// One aging step for `frame`: shift the counter right and, when the
    /// frame was referenced, set the high bit.
    fn age(&mut self, frame: Size, referenced: bool) {
        let slot = &mut self.slots[frame as usize];
        slot.counter >>= 1;
        if referenced {
            slot.counter |= AGING_HIGH_BIT;
        }
    }
}

/// The paged allocator.
pub struct VirtualMemory {
    frames: FrameTable,
    /// Insertion-ordered page tables; order breaks LRU ties
    tables: Vec<PageTable>,
    page_size: Size,
    policy: EvictionPolicy,
    min_pages_to_run: Size,
    loading_time_per_page: Tick,
}

impl VirtualMemory {
    pub fn new(memory_size: Size, page_size: Size, policy: EvictionPolicy) -> Self {
        Self {
            frames: FrameTable::new(memory_size / page_size),
            tables: Vec::new(),
            page_size,
            policy,
            min_pages_to_run: MIN_PAGES_TO_RUN,
            loading_time_per_page: LOADING_TIME_PER_PAGE,
        }
    }

    pub fn with_min_pages(mut self, pages: Size) -> Self {
        self.min_pages_to_run = pages;
        self
    }

    pub fn with_loading_time(mut self, ticks_per_page: Tick) -> Self {
        self.loading_time_per_page = ticks_per_page;
        self
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.frames
    }

    pub fn table_of(&self, pid: Pid) -> Option<&PageTable> {
        self.tables.iter().find(|t| t.pid == pid)
    }

    pub fn tables(&self) -> impl Iterator<Item = &PageTable> {
        self.tables.iter()
    }

    fn table_of_mut(&mut self, pid: Pid) -> Option<&mut PageTable> {
        self.tables.iter_mut().find(|t| t.pid == pid)
    }

    /// Resident pages needed before execution is permitted.
    fn run_target(&self, page_count: Size) -> Size {
        self.min_pages_to_run.min(page_count)
    }

    /// Greedily map every free frame into `pid`'s table, lowest index
    /// first, charging loading time per page actually fetched.
    fn claim_free_frames(&mut self, pid: Pid) {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.pid == pid)
            .expect("claiming frames for a process with no page table");
        while self.frames.free_frames() > 0 && table.valid_page_count < table.page_count {
            let frame = self
                .frames
                .claim_first_free(pid)
                .expect("free-frame count disagrees with the frame table");
            table.map(frame);
            table.loading_time_left += self.loading_time_per_page;
        }
    }

    /// Pick a victim frame under the configured policy, never one of the
    /// requester's own.
    fn victim_frame(&self, requester: Pid) -> Option<Size> {
        match self.policy {
            EvictionPolicy::Lru => {
                let mut oldest: Option<&PageTable> = None;
                for table in &self.tables {
                    if table.pid == requester || table.valid_page_count == 0 {
                        continue;
                    }
                    match oldest {
                        Some(best) if table.last_access >= best.last_access => {}
                        _ => oldest = Some(table),
                    }
                }
                oldest.and_then(|table| self.frames.first_frame_of(table.pid))
            }
            EvictionPolicy::LfuAging => self.frames.min_counter_frame_excluding(requester),
        }
    }

    fn evict_frame(&mut self, frame: Size) {
        let owner = self
            .frames
            .owner(frame)
            .expect("evicting a frame nobody owns");
        let table = self
            .table_of_mut(owner)
            .expect("frame owner has no page table");
        let unmapped = table.unmap_frame(frame);
        assert!(
            unmapped,
            "frame {} owned by {} is missing from its page table",
            frame, owner
        );
        self.frames.release(frame);
    }

    /// Shift every mapped frame's counter, folding in harvested reference
    /// bits; runs on every execution tick.
    fn aging_pass(&mut self) {
        for table in &mut self.tables {
            for entry in &mut table.entries {
                if entry.valid {
                    self.frames.age(entry.frame, entry.referenced);
                    if entry.referenced {
                        entry.referenced = false;
                    }
                }
            }
        }
    }
}

impl Allocator for VirtualMemory {
    fn require_allocation(&self, process: &Process) -> Size {
        match self.table_of(process.pid) {
            None => -1,
            Some(table) => {
                let target = self.run_target(table.page_count);
                if table.valid_page_count >= target {
                    0
                } else {
                    target - table.valid_page_count
                }
            }
        }
    }

    fn allocate(
        &mut self,
        process: &Process,
        clock: Tick,
        log: &mut EventLog,
    ) -> MemoryResult<()> {
        let page_count = pages_required(process.memory, self.page_size);
        if self.table_of(process.pid).is_none() {
            info!(
                "creating page table for process {} ({} pages)",
                process.pid, page_count
            );
            self.tables.push(PageTable::new(process.pid, page_count));
        }
        self.claim_free_frames(process.pid);

        let target = self.run_target(page_count);
        let mut evicted = Vec::new();
        while self
            .table_of(process.pid)
            .map(|t| t.valid_page_count)
            .unwrap_or(0)
            < target
        {
            let victim = match self.victim_frame(process.pid) {
                Some(frame) => frame,
                None => {
                    return Err(MemoryError::OutOfMemory {
                        pid: process.pid,
                        requested_pages: target,
                        total_pages: self.frames.total_frames(),
                    })
                }
            };
            self.evict_frame(victim);
            evicted.push(victim);
            self.claim_free_frames(process.pid);
        }
        if !evicted.is_empty() {
            log.emit_evicted(clock, evicted);
        }
        Ok(())
    }

    fn status(&self, process: &Process, clock: Tick, log: &mut EventLog) {
        let table = self
            .table_of(process.pid)
            .expect("status for a process with no page table");
        log.emit(Event::Running {
            clock,
            pid: process.pid,
            remaining_time: process.remaining_time,
            load_time: table.loading_time_left,
            usage_percent: usage_percent(
                self.frames.total_frames() - self.frames.free_frames(),
                self.frames.total_frames(),
            ),
            addresses: self.frames.frames_of(process.pid),
        });
    }

    fn load_time_left(&self, _process: &Process) -> Tick {
        // Paged allocation simulates no transfer delay; the accrued loading
        // time only appears in status lines.
        0
    }

    fn load(&mut self, process: &Process) {
        if let Some(table) = self.table_of_mut(process.pid) {
            if table.loading_time_left > 0 {
                table.loading_time_left -= 1;
                trace!(
                    "process {} loading, ETA {} ticks",
                    process.pid,
                    table.loading_time_left
                );
            }
        }
    }

    fn touch(&mut self, process: &Process, clock: Tick) {
        let table = self
            .table_of_mut(process.pid)
            .expect("touch for a process with no page table");
        table.last_access = clock;
        for entry in &mut table.entries {
            entry.referenced = true;
        }
        self.aging_pass();
    }

    fn page_fault(&self, process: &Process) -> Size {
        let table = self
            .table_of(process.pid)
            .expect("page-fault query for a process with no page table");
        table.page_count - table.valid_page_count
    }

    fn free(&mut self, process: &Process, clock: Tick, log: &mut EventLog) {
        let index = self
            .tables
            .iter()
            .position(|t| t.pid == process.pid)
            .expect("freeing a process with no page table");
        let table = self.tables.remove(index);
        let freed = self.frames.frames_of(process.pid);
        for &frame in &freed {
            self.frames.release(frame);
        }
        debug!(
            "deallocated {} virtual pages of process {}",
            freed.len(),
            table.pid
        );
        log.emit_evicted(clock, freed);
    }
}
