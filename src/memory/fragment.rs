/*!
 * Fragment List
 * Ordered arena of contiguous memory fragments for the swapping allocator
 *
 * The fragments always tile `[0, total_bytes)` exactly: every byte belongs
 * to one fragment, fragments are kept in ascending address order, and two
 * holes are never adjacent (merging is eager on eviction).
 */

use super::types::pages_available;
use crate::core::types::{Pid, Size, Tick};

/// What a fragment currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Hole,
    Occupied(Pid),
}

/// A contiguous run of bytes in the swapping address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub byte_start: Size,
    pub page_start: Size,
    pub byte_length: Size,
    pub page_length: Size,
    /// Tick the owning process last executed; `-1` for holes
    pub last_access: Tick,
    /// Ticks of disk transfer still owed; `-1` for holes
    pub load_time: Tick,
}

impl Fragment {
    fn hole(byte_start: Size, page_start: Size, byte_length: Size, page_length: Size) -> Self {
        Self {
            kind: FragmentKind::Hole,
            byte_start,
            page_start,
            byte_length,
            page_length,
            last_access: -1,
            load_time: -1,
        }
    }

    pub fn is_hole(&self) -> bool {
        self.kind == FragmentKind::Hole
    }

    pub fn owner(&self) -> Option<Pid> {
        match self.kind {
            FragmentKind::Hole => None,
            FragmentKind::Occupied(pid) => Some(pid),
        }
    }

    /// Page addresses covered by this fragment, ascending.
    pub fn page_addresses(&self) -> Vec<Size> {
        (self.page_start..self.page_start + self.page_length).collect()
    }
}

/// Address-ordered fragment arena.
///
/// Stored as a plain `Vec` indexed by position: splitting inserts the
/// remainder after the hole, merging removes the later fragment and grows
/// the earlier one.
#[derive(Debug, Clone)]
pub struct FragmentList {
    fragments: Vec<Fragment>,
    page_size: Size,
}

impl FragmentList {
    /// A list covering `memory_size` bytes as one big hole.
    pub fn new(memory_size: Size, page_size: Size) -> Self {
        let fragments = vec![Fragment::hole(
            0,
            0,
            memory_size,
            pages_available(memory_size, page_size),
        )];
        Self {
            fragments,
            page_size,
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, index: usize) -> &Fragment {
        &self.fragments[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Pages covered by the whole list.
    pub fn total_pages(&self) -> Size {
        self.fragments.iter().map(|f| f.page_length).sum()
    }

    /// Pages currently held by processes.
    pub fn pages_in_use(&self) -> Size {
        self.fragments
            .iter()
            .filter(|f| !f.is_hole())
            .map(|f| f.page_length)
            .sum()
    }

    /// First hole large enough for `pages` pages, scanning from address zero.
    pub fn first_fit(&self, pages: Size) -> Option<usize> {
        self.fragments
            .iter()
            .position(|f| f.is_hole() && f.page_length >= pages)
    }

    /// Occupied fragment owned by `pid`, if resident.
    pub fn fragment_of(&self, pid: Pid) -> Option<&Fragment> {
        self.fragments
            .iter()
            .find(|f| f.owner() == Some(pid))
    }

    pub fn fragment_of_mut(&mut self, pid: Pid) -> Option<&mut Fragment> {
        self.fragments
            .iter_mut()
            .find(|f| f.owner() == Some(pid))
    }

    /// Occupied fragment with the smallest `last_access`; scan order breaks
    /// ties in favor of the lowest address.
    pub fn find_least_recently_used(&self) -> Option<usize> {
        let mut found: Option<(usize, Tick)> = None;
        for (index, fragment) in self.fragments.iter().enumerate() {
            if fragment.is_hole() {
                continue;
            }
            match found {
                Some((_, best)) if fragment.last_access >= best => {}
                _ => found = Some((index, fragment.last_access)),
            }
        }
        found.map(|(index, _)| index)
    }

    /// Split the hole at `index` into an occupied prefix of exactly `pages`
    /// pages for `pid` plus a hole remainder (omitted when empty).
    ///
    /// The occupied byte length is `pages * page_size`, never the raw byte
    /// request, and the fragment is charged `loading_time_per_page * pages`
    /// of transfer time on every placement.
    pub fn allocate_at(
        &mut self,
        index: usize,
        pid: Pid,
        pages: Size,
        loading_time_per_page: Tick,
    ) -> usize {
        let required_bytes = pages * self.page_size;
        let fragment = &self.fragments[index];
        assert!(
            fragment.is_hole() && fragment.page_length >= pages,
            "allocation target must be a hole with room for {} pages",
            pages
        );

        let remainder_bytes = fragment.byte_length - required_bytes;
        let remainder = Fragment::hole(
            fragment.byte_start + required_bytes,
            fragment.page_start + pages,
            remainder_bytes,
            pages_available(remainder_bytes, self.page_size),
        );

        let fragment = &mut self.fragments[index];
        fragment.kind = FragmentKind::Occupied(pid);
        fragment.byte_length = required_bytes;
        fragment.page_length = pages;
        fragment.load_time = loading_time_per_page * pages;
        fragment.last_access = -1;

        if remainder.byte_length > 0 {
            self.fragments.insert(index + 1, remainder);
        }
        index
    }

    /// Revert the occupied fragment at `index` to a hole and merge it with
    /// hole neighbours. Returns the index of the merged hole.
    pub fn evict(&mut self, index: usize) -> usize {
        let fragment = &mut self.fragments[index];
        assert!(
            !fragment.is_hole(),
            "evicting a hole at byte {}",
            fragment.byte_start
        );
        fragment.kind = FragmentKind::Hole;
        fragment.load_time = -1;
        fragment.last_access = -1;

        let mut merged = index;
        if merged > 0 && self.fragments[merged - 1].is_hole() {
            merged = self.join_with_next(merged - 1);
        }
        if merged + 1 < self.fragments.len() && self.fragments[merged + 1].is_hole() {
            self.join_with_next(merged);
        }
        merged
    }

    /// Merge the hole at `index` with the hole right after it. The earlier
    /// fragment keeps its start; lengths are summed.
    fn join_with_next(&mut self, index: usize) -> usize {
        let removed = self.fragments.remove(index + 1);
        let kept = &mut self.fragments[index];
        assert!(
            kept.is_hole() && removed.is_hole(),
            "merging requires two adjacent holes"
        );
        kept.byte_length += removed.byte_length;
        kept.page_length = pages_available(kept.byte_length, self.page_size);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::{LOADING_TIME_PER_PAGE, PAGE_SIZE};
    use crate::memory::types::pages_required;
    use pretty_assertions::assert_eq;

    fn place(list: &mut FragmentList, pid: Pid, bytes: Size) -> usize {
        let pages = pages_required(bytes, list.page_size());
        let hole = list.first_fit(pages).expect("no fit");
        list.allocate_at(hole, pid, pages, LOADING_TIME_PER_PAGE)
    }

    /// Three processes of 20, 800 and 100 bytes in a 1000-byte space.
    fn populated() -> (FragmentList, usize, usize, usize) {
        let mut list = FragmentList::new(1000, PAGE_SIZE);
        let a = place(&mut list, 1, 20);
        let b = place(&mut list, 2, 800);
        let c = place(&mut list, 3, 100);
        (list, a, b, c)
    }

    #[test]
    fn first_fit_packs_from_address_zero() {
        let (list, ..) = populated();
        let starts: Vec<Size> = list.iter().map(|f| f.byte_start).collect();
        assert_eq!(starts, vec![0, 20, 820, 920]);
        assert_eq!(list.get(3).byte_length, 80);
        assert!(list.get(3).is_hole());
    }

    #[test]
    fn allocation_charges_load_time_per_page() {
        let (list, a, ..) = populated();
        assert_eq!(list.get(a).load_time, LOADING_TIME_PER_PAGE * 5);
    }

    #[test]
    fn exact_fit_leaves_no_remainder() {
        let mut list = FragmentList::new(100, PAGE_SIZE);
        place(&mut list, 1, 100);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).owner(), Some(1));
    }

    // Eviction between two occupied fragments: the hole stays put, unmerged.
    #[test]
    fn evict_between_processes() {
        let (mut list, _, b, _) = populated();
        let old = list.get(b).clone();
        let merged = list.evict(b);
        let hole = list.get(merged);
        assert!(hole.is_hole());
        assert_eq!(hole.byte_start, old.byte_start);
        assert_eq!(hole.byte_length, old.byte_length);
        assert_eq!(list.len(), 4);
    }

    // [Hole | evicted | Process] merges left.
    #[test]
    fn evict_merges_with_previous_hole() {
        let mut list = FragmentList::new(1000, PAGE_SIZE);
        let a = place(&mut list, 1, 20);
        place(&mut list, 2, 800);
        list.evict(a);
        place(&mut list, 3, 100);
        let merged = list.evict(list.index_of(2));
        let hole = list.get(merged);
        assert!(hole.is_hole());
        assert_eq!(hole.byte_start, 0);
        assert_eq!(hole.byte_length, 820);
    }

    // [Process | evicted | Hole] merges right.
    #[test]
    fn evict_merges_with_next_hole() {
        let (mut list, _, _, c) = populated();
        let merged = list.evict(c);
        let hole = list.get(merged);
        assert!(hole.is_hole());
        assert_eq!(hole.byte_start, 820);
        assert_eq!(hole.byte_length, 180);
    }

    // [Hole | evicted | Hole] collapses to a single full-space hole.
    #[test]
    fn evict_merges_both_sides() {
        let (mut list, ..) = populated();
        list.evict(list.index_of(1));
        list.evict(list.index_of(3));
        let merged = list.evict(list.index_of(2));
        let hole = list.get(merged);
        assert!(hole.is_hole());
        assert_eq!(hole.byte_start, 0);
        assert_eq!(hole.byte_length, 1000);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn least_recently_used_picks_smallest_last_access() {
        let (mut list, ..) = populated();
        list.fragment_of_mut(1).unwrap().last_access = 999;
        list.fragment_of_mut(2).unwrap().last_access = 888;
        list.fragment_of_mut(3).unwrap().last_access = 4;
        let victim = list.find_least_recently_used().unwrap();
        assert_eq!(list.get(victim).last_access, 4);
        assert_eq!(list.get(victim).owner(), Some(3));
    }

    #[test]
    fn least_recently_used_tie_breaks_to_lowest_address() {
        let (mut list, ..) = populated();
        list.fragment_of_mut(1).unwrap().last_access = 7;
        list.fragment_of_mut(2).unwrap().last_access = 7;
        list.fragment_of_mut(3).unwrap().last_access = 7;
        let victim = list.find_least_recently_used().unwrap();
        assert_eq!(list.get(victim).owner(), Some(1));
    }

    impl FragmentList {
        fn index_of(&self, pid: Pid) -> usize {
            self.fragments
                .iter()
                .position(|f| f.owner() == Some(pid))
                .unwrap()
        }
    }
}
