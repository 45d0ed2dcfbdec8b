/*!
 * Memory Types
 * Common types and page arithmetic for the allocator strategies
 */

use crate::core::types::{Pid, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryError {
    #[error(
        "out of memory: process {pid} needs {requested_pages} pages but only {total_pages} exist and nothing is left to evict"
    )]
    OutOfMemory {
        pid: Pid,
        requested_pages: Size,
        total_pages: Size,
    },
}

/// Allocator strategy selected at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocatorKind {
    Unlimited,
    Swapping,
    VirtualLru,
    VirtualLfu,
}

/// Pages needed to hold `bytes`. Rounds UP: a partial page still costs a
/// whole one.
pub fn pages_required(bytes: Size, page_size: Size) -> Size {
    (bytes + page_size - 1) / page_size
}

/// Pages a contiguous run of `bytes` can hold. Rounds DOWN: a partial page
/// is unusable.
pub fn pages_available(bytes: Size, page_size: Size) -> Size {
    bytes / page_size
}

/// Memory usage as an integer percentage, rounded up.
pub fn usage_percent(in_use: Size, total: Size) -> Size {
    (in_use * 100 + total - 1) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_pages_round_up() {
        assert_eq!(pages_required(98, 4), 25);
        assert_eq!(pages_required(100, 4), 25);
        assert_eq!(pages_required(1, 4), 1);
        assert_eq!(pages_required(5, 4), 2);
    }

    #[test]
    fn available_pages_round_down() {
        assert_eq!(pages_available(99, 4), 24);
        assert_eq!(pages_available(100, 4), 25);
        assert_eq!(pages_available(3, 4), 0);
    }

    #[test]
    fn usage_percentage_rounds_up() {
        assert_eq!(usage_percent(1, 3), 34);
        assert_eq!(usage_percent(3, 3), 100);
        assert_eq!(usage_percent(0, 3), 0);
        assert_eq!(usage_percent(205, 250), 82);
    }
}
