/*!
 * Simulation Limits and Constants
 *
 * Centralized location for the fixed parameters of the simulated machine.
 */

use super::types::{Size, Tick};

/// Size of one page/frame in bytes
pub const PAGE_SIZE: Size = 4;

/// Ticks needed to move one page between disk and memory
pub const LOADING_TIME_PER_PAGE: Tick = 2;

/// Minimum resident pages before a paged process may execute
///
/// A process whose full footprint is smaller than this only needs its own
/// page count resident.
pub const MIN_PAGES_TO_RUN: Size = 4;

/// Default round-robin quantum in ticks
pub const DEFAULT_QUANTUM: Tick = 10;

/// Width of one throughput window in the end-of-run summary
pub const THROUGHPUT_WINDOW: Tick = 60;
