/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
///
/// Wide and signed on purpose: the trace format does not bound ids, and the
/// allocator contract reports `-1` sentinels through the same integer type.
pub type Pid = i64;

/// Simulated time in ticks
pub type Tick = i64;

/// Size type for memory amounts (bytes, pages and frames)
pub type Size = i64;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
