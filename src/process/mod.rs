/*!
 * Process Management
 * Process records and trace input
 */

pub mod trace;
pub mod types;

pub use trace::{load_trace, parse_trace, TraceError};
pub use types::Process;
