/*!
 * Trace Parsing
 * Reads the whitespace-separated process trace replayed by a run
 */

use super::types::Process;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Trace file errors
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("cannot read trace file: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace line {line}: expected 4 fields `arrival pid memory job-time`, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("trace line {line}: `{value}` is not an integer")]
    InvalidNumber { line: usize, value: String },
}

/// Parse a trace from any buffered reader.
///
/// One process per line: `arrival_time pid memory_bytes job_time`,
/// whitespace-separated. Blank lines are skipped. Processes are returned in
/// file order; the scheduler relies on arrival times being non-decreasing
/// the way the generator emits them.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<Process>, TraceError> {
    let mut processes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let number = index + 1;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(TraceError::FieldCount {
                line: number,
                found: fields.len(),
            });
        }
        let mut parsed = [0i64; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| TraceError::InvalidNumber {
                line: number,
                value: (*field).to_string(),
            })?;
        }
        processes.push(Process::new(parsed[0], parsed[1], parsed[2], parsed[3]));
    }
    debug!("parsed {} processes from trace", processes.len());
    Ok(processes)
}

/// Load a trace file from disk.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<Process>, TraceError> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file))
}
