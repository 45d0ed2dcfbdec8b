/*!
 * Results Stream
 * Typed event log for the deterministic simulation output
 *
 * Every allocation, eviction and completion is recorded as a typed event and
 * mirrored, line by line, to an optional sink. The rendered lines are the
 * run's observable output; the recorded values are what tests assert on.
 */

use crate::core::types::{Pid, Size, Tick};
use log::warn;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// One line of the results stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    /// Pages or frames reclaimed from memory; addresses ascending.
    Evicted { clock: Tick, addresses: Vec<Size> },
    /// A process dispatched by a memory-bounded allocator.
    Running {
        clock: Tick,
        pid: Pid,
        remaining_time: Tick,
        load_time: Tick,
        usage_percent: Size,
        addresses: Vec<Size>,
    },
    /// A process dispatched with unbounded memory; no memory fields.
    RunningUnbounded {
        clock: Tick,
        pid: Pid,
        remaining_time: Tick,
    },
    /// A process completed; `proc_remaining` counts processes still waiting.
    Finished {
        clock: Tick,
        pid: Pid,
        proc_remaining: usize,
    },
}

fn write_addresses(f: &mut fmt::Formatter<'_>, addresses: &[Size]) -> fmt::Result {
    write!(f, "[")?;
    for (i, address) in addresses.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", address)?;
    }
    write!(f, "]")
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Evicted { clock, addresses } => {
                write!(f, "{}, EVICTED, mem-addresses=", clock)?;
                write_addresses(f, addresses)
            }
            Event::Running {
                clock,
                pid,
                remaining_time,
                load_time,
                usage_percent,
                addresses,
            } => {
                write!(
                    f,
                    "{}, RUNNING, id={}, remaining-time={}, load-time={}, mem-usage={}%, mem-addresses=",
                    clock, pid, remaining_time, load_time, usage_percent
                )?;
                write_addresses(f, addresses)
            }
            Event::RunningUnbounded {
                clock,
                pid,
                remaining_time,
            } => write!(
                f,
                "{}, RUNNING, id={}, remaining-time={}",
                clock, pid, remaining_time
            ),
            Event::Finished {
                clock,
                pid,
                proc_remaining,
            } => write!(
                f,
                "{}, FINISHED, id={}, proc-remaining={}",
                clock, pid, proc_remaining
            ),
        }
    }
}

/// Records every event of a run and mirrors it to a sink.
pub struct EventLog {
    events: Vec<Event>,
    sink: Option<Box<dyn Write>>,
}

impl EventLog {
    /// Log that renders to stdout, as the simulator binary does.
    pub fn stdout() -> Self {
        Self {
            events: Vec::new(),
            sink: Some(Box::new(std::io::stdout())),
        }
    }

    /// Log that only records; used by tests to inspect the event sequence.
    pub fn capture() -> Self {
        Self {
            events: Vec::new(),
            sink: None,
        }
    }

    /// Log that renders into an arbitrary writer.
    pub fn to_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            events: Vec::new(),
            sink: Some(Box::new(writer)),
        }
    }

    pub fn emit(&mut self, event: Event) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = writeln!(sink, "{}", event) {
                warn!("results sink write failed: {}", e);
            }
        }
        self.events.push(event);
    }

    /// Convenience for the batched eviction line; sorts addresses ascending.
    pub fn emit_evicted(&mut self, clock: Tick, mut addresses: Vec<Size>) {
        addresses.sort_unstable();
        self.emit(Event::Evicted { clock, addresses });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the log, keeping the recorded events.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Rendered lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(Event::to_string).collect()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
