/*!
 * Scheduler
 * Tick-driven simulation loop over three scheduling disciplines
 *
 * The driver owns the clock, the process queues and the allocator, and
 * replays a trace deterministically. Within one tick the selected process's
 * allocation (including every eviction needed to reach its minimum
 * residency) completes before its execution step; eviction is never
 * deferred across ticks.
 */

mod entry;
pub mod stats;

pub use stats::Summary;

use crate::config::SimConfig;
use crate::core::types::{SimResult, Tick};
use crate::memory::{build_allocator, Allocator};
use crate::output::{Event, EventLog};
use crate::process::Process;
use entry::ShortestFirst;
use log::{info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, VecDeque};

/// Process-selection discipline replayed by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discipline {
    Fcfs,
    RoundRobin,
    ShortestRemaining,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Report {
    pub summary: Summary,
    pub events: Vec<Event>,
    pub finished: Vec<Process>,
}

/// One simulation run: a trace, a discipline and an allocator.
pub struct Simulation {
    allocator: Box<dyn Allocator>,
    log: EventLog,
    discipline: Discipline,
    quantum: Tick,
    clock: Tick,
    finished: Vec<Process>,
}

impl Simulation {
    /// Build a run from a validated configuration; bad parameters are
    /// rejected here, before any allocator exists.
    pub fn new(config: &SimConfig, log: EventLog) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            allocator: build_allocator(config),
            log,
            discipline: config.discipline,
            quantum: config.quantum,
            clock: 0,
            finished: Vec::new(),
        })
    }

    /// Replay `processes` to completion and return the run's report.
    pub fn run(mut self, processes: Vec<Process>) -> Report {
        match self.discipline {
            Discipline::Fcfs => self.run_fcfs(processes),
            Discipline::RoundRobin => self.run_round_robin(processes),
            Discipline::ShortestRemaining => self.run_shortest_remaining(processes),
        }
        Report {
            summary: Summary::from_run(&self.finished, self.clock),
            events: self.log.into_events(),
            finished: self.finished,
        }
    }

    /// Move every process that has arrived by `clock` from the pending
    /// queue into the suspended queue, simultaneous arrivals in pid order.
    fn admit_arrivals(
        pending: &mut VecDeque<Process>,
        suspended: &mut VecDeque<Process>,
        clock: Tick,
    ) {
        let mut batch = Vec::new();
        while let Some(process) = pending.front() {
            if process.arrival_time > clock {
                break;
            }
            batch.extend(pending.pop_front());
        }
        batch.sort_by_key(|p: &Process| p.pid);
        for process in batch {
            info!("process {} entered the suspended queue", process.pid);
            suspended.push_back(process);
        }
    }

    fn execute(process: &mut Process) {
        process.remaining_time -= 1;
        trace!(
            "process {} executing, ETA {} ticks",
            process.pid,
            process.remaining_time
        );
    }

    fn finish(&mut self, mut process: Process, proc_remaining: usize) {
        info!("process {} finished", process.pid);
        process.finish_time = self.clock;
        self.log.emit(Event::Finished {
            clock: self.clock,
            pid: process.pid,
            proc_remaining,
        });
        self.finished.push(process);
    }

    /// Non-preemptive first-come-first-served: each dispatched process runs
    /// to completion, loading before executing.
    fn run_fcfs(&mut self, processes: Vec<Process>) {
        let mut pending = VecDeque::from(processes);
        let mut suspended = VecDeque::new();

        while !pending.is_empty() || !suspended.is_empty() {
            Self::admit_arrivals(&mut pending, &mut suspended, self.clock);
            let mut process = match suspended.pop_front() {
                Some(process) => process,
                None => {
                    self.clock += 1;
                    continue;
                }
            };

            if self.allocator.require_allocation(&process) != 0 {
                if let Err(e) = self.allocator.allocate(&process, self.clock, &mut self.log) {
                    warn!("{}; process {} never runs", e, process.pid);
                    self.finish(process, suspended.len());
                    continue;
                }
            }
            self.allocator.status(&process, self.clock, &mut self.log);

            while process.remaining_time > 0 {
                if self.allocator.load_time_left(&process) > 0 {
                    self.allocator.load(&process);
                } else {
                    Self::execute(&mut process);
                    self.allocator.touch(&process, self.clock);
                }
                Self::admit_arrivals(&mut pending, &mut suspended, self.clock);
                self.clock += 1;
            }

            // Memory goes back before the process is reported finished.
            self.allocator.free(&process, self.clock, &mut self.log);
            self.finish(process, suspended.len());
        }
    }

    /// Preemptive round-robin: quantum-bounded slices, loading ticks do not
    /// consume quantum, outstanding page faults cost one penalty tick at
    /// dispatch.
    fn run_round_robin(&mut self, processes: Vec<Process>) {
        let mut pending = VecDeque::from(processes);
        let mut suspended = VecDeque::new();

        while !pending.is_empty() || !suspended.is_empty() {
            Self::admit_arrivals(&mut pending, &mut suspended, self.clock);
            let mut process = match suspended.pop_front() {
                Some(process) => process,
                None => {
                    self.clock += 1;
                    continue;
                }
            };

            if self.allocator.require_allocation(&process) != 0 {
                if let Err(e) = self.allocator.allocate(&process, self.clock, &mut self.log) {
                    warn!("{}; process {} never runs", e, process.pid);
                    self.finish(process, suspended.len());
                    continue;
                }
            }
            if self.allocator.page_fault(&process) > 0 {
                process.remaining_time += 1;
            }
            self.allocator.status(&process, self.clock, &mut self.log);

            let mut quantum_left = self.quantum;
            while quantum_left > 0 && process.remaining_time > 0 {
                if self.allocator.load_time_left(&process) > 0 {
                    self.allocator.load(&process);
                } else {
                    Self::execute(&mut process);
                    self.allocator.touch(&process, self.clock);
                    quantum_left -= 1;
                }
                self.clock += 1;
                Self::admit_arrivals(&mut pending, &mut suspended, self.clock);
            }

            if process.remaining_time > 0 {
                suspended.push_back(process);
            } else {
                self.allocator.free(&process, self.clock, &mut self.log);
                self.finish(process, suspended.len());
            }
        }
    }

    /// Shortest-remaining-time-first: one execution unit per dispatch from
    /// a min-heap keyed on remaining time. Emits no RUNNING lines.
    fn run_shortest_remaining(&mut self, processes: Vec<Process>) {
        let mut pending = VecDeque::new();
        let mut ready = BinaryHeap::new();
        for process in processes {
            if process.arrival_time > 0 {
                pending.push_back(process);
            } else {
                ready.push(ShortestFirst(process));
            }
        }

        while !pending.is_empty() || !ready.is_empty() {
            let mut batch = Vec::new();
            while let Some(process) = pending.front() {
                if process.arrival_time > self.clock {
                    break;
                }
                batch.extend(pending.pop_front());
            }
            batch.sort_by_key(|p: &Process| p.pid);
            for process in batch {
                info!("process {} entered the ready queue", process.pid);
                ready.push(ShortestFirst(process));
            }

            if let Some(ShortestFirst(mut process)) = ready.pop() {
                if self.allocator.require_allocation(&process) != 0 {
                    if let Err(e) = self.allocator.allocate(&process, self.clock, &mut self.log) {
                        warn!("{}; process {} never runs", e, process.pid);
                        self.finish(process, ready.len());
                        self.clock += 1;
                        continue;
                    }
                }

                if self.allocator.load_time_left(&process) > 0 {
                    self.allocator.load(&process);
                } else {
                    Self::execute(&mut process);
                    self.allocator.touch(&process, self.clock);
                }

                if process.remaining_time > 0 {
                    ready.push(ShortestFirst(process));
                } else {
                    self.allocator.free(&process, self.clock, &mut self.log);
                    self.finish(process, ready.len());
                }
            }
            self.clock += 1;
        }
    }
}
