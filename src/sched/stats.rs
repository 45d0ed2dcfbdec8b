/*!
 * Run Summary
 * Aggregate performance statistics over the finished processes
 */

use crate::core::limits::THROUGHPUT_WINDOW;
use crate::core::types::Tick;
use crate::process::Process;
use serde::Serialize;
use std::fmt;

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

/// End-of-run statistics.
///
/// Throughput counts completions per 60-tick window; averages round up to
/// whole units, overheads stay fractional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub throughput_avg: i64,
    pub throughput_min: i64,
    pub throughput_max: i64,
    pub turnaround_avg: Tick,
    pub overhead_max: f64,
    pub overhead_avg: f64,
    pub makespan: Tick,
}

impl Summary {
    pub fn from_run(finished: &[Process], makespan: Tick) -> Self {
        if finished.is_empty() {
            return Self {
                throughput_avg: 0,
                throughput_min: 0,
                throughput_max: 0,
                turnaround_avg: 0,
                overhead_max: 0.0,
                overhead_avg: 0.0,
                makespan,
            };
        }

        let windows = ceil_div(makespan, THROUGHPUT_WINDOW).max(1);
        let mut per_window = vec![0i64; windows as usize];
        let mut total_turnaround = 0;
        let mut total_job_time = 0;
        let mut overhead_max = 0.0f64;
        for process in finished {
            let window = ((process.finish_time - 1).max(0) / THROUGHPUT_WINDOW) as usize;
            let idx = window.min(per_window.len() - 1);
            per_window[idx] += 1;
            let turnaround = process.turnaround();
            total_turnaround += turnaround;
            total_job_time += process.job_time;
            let overhead = turnaround as f64 / process.job_time as f64;
            if overhead > overhead_max {
                overhead_max = overhead;
            }
        }

        let total = finished.len() as i64;
        Self {
            throughput_avg: ceil_div(total, windows),
            throughput_min: per_window.iter().copied().min().unwrap_or(0),
            throughput_max: per_window.iter().copied().max().unwrap_or(0),
            turnaround_avg: ceil_div(total_turnaround, total),
            overhead_max,
            overhead_avg: total_turnaround as f64 / total_job_time as f64,
            makespan,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Throughput {} {} {}",
            self.throughput_avg, self.throughput_min, self.throughput_max
        )?;
        writeln!(f, "Turnaround time {}", self.turnaround_avg)?;
        writeln!(
            f,
            "Time overhead {:.2} {:.2}",
            self.overhead_max, self.overhead_avg
        )?;
        writeln!(f, "Makespan {}", self.makespan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn finished(pid: i64, arrival: Tick, job_time: Tick, finish: Tick) -> Process {
        let mut process = Process::new(arrival, pid, 0, job_time);
        process.remaining_time = 0;
        process.finish_time = finish;
        process
    }

    #[test]
    fn single_window_run() {
        let done = vec![finished(1, 0, 5, 5), finished(2, 0, 3, 8)];
        let summary = Summary::from_run(&done, 8);
        assert_eq!(summary.throughput_avg, 2);
        assert_eq!(summary.throughput_min, 2);
        assert_eq!(summary.throughput_max, 2);
        // Turnarounds 5 and 8, ceiling of 13/2.
        assert_eq!(summary.turnaround_avg, 7);
        assert_eq!(summary.overhead_max, 8.0 / 3.0);
        assert_eq!(summary.overhead_avg, 13.0 / 8.0);
        assert_eq!(summary.makespan, 8);
    }

    #[test]
    fn completions_bucket_into_sixty_tick_windows() {
        let done = vec![
            finished(1, 0, 10, 60),  // window 0
            finished(2, 0, 10, 61),  // window 1
            finished(3, 0, 10, 110), // window 1
        ];
        let summary = Summary::from_run(&done, 120);
        assert_eq!(summary.throughput_min, 1);
        assert_eq!(summary.throughput_max, 2);
        assert_eq!(summary.throughput_avg, 2); // ceil(3/2)
    }

    #[test]
    fn empty_run_reports_zeros() {
        let summary = Summary::from_run(&[], 0);
        assert_eq!(summary.throughput_avg, 0);
        assert_eq!(summary.turnaround_avg, 0);
        assert_eq!(summary.makespan, 0);
    }

    #[test]
    fn display_matches_report_format() {
        let done = vec![finished(1, 0, 5, 5)];
        let summary = Summary::from_run(&done, 5);
        assert_eq!(
            summary.to_string(),
            "Throughput 1 1 1\nTurnaround time 5\nTime overhead 1.00 1.00\nMakespan 5\n"
        );
    }
}
