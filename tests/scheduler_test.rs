/*!
 * Simulation Tests
 * Whole-trace replays asserting the exact results stream and summary
 */

use memsched::memory::AllocatorKind;
use memsched::{parse_trace, Discipline, EventLog, Report, SimConfig, Simulation};
use pretty_assertions::assert_eq;

fn replay(config: &SimConfig, trace: &str) -> Report {
    let processes = parse_trace(trace.as_bytes()).unwrap();
    Simulation::new(config, EventLog::capture())
        .expect("valid configuration")
        .run(processes)
}

fn lines(report: &Report) -> Vec<String> {
    report.events.iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_fcfs_unlimited_replay() {
    let config = SimConfig {
        discipline: Discipline::Fcfs,
        allocator: AllocatorKind::Unlimited,
        ..SimConfig::default()
    };
    let report = replay(&config, "0 1 100 5\n2 2 50 3\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, RUNNING, id=1, remaining-time=5",
            "5, FINISHED, id=1, proc-remaining=1",
            "5, RUNNING, id=2, remaining-time=3",
            "8, FINISHED, id=2, proc-remaining=0",
        ]
    );
    assert_eq!(report.summary.makespan, 8);
    // Turnarounds 5 and 6, ceiling average.
    assert_eq!(report.summary.turnaround_avg, 6);
    assert_eq!(report.summary.overhead_max, 2.0);
    assert_eq!(report.summary.overhead_avg, 11.0 / 8.0);
    assert_eq!(report.summary.throughput_avg, 2);
}

#[test]
fn test_fcfs_swapping_pays_load_time_before_executing() {
    let config = SimConfig {
        discipline: Discipline::Fcfs,
        allocator: AllocatorKind::Swapping,
        memory_size: 100,
        ..SimConfig::default()
    };
    let report = replay(&config, "0 1 20 3\n0 2 40 2\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, RUNNING, id=1, remaining-time=3, load-time=10, mem-usage=20%, mem-addresses=[0,1,2,3,4]",
            "13, EVICTED, mem-addresses=[0,1,2,3,4]",
            "13, FINISHED, id=1, proc-remaining=1",
            "13, RUNNING, id=2, remaining-time=2, load-time=20, mem-usage=40%, mem-addresses=[0,1,2,3,4,5,6,7,8,9]",
            "35, EVICTED, mem-addresses=[0,1,2,3,4,5,6,7,8,9]",
            "35, FINISHED, id=2, proc-remaining=0",
        ]
    );
    assert_eq!(report.summary.makespan, 35);
}

#[test]
fn test_fcfs_swapping_oom_finishes_without_running() {
    let config = SimConfig {
        discipline: Discipline::Fcfs,
        allocator: AllocatorKind::Swapping,
        memory_size: 8,
        ..SimConfig::default()
    };
    // 100 bytes can never fit in 2 pages; the run continues with pid 2.
    let report = replay(&config, "0 1 100 5\n0 2 4 1\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, FINISHED, id=1, proc-remaining=1",
            "0, RUNNING, id=2, remaining-time=1, load-time=2, mem-usage=50%, mem-addresses=[0]",
            "3, EVICTED, mem-addresses=[0]",
            "3, FINISHED, id=2, proc-remaining=0",
        ]
    );
    let starved = &report.finished[0];
    assert_eq!(starved.pid, 1);
    assert_eq!(starved.remaining_time, 5);
    assert_eq!(starved.finish_time, 0);
}

#[test]
fn test_round_robin_virtual_memory_steals_frames_each_slice() {
    let config = SimConfig {
        discipline: Discipline::RoundRobin,
        allocator: AllocatorKind::VirtualLru,
        memory_size: 16,
        quantum: 2,
        ..SimConfig::default()
    };
    let report = replay(&config, "0 1 16 4\n0 2 16 4\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, RUNNING, id=1, remaining-time=4, load-time=8, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "2, EVICTED, mem-addresses=[0,1,2,3]",
            "2, RUNNING, id=2, remaining-time=4, load-time=8, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "4, EVICTED, mem-addresses=[0,1,2,3]",
            "4, RUNNING, id=1, remaining-time=2, load-time=16, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "6, EVICTED, mem-addresses=[0,1,2,3]",
            "6, FINISHED, id=1, proc-remaining=1",
            "6, RUNNING, id=2, remaining-time=2, load-time=16, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "8, EVICTED, mem-addresses=[0,1,2,3]",
            "8, FINISHED, id=2, proc-remaining=0",
        ]
    );
}

#[test]
fn test_round_robin_charges_a_page_fault_penalty_tick() {
    let config = SimConfig {
        discipline: Discipline::RoundRobin,
        allocator: AllocatorKind::VirtualLru,
        memory_size: 16,
        ..SimConfig::default()
    };
    // 8 pages wanted, 4 frames resident: one penalty tick on dispatch.
    let report = replay(&config, "0 1 32 2\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, RUNNING, id=1, remaining-time=3, load-time=8, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "3, EVICTED, mem-addresses=[0,1,2,3]",
            "3, FINISHED, id=1, proc-remaining=0",
        ]
    );
}

#[test]
fn test_shortest_remaining_emits_only_finish_lines() {
    let config = SimConfig {
        discipline: Discipline::ShortestRemaining,
        allocator: AllocatorKind::Unlimited,
        ..SimConfig::default()
    };
    let report = replay(&config, "0 1 10 5\n0 2 10 2\n1 3 10 1\n");
    assert_eq!(
        lines(&report),
        vec![
            "1, FINISHED, id=2, proc-remaining=2",
            "2, FINISHED, id=3, proc-remaining=1",
            "7, FINISHED, id=1, proc-remaining=0",
        ]
    );
}

#[test]
fn test_virtual_memory_load_time_never_delays_execution() {
    let config = SimConfig {
        discipline: Discipline::Fcfs,
        allocator: AllocatorKind::VirtualLru,
        memory_size: 16,
        ..SimConfig::default()
    };
    // Accrued loading time shows in the status line but costs no ticks.
    let report = replay(&config, "0 1 16 2\n");
    assert_eq!(
        lines(&report),
        vec![
            "0, RUNNING, id=1, remaining-time=2, load-time=8, mem-usage=100%, mem-addresses=[0,1,2,3]",
            "2, EVICTED, mem-addresses=[0,1,2,3]",
            "2, FINISHED, id=1, proc-remaining=0",
        ]
    );
    assert_eq!(report.summary.makespan, 2);
}

#[test]
fn test_summary_renders_after_a_run() {
    let config = SimConfig {
        discipline: Discipline::Fcfs,
        allocator: AllocatorKind::Unlimited,
        ..SimConfig::default()
    };
    let report = replay(&config, "0 1 10 5\n");
    assert_eq!(
        report.summary.to_string(),
        "Throughput 1 1 1\nTurnaround time 5\nTime overhead 1.00 1.00\nMakespan 5\n"
    );
}
