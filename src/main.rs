/*!
 * memsched - Main Entry Point
 *
 * Parses the command line, loads the process trace and replays it through
 * the configured scheduler and allocator. Results go to stdout; diagnostic
 * logging goes to stderr under `RUST_LOG` control.
 */

use anyhow::{Context, Result};
use log::info;
use memsched::{load_trace, EventLog, SimConfig, Simulation};

const USAGE: &str = "usage: memsched -f <trace> -a ff|rr|cs -m u|p|v|cm [-s <bytes>] [-q <ticks>]";

fn main() -> Result<()> {
    env_logger::init();

    let config = SimConfig::from_args(std::env::args().skip(1)).context(USAGE)?;
    let path = config
        .trace_path
        .as_ref()
        .context("no trace file configured")?;
    let processes =
        load_trace(path).with_context(|| format!("cannot load trace {}", path.display()))?;

    info!(
        "replaying {} processes: {:?} scheduling, {:?} allocation",
        processes.len(),
        config.discipline,
        config.allocator
    );

    let report = Simulation::new(&config, EventLog::stdout())?.run(processes);
    print!("{}", report.summary);
    Ok(())
}
