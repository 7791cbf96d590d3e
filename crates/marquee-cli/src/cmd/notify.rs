//! `mq notify` — drain pending recommendations and dispatch notifications.
//!
//! The engine guarantees each pair is surfaced exactly once per process;
//! dispatch here is a structured log line per pair, standing in for a real
//! delivery channel.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use tracing::info;

use marquee_core::{EngineConfig, Match};

use crate::cmd::list::match_line;
use crate::output::{OutputMode, render, section};
use crate::seed::{self, SeedArgs};

#[derive(Args, Debug)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub seed: SeedArgs,
}

#[derive(Debug, Serialize)]
struct DispatchReport {
    dispatched: Vec<Match>,
    remaining: usize,
}

pub fn run_notify(
    args: &NotifyArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;

    let dispatched = catalog.engine.take_pending();
    for pair in &dispatched {
        info!(event = %pair.event, user = %pair.user, "notification dispatched");
    }

    let report = DispatchReport {
        remaining: catalog.engine.matches().len() - catalog.engine.delivered().len(),
        dispatched,
    };
    render(output, &report, |report, w| {
        section(w, &format!("dispatched ({})", report.dispatched.len()))?;
        for pair in &report.dispatched {
            writeln!(w, "{}", match_line(pair))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use crate::seed;
    use marquee_core::EngineConfig;

    #[test]
    fn second_drain_is_empty_within_one_process() {
        let mut catalog = seed::build(EngineConfig::default(), 42, 10, 10).expect("build");
        let first = catalog.engine.take_pending();
        let second = catalog.engine.take_pending();
        assert!(second.is_empty());
        assert_eq!(catalog.engine.delivered().len(), first.len());
    }
}
