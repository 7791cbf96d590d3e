//! `mq sim` — run a deterministic invariant campaign against the engine.

use std::io::Write;

use anyhow::bail;
use clap::Args;

use marquee_core::EngineConfig;
use marquee_sim::{CampaignConfig, run_campaign};

use crate::output::{OutputMode, render, section};

#[derive(Args, Debug)]
pub struct SimArgs {
    /// Number of seeds to run.
    #[arg(long, default_value_t = 50)]
    pub seeds: u64,

    /// Operations per seed.
    #[arg(long, default_value_t = 40)]
    pub steps: u32,
}

pub fn run_sim(args: &SimArgs, config: EngineConfig, output: OutputMode) -> anyhow::Result<()> {
    let campaign = CampaignConfig {
        seed_range: 0..args.seeds,
        steps: args.steps,
        engine: config,
        ..CampaignConfig::default()
    };
    let report = run_campaign(&campaign)?;

    render(output, &report, |report, w| {
        section(w, "campaign")?;
        writeln!(w, "seeds run:    {}", report.seeds_run)?;
        writeln!(w, "seeds passed: {}", report.seeds_passed)?;
        if let Some(seed) = report.first_failure {
            writeln!(w, "first failure: seed {seed}")?;
            for failure in &report.failures {
                for violation in &failure.violations {
                    writeln!(w, "  [{}] {violation}", failure.seed)?;
                }
            }
        }
        Ok(())
    })?;

    if !report.all_passed() {
        bail!(
            "campaign failed: {} of {} seeds violated invariants",
            report.failures.len(),
            report.seeds_run
        );
    }
    Ok(())
}
