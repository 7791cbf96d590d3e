//! `mq demo` — seed a catalog, show it, and dispatch the pending matches.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use tracing::info;

use marquee_core::{EngineConfig, Event, Match, User};

use crate::cmd::list::{event_line, match_line, user_line};
use crate::output::{OutputMode, render, section};
use crate::seed::{self, SeedArgs};

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub seed: SeedArgs,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    events: Vec<Event>,
    users: Vec<User>,
    dispatched: Vec<Match>,
}

pub fn run_demo(
    args: &DemoArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;

    let events: Vec<Event> = catalog
        .event_ids
        .iter()
        .filter_map(|id| catalog.engine.event(*id).ok().cloned())
        .collect();
    let users: Vec<User> = catalog
        .user_ids
        .iter()
        .filter_map(|id| catalog.engine.user(*id).ok().cloned())
        .collect();

    let dispatched = catalog.engine.take_pending();
    for pair in &dispatched {
        info!(event = %pair.event, user = %pair.user, "notification dispatched");
    }

    let report = DemoReport {
        events,
        users,
        dispatched,
    };
    render(output, &report, |report, w| {
        section(w, &format!("events ({})", report.events.len()))?;
        for event in &report.events {
            writeln!(w, "{}", event_line(event))?;
        }
        writeln!(w)?;
        section(w, &format!("users ({})", report.users.len()))?;
        for user in &report.users {
            writeln!(w, "{}", user_line(user))?;
        }
        writeln!(w)?;
        section(w, &format!("dispatched ({})", report.dispatched.len()))?;
        for pair in &report.dispatched {
            writeln!(w, "{}", match_line(pair))?;
        }
        Ok(())
    })
}
