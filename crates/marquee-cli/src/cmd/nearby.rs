//! `mq nearby` — events within one grid cell of a point.

use std::io::Write;

use clap::Args;

use marquee_core::{Coord, EngineConfig, Event};

use crate::cmd::list::event_line;
use crate::output::{OutputMode, render, section};
use crate::seed::{self, SeedArgs};

#[derive(Args, Debug)]
pub struct NearbyArgs {
    /// Query origin, X component.
    #[arg(short, long)]
    pub x: u32,

    /// Query origin, Y component.
    #[arg(short, long)]
    pub y: u32,

    #[command(flatten)]
    pub seed: SeedArgs,
}

pub fn run_nearby(
    args: &NearbyArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;
    let origin = Coord::new(args.x, args.y);
    let found: Vec<Event> = catalog
        .engine
        .nearby_events(origin)
        .into_iter()
        .filter_map(|id| catalog.engine.event(id).ok().cloned())
        .collect();

    render(output, &found, |found, w| {
        section(w, &format!("events near {origin} ({})", found.len()))?;
        for event in found {
            writeln!(w, "{}", event_line(event))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::NearbyArgs;

    #[test]
    fn nearby_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: NearbyArgs,
        }
        let w = Wrapper::parse_from(["test", "-x", "3", "-y", "4"]);
        assert_eq!(w.args.x, 3);
        assert_eq!(w.args.y, 4);
        assert_eq!(w.args.seed.events, 8);
    }
}
