//! `mq events`, `mq users`, `mq matches` — read-only catalog projections.

use std::io::Write;

use clap::Args;

use marquee_core::{EngineConfig, Event, Match, User};

use crate::output::{OutputMode, render, section};
use crate::seed::{self, SeedArgs};

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub seed: SeedArgs,
}

/// One human-readable line per event.
pub fn event_line(event: &Event) -> String {
    format!(
        "{}  {:<8}  day {:<4} {}",
        event.id.short(),
        event.coord.to_string(),
        event.day,
        join_labels(event.categories.iter())
    )
}

/// One human-readable line per user.
pub fn user_line(user: &User) -> String {
    format!(
        "{}  {:<8}  day {:<4} {}",
        user.id.short(),
        user.coord.to_string(),
        user.birthday,
        join_labels(user.favorites.iter())
    )
}

/// One human-readable line per match pair.
pub fn match_line(pair: &Match) -> String {
    format!("{} -> {}", pair.event.short(), pair.user.short())
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a String>) -> String {
    let joined = labels.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

pub fn run_events(
    args: &CatalogArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;
    let events: Vec<Event> = catalog
        .event_ids
        .iter()
        .filter_map(|id| catalog.engine.event(*id).ok().cloned())
        .collect();

    render(output, &events, |events, w| {
        section(w, &format!("events ({})", events.len()))?;
        for event in events {
            writeln!(w, "{}", event_line(event))?;
        }
        Ok(())
    })
}

pub fn run_users(
    args: &CatalogArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;
    let users: Vec<User> = catalog
        .user_ids
        .iter()
        .filter_map(|id| catalog.engine.user(*id).ok().cloned())
        .collect();

    render(output, &users, |users, w| {
        section(w, &format!("users ({})", users.len()))?;
        for user in users {
            writeln!(w, "{}", user_line(user))?;
        }
        Ok(())
    })
}

pub fn run_matches(
    args: &CatalogArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;
    let mut matches: Vec<Match> = catalog.engine.matches().iter().copied().collect();
    matches.sort_unstable();

    render(output, &matches, |matches, w| {
        section(w, &format!("matches ({})", matches.len()))?;
        for pair in matches {
            writeln!(w, "{}", match_line(pair))?;
        }
        Ok(())
    })
}
