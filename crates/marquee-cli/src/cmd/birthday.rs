//! `mq birthday` — events scheduled near a seeded user's birthday.

use std::io::Write;

use anyhow::bail;
use clap::Args;

use marquee_core::{EngineConfig, Event};

use crate::cmd::list::event_line;
use crate::output::{CliError, OutputMode, render, render_error, section};
use crate::seed::{self, SeedArgs};

#[derive(Args, Debug)]
pub struct BirthdayArgs {
    /// Which seeded user to query for (0-based, in seeding order).
    #[arg(short, long)]
    pub user: usize,

    /// Window width in days. Defaults to the configured birthday window.
    #[arg(short, long)]
    pub window: Option<u32>,

    #[command(flatten)]
    pub seed: SeedArgs,
}

pub fn run_birthday(
    args: &BirthdayArgs,
    config: EngineConfig,
    seed: u64,
    output: OutputMode,
) -> anyhow::Result<()> {
    let catalog = seed::build(config, seed, args.seed.events, args.seed.users)?;

    let Some(user_id) = catalog.user_ids.get(args.user).copied() else {
        let err = CliError::with_hint(
            format!("no seeded user at index {}", args.user),
            format!("this catalog has {} users; try --users", catalog.user_ids.len()),
        );
        render_error(output, &err)?;
        bail!("{}", err.message);
    };

    let window = args.window.unwrap_or(config.birthday_window);
    let user = catalog.engine.user(user_id)?.clone();
    let found: Vec<Event> = catalog
        .engine
        .events_near_birthday(user_id, window)?
        .into_iter()
        .filter_map(|id| catalog.engine.event(id).ok().cloned())
        .collect();

    render(output, &found, |found, w| {
        section(
            w,
            &format!(
                "events within {window} days of user {}'s birthday (day {})",
                user.id.short(),
                user.birthday
            ),
        )?;
        for event in found {
            writeln!(w, "{}", event_line(event))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::BirthdayArgs;

    #[test]
    fn window_defaults_to_none() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: BirthdayArgs,
        }
        let w = Wrapper::parse_from(["test", "--user", "2"]);
        assert_eq!(w.args.user, 2);
        assert!(w.args.window.is_none());
    }
}
