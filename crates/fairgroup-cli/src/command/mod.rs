use clap::{Parser, Subcommand};

use self::{group::GroupArg, inspect::InspectArg, score::ScoreArg};

mod group;
mod inspect;
mod score;
mod settings;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to do with the input table (runs `group` with defaults when no arguments are given)
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Split the population into balanced, representative groups
    Group(#[clap(flatten)] GroupArg),
    /// Show every trait's distinct values and their proportions
    Inspect(#[clap(flatten)] InspectArg),
    /// Re-score the grouping stored in a JSON report
    Score(#[clap(flatten)] ScoreArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Group(GroupArg::default())) {
        Mode::Group(arg) => group::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::Score(arg) => score::run(&arg)?,
    }
    Ok(())
}
