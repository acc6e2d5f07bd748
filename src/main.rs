#![deny(unsafe_code)]
pub mod commands;
mod version;

use anyhow::Result;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Custom styles for CLI help output
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());
use commands::assemble::Assemble;
use commands::command::Command;
use commands::pair::Pair;
use commands::resolve::Resolve;
use enum_dispatch::enum_dispatch;
use env_logger::Env;
use log::info;

#[derive(Parser, Debug)]
#[command(styles = STYLES)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
#[command(version)]
enum Subcommand {
    // Pairing
    #[command(display_order = 1)]
    Pair(Pair),
    #[command(display_order = 2)]
    Resolve(Resolve),

    // Utilities
    #[command(display_order = 3)]
    Assemble(Assemble),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let args = Args::parse();

    info!("Running tnpair version {}", version::VERSION);
    args.subcommand.execute(&command_line)
}
