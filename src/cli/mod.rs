//! Defines netproject's CLI through clap types.

mod replay;
mod split;

use std::{borrow::Cow, env, path::Path};

use clap::{ArgEnum, Parser};

pub use self::replay::ReplayCommand;
pub use self::split::SplitCommand;

/// Command line options that netproject accepts, defined using the clap crate.
#[derive(Debug, Parser)]
#[clap(name = "netproject", version, about)]
pub struct Options {
    #[clap(flatten)]
    pub global: GlobalOptions,

    /// Subcommand to run in this invocation.
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Options {
    pub fn run(self) -> anyhow::Result<()> {
        match self.subcommand {
            Subcommand::Replay(subcommand) => subcommand.run(self.global),
            Subcommand::Split(subcommand) => subcommand.run(),
        }
    }
}

#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Sets verbosity level. Can be specified multiple times.
    #[clap(long("verbose"), short, global(true), parse(from_occurrences))]
    pub verbosity: u8,

    /// Set color behavior.
    #[clap(long("color"), global(true), arg_enum, default_value("auto"))]
    pub color: ColorChoice,
}

impl GlobalOptions {
    /// The `env_logger` filter used when `RUST_LOG` isn't set. Each `-v`
    /// opens up one more level of the engine's own logging before everything
    /// else is let through.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "info,netproject=debug",
            2 => "info,netproject=trace",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl From<ColorChoice> for termcolor::ColorChoice {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => termcolor::ColorChoice::Auto,
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
        }
    }
}

impl From<ColorChoice> for env_logger::WriteStyle {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => env_logger::WriteStyle::Auto,
            ColorChoice::Always => env_logger::WriteStyle::Always,
            ColorChoice::Never => env_logger::WriteStyle::Never,
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Replay(ReplayCommand),
    Split(SplitCommand),
}

pub(super) fn resolve_path(path: &Path) -> anyhow::Result<Cow<'_, Path>> {
    if path.is_absolute() {
        Ok(Cow::Borrowed(path))
    } else {
        Ok(Cow::Owned(env::current_dir()?.join(path)))
    }
}
