mod check;
mod completions;
mod list;

use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use list::ListCommand;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for fallout_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "fallout")]
#[command(version)]
#[command(about = "Inspect deletion side-effect manifests")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Install the log subscriber. `RUST_LOG` takes precedence over `-v`.
    pub fn init_tracing(&self) -> Result<()> {
        let default = match self.verbose {
            0 => "warn",
            1 => "warn,fallout=debug,fallout_engine=debug,fallout_manifest=debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
        Ok(())
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(cmd) => cmd.run(),
            Commands::List(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate fallout.toml and build its handlers
    Check(CheckCommand),

    /// List deleted types and the handlers reacting to them
    List(ListCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
