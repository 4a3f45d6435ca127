use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxrate::cli::convert::ConvertRequest;
use fxrate::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print the rate between two currencies on a date
    Convert {
        /// Date as YYYY-MM-DD
        date: String,
        /// Currency converted from, e.g. GBP
        base: String,
        /// Currency converted to, e.g. USD
        counter: String,
        /// Rate source key
        #[arg(short, long)]
        source: Option<String>,
        /// Local feed snapshot to read instead of fetching
        #[arg(long)]
        store: Option<PathBuf>,
        /// Fail when the date has no published rates
        #[arg(long)]
        strict: bool,
    },
    /// Download the latest feed snapshot into the data directory
    Fetch {
        /// Rate source key
        #[arg(default_value = "ecb")]
        source: String,
    },
}

impl From<Commands> for fxrate::AppCommand {
    fn from(cmd: Commands) -> fxrate::AppCommand {
        match cmd {
            Commands::Convert {
                date,
                base,
                counter,
                source,
                store,
                strict,
            } => fxrate::AppCommand::Convert(ConvertRequest {
                date,
                base,
                counter,
                source,
                store,
                strict,
            }),
            Commands::Fetch { source } => fxrate::AppCommand::Fetch { source },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxrate::cli::setup::setup(),
        Some(cmd) => fxrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
