pub mod cli;
pub mod config;
pub mod core;
pub mod exchange;
pub mod fetcher;
pub mod providers;

pub use crate::core::{FxError, TransactionDate};
pub use crate::exchange::{Exchange, ExchangeConfiguration, ExchangeOptions};

use crate::cli::convert::ConvertRequest;
use crate::fetcher::FetchOutcome;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Convert(ConvertRequest),
    Fetch { source: String },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxrate starting...");

    let config = config::AppConfig::resolve(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Convert(request) => {
            let rate = cli::convert::convert(&config, &request).await?;
            println!("{rate}");
        }
        AppCommand::Fetch { source } => match cli::fetch::fetch(&config, &source).await? {
            FetchOutcome::AlreadyCurrent(path) => {
                println!("The most recent data already exists at {}", path.display());
            }
            FetchOutcome::Saved(path) => println!("Saved rate data to {}", path.display()),
        },
    }
    Ok(())
}

/// Converts with the default settings: units of `counter` per one `base` on `date`.
///
/// ```no_run
/// # async fn example() -> anyhow::Result<()> {
/// let rate = fxrate::at("2017-07-21", "GBP", "USD").await?;
/// # Ok(())
/// # }
/// ```
pub async fn at(
    date: impl Into<TransactionDate> + Send,
    base: &str,
    counter: &str,
) -> Result<f64> {
    let config = config::AppConfig::resolve(None)?;
    let rate = Exchange::new(&config)
        .convert_at_date(date, base, counter)
        .await?;
    Ok(rate)
}
