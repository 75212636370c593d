use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use sarge::analyzer::TrendAnalyzer;
use sarge::collector::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DataCollector, FetchConfig, FetchError,
};
use sarge::http::ReqwestTransport;
use sarge::pipeline::Pipeline;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// sarge - market data collection and pricing strategy pipeline
///
/// Fetches market data from an authenticated JSON API, retrying non-200
/// responses with capped exponential backoff, then analyzes the trend and
/// proposes a pricing strategy.
///
/// Examples:
///   sarge --endpoint https://api.example.com/data collect
///   SARGE_API_KEY=... sarge --endpoint https://api.example.com/data run
#[derive(Parser, Debug)]
#[command(author, version = env!("SARGE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data source URL (also via SARGE_ENDPOINT)
    #[arg(long, env = "SARGE_ENDPOINT", value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    /// Bearer token for the data source (also via SARGE_API_KEY)
    #[arg(
        long = "api-key",
        env = "SARGE_API_KEY",
        value_name = "TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// Maximum number of attempts per fetch
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Upper bound on the wait between attempts, in seconds
    #[arg(long = "retry-delay", value_name = "SECS", default_value_t = DEFAULT_BASE_DELAY, global = true)]
    pub retry_delay: f64,

    /// Per-attempt timeout, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch the data source once and print the processed payload
    Collect,

    /// Fetch the data source and print the market trend
    Analyze,

    /// Run the full pipeline: collect, analyze, generate and validate a strategy
    Run,
}

impl Cli {
    fn fetch_config(&self) -> Result<FetchConfig> {
        let endpoint = self
            .endpoint
            .clone()
            .context("No endpoint given; use --endpoint or SARGE_ENDPOINT")?;
        let api_key = self
            .api_key
            .clone()
            .context("No API key given; use --api-key or SARGE_API_KEY")?;

        let config = FetchConfig::builder(api_key, endpoint)
            .max_attempts(self.max_attempts)
            .base_delay(self.retry_delay)
            .attempt_timeout(Duration::from_secs(self.timeout))
            .build()?;
        Ok(config)
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    debug!("Interrupt received");
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = cli.fetch_config()?;
    debug!("Using {:?}", config);

    let transport = ReqwestTransport::with_defaults().context("Failed to build HTTP client")?;
    let collector = DataCollector::new(config, Arc::new(transport));

    match cli.command {
        Commands::Collect => {
            let data = collector.fetch_until(ctrl_c()).await?;
            print_json(&collector.process_data(data))?;
        }
        Commands::Analyze => {
            let data = collector.fetch_until(ctrl_c()).await?;
            let report = TrendAnalyzer::new()
                .analyze_market_trends(&data)
                .context("Failed to analyze market data")?;
            print_json(&report)?;
        }
        Commands::Run => {
            let pipeline = Pipeline::new(collector);
            let report = tokio::select! {
                result = pipeline.run() => result?,
                _ = ctrl_c() => return Err(FetchError::Cancelled.into()),
            };
            print_json(&report)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_collect_parsing() {
        let cli = Cli::try_parse_from([
            "sarge",
            "--endpoint",
            "http://localhost/data",
            "--api-key",
            "secret",
            "collect",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Collect));
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost/data"));
        assert_eq!(cli.max_attempts, 3);
        assert_eq!(cli.retry_delay, 1.0);
        assert_eq!(cli.timeout, 30);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sarge",
            "run",
            "--max-attempts",
            "5",
            "--retry-delay",
            "2.5",
            "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Run));
        assert_eq!(cli.max_attempts, 5);
        assert_eq!(cli.retry_delay, 2.5);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["sarge", "--endpoint", "http://localhost"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_config_from_flags() {
        let cli = Cli::try_parse_from([
            "sarge",
            "--endpoint",
            "http://localhost/data",
            "--api-key",
            "secret",
            "--timeout",
            "5",
            "analyze",
        ])
        .unwrap();
        let config = cli.fetch_config().unwrap();
        assert_eq!(config.endpoint(), "http://localhost/data");
        assert_eq!(config.credential(), "secret");
        assert_eq!(config.attempt_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_fetch_config_rejects_zero_attempts() {
        let cli = Cli::try_parse_from([
            "sarge",
            "--endpoint",
            "http://localhost/data",
            "--api-key",
            "secret",
            "--max-attempts",
            "0",
            "collect",
        ])
        .unwrap();
        let err = cli.fetch_config().unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }
}
