// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::error::ErrorKind;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use batch_forwarder::{
    config::ForwarderConfig,
    constants::{DEFAULT_LOG_LEVEL, DEFAULT_MAX_BATCH_SIZE, VALID_LOG_LEVELS},
    forwarder::Forwarder,
    sink::build_sink,
};

const USAGE: &str = "\
cat data.json | pipe2firehose [OPTIONS] <DESTINATION>
    pipe2firehose [OPTIONS] <DESTINATION> < data.json";

/// Pipe stdin line by line into a Kinesis Data Firehose delivery stream
#[derive(Debug, Parser)]
#[command(name = "pipe2firehose", version, override_usage = USAGE)]
struct Cli {
    /// Delivery stream every batch is addressed to
    destination: Option<String>,

    /// AWS region of the delivery stream; empty uses the ambient AWS configuration
    #[arg(long, default_value = "")]
    region: String,

    /// Time in ms to wait between each line read
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Number of records included per batch
    #[arg(
        long = "batch-size",
        visible_alias = "max-batch-size",
        value_name = "N",
        default_value_t = DEFAULT_MAX_BATCH_SIZE
    )]
    batch_size: usize,

    /// Send batches to this HTTP intake instead of Firehose
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// zstd level for HTTP intake payloads
    #[arg(long, value_name = "LEVEL")]
    compression_level: Option<i32>,

    /// Per-request timeout for the HTTP intake
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    timeout_secs: u64,
}

impl Cli {
    fn into_config(self, destination: String) -> ForwarderConfig {
        ForwarderConfig {
            region: Some(self.region).filter(|r| !r.is_empty()),
            delay: self.delay.map(Duration::from_millis),
            max_batch_size: self.batch_size,
            endpoint: self.endpoint,
            compression_level: self.compression_level,
            timeout: Duration::from_secs(self.timeout_secs),
            ..ForwarderConfig::new(destination)
        }
    }
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let started = Instant::now();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let Some(destination) = cli.destination.clone().filter(|d| !d.trim().is_empty()) else {
        eprintln!("Destination name required");
        return ExitCode::FAILURE;
    };

    let config = cli.into_config(destination).apply_env();
    let validation = config.validate();
    init_logging(usable_log_level(&config.log_level));

    if let Err(e) = validation {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let sink = match build_sink(&config).await {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to set up sink for {}: {e}", config.destination);
            return ExitCode::FAILURE;
        }
    };

    let mut forwarder = match Forwarder::new(config, sink) {
        Ok(forwarder) => forwarder.started_at(started),
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match forwarder.run(BufReader::new(tokio::io::stdin())).await {
        Ok(summary) => {
            debug!("Run finished in {:?}", summary.elapsed);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// An unknown level would parse as a target directive and silence every event.
fn usable_log_level(log_level: &str) -> &str {
    if VALID_LOG_LEVELS.contains(&log_level) {
        log_level
    } else {
        DEFAULT_LOG_LEVEL
    }
}

fn init_logging(log_level: &str) {
    let env_filter = format!(
        "h2=off,hyper=off,rustls=off,aws_config=off,aws_smithy_runtime=off,{log_level}"
    );
    let filter = EnvFilter::try_new(env_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return;
    }

    info!("pipe2firehose {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pipe2firehose", "my-stream"]).unwrap();
        let config = cli.into_config("my-stream".to_string());
        assert_eq!(config.destination, "my-stream");
        assert_eq!(config.max_batch_size, 500);
        assert!(config.region.is_none());
        assert!(config.delay.is_none());
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "pipe2firehose",
            "--region",
            "eu-west-1",
            "--delay",
            "10",
            "--max-batch-size",
            "100",
            "my-stream",
        ])
        .unwrap();
        let config = cli.into_config("my-stream".to_string());
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.delay, Some(Duration::from_millis(10)));
        assert_eq!(config.max_batch_size, 100);
    }

    #[test]
    fn test_batch_size_alias() {
        let cli = Cli::try_parse_from(["pipe2firehose", "--batch-size", "42", "s"]).unwrap();
        assert_eq!(cli.batch_size, 42);
    }

    #[test]
    fn test_missing_destination_parses() {
        let cli = Cli::try_parse_from(["pipe2firehose"]).unwrap();
        assert!(cli.destination.is_none());
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_default() {
        assert_eq!(usable_log_level("debug"), "debug");
        assert_eq!(usable_log_level("verbose"), DEFAULT_LOG_LEVEL);
        assert_eq!(usable_log_level(""), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_negative_batch_size_is_a_usage_error() {
        assert!(Cli::try_parse_from(["pipe2firehose", "--batch-size", "-1", "s"]).is_err());
    }
}
