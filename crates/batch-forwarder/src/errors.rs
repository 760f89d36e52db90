// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while validating a [`crate::config::ForwarderConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Destination name required")]
    MissingDestination,

    #[error("Batch size must be greater than 0, got {0}")]
    InvalidBatchSize(usize),

    #[error("Batch size {requested} exceeds the Firehose limit of {limit} records per call")]
    BatchSizeExceedsLimit { requested: usize, limit: usize },

    #[error("Invalid compression level {0}, must be between 1 and 22")]
    InvalidCompressionLevel(i32),

    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid endpoint '{0}', expected an http:// or https:// URL")]
    InvalidEndpoint(String),

    #[error("Stats interval must be greater than 0")]
    InvalidStatsInterval,
}

/// Errors a [`crate::sink::Sink`] reports for a submission. All of them are fatal for the
/// forwarder.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to build client: {0}")]
    Client(String),

    #[error("Failed to prepare payload: {0}")]
    Payload(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{status}: intake rejected batch: {body}")]
    Status { status: u16, body: String },

    #[error("Service error: {0}")]
    Service(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Failed to submit {records} records to {destination}: {source}")]
    Flush {
        destination: String,
        records: usize,
        #[source]
        source: SinkError,
    },
}
