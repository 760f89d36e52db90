// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::ForwarderConfig;
use crate::errors::SinkError;
use crate::record::Record;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub mod firehose;
pub mod http;

pub use firehose::FirehoseSink;
pub use http::{HttpSink, HttpSinkConfig};

/// Remote endpoint that accepts batches of records.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Submits `records`, in order, to `destination` as a single request.
    /// Returns how many records the remote side accepted.
    async fn submit(&self, destination: &str, records: &[Record]) -> Result<usize, SinkError>;
}

/// Picks the sink for `config`: the HTTP intake when an endpoint is set, Firehose otherwise.
pub async fn build_sink(config: &ForwarderConfig) -> Result<Arc<dyn Sink>, SinkError> {
    match &config.endpoint {
        Some(endpoint) => {
            debug!("Forwarding to HTTP intake at {endpoint}");
            let sink = HttpSink::new(HttpSinkConfig {
                endpoint: endpoint.clone(),
                https_proxy: config.https_proxy.clone(),
                timeout: config.timeout,
                compression_level: config.compression_level,
            })?;
            Ok(Arc::new(sink))
        }
        None => {
            debug!("Forwarding to Firehose");
            let sink = FirehoseSink::connect(config.region.as_deref()).await;
            Ok(Arc::new(sink))
        }
    }
}
