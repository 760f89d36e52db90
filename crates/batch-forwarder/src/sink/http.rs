// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batch submission to a plain HTTP intake.
//!
//! Each batch is sent as one POST whose body is the records concatenated in order. Records
//! already end in `\n`, so the body is line-delimited. With a compression level set the body
//! is zstd-encoded and `Content-Encoding: zstd` is added.

use crate::errors::SinkError;
use crate::record::Record;
use crate::sink::Sink;
use async_trait::async_trait;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error};
use zstd::zstd_safe::CompressionLevel;

pub const DESTINATION_HEADER: &str = "X-Destination";
pub const RECORD_COUNT_HEADER: &str = "X-Record-Count";

#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub endpoint: String,
    pub https_proxy: Option<String>,
    pub timeout: Duration,
    pub compression_level: Option<CompressionLevel>,
}

#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    compression_level: Option<CompressionLevel>,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, SinkError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.https_proxy {
            let proxy = reqwest::Proxy::https(proxy)
                .map_err(|e| SinkError::Client(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;

        Ok(HttpSink {
            client,
            endpoint: config.endpoint,
            compression_level: config.compression_level,
        })
    }

    fn encode(&self, records: &[Record]) -> Result<Vec<u8>, SinkError> {
        let mut payload = Vec::with_capacity(records.iter().map(Record::len).sum());
        for record in records {
            payload.extend_from_slice(record.as_bytes());
        }

        match self.compression_level {
            Some(level) => zstd::encode_all(payload.as_slice(), level)
                .map_err(|e| SinkError::Payload(format!("zstd compression failed: {e}"))),
            None => Ok(payload),
        }
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn submit(&self, destination: &str, records: &[Record]) -> Result<usize, SinkError> {
        let body = self.encode(records)?;
        debug!(
            "Posting {} records ({} bytes) for {destination}",
            records.len(),
            body.len()
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(DESTINATION_HEADER, destination)
            .header(RECORD_COUNT_HEADER, records.len().to_string())
            .body(body);
        if self.compression_level.is_some() {
            request = request.header(CONTENT_ENCODING, "zstd");
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(records.len());
        }

        let body = response.text().await.unwrap_or_default();
        error!("{status}: Failed to push to intake: {body:?}");
        Err(SinkError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
