// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::SinkError;
use crate::record::Record;
use crate::sink::Sink;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_firehose::config::Region;
use aws_sdk_firehose::error::DisplayErrorContext;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record as FirehoseRecord;
use aws_sdk_firehose::Client;
use tracing::{debug, warn};

/// Submits batches with Kinesis Data Firehose `PutRecordBatch`.
#[derive(Debug, Clone)]
pub struct FirehoseSink {
    client: Client,
}

impl FirehoseSink {
    /// Builds a client from the ambient AWS configuration. A non-empty `region` overrides the
    /// resolved region.
    pub async fn connect(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            debug!("Using AWS region {region}");
            loader = loader.region(Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;
        FirehoseSink {
            client: Client::new(&sdk_config),
        }
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        FirehoseSink { client }
    }
}

fn to_firehose_records(records: &[Record]) -> Result<Vec<FirehoseRecord>, SinkError> {
    records
        .iter()
        .map(|record| {
            FirehoseRecord::builder()
                .data(Blob::new(record.as_bytes()))
                .build()
                .map_err(|e| SinkError::Payload(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl Sink for FirehoseSink {
    async fn submit(&self, destination: &str, records: &[Record]) -> Result<usize, SinkError> {
        let entries = to_firehose_records(records)?;

        let output = self
            .client
            .put_record_batch()
            .delivery_stream_name(destination)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| SinkError::Service(DisplayErrorContext(&e).to_string()))?;

        let failed = usize::try_from(output.failed_put_count()).unwrap_or(0);
        if failed > 0 {
            warn!(
                "Firehose rejected {failed} of {} records for {destination}",
                records.len()
            );
        }
        Ok(records.len().saturating_sub(failed))
    }
}
