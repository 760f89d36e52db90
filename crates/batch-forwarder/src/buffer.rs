// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ForwardError;
use crate::record::Record;
use crate::sink::Sink;
use crate::stats::Counters;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accumulates records and submits them to the sink in batches of at most `max_batch_size`.
///
/// Submissions are sequential: `append` awaits the sink inline when the batch fills up.
pub struct BatchBuffer {
    destination: Arc<str>,
    max_batch_size: NonZeroUsize,
    records: Vec<Record>,
    sink: Arc<dyn Sink>,
    counters: Arc<Counters>,
    batches_submitted: u64,
}

impl BatchBuffer {
    pub fn new(
        destination: impl Into<Arc<str>>,
        max_batch_size: NonZeroUsize,
        sink: Arc<dyn Sink>,
        counters: Arc<Counters>,
    ) -> Self {
        BatchBuffer {
            destination: destination.into(),
            max_batch_size,
            records: Vec::with_capacity(max_batch_size.get()),
            sink,
            counters,
            batches_submitted: 0,
        }
    }

    /// Adds `record` to the batch, flushing first thing once the batch is full.
    pub async fn append(&mut self, record: Record) -> Result<(), ForwardError> {
        self.records.push(record);
        self.counters.set_buffered(self.records.len());

        if self.records.len() >= self.max_batch_size.get() {
            self.flush().await?;
        }
        Ok(())
    }

    /// Submits the current batch, if any. On failure nothing is credited and the batch is
    /// left as it was; callers are expected to stop.
    pub async fn flush(&mut self) -> Result<(), ForwardError> {
        if self.records.is_empty() {
            return Ok(());
        }

        let count = self.records.len();
        debug!("Flushing {count} records to {}", self.destination);

        match self.sink.submit(&self.destination, &self.records).await {
            Ok(accepted) => {
                if accepted < count {
                    warn!(
                        "Sink accepted {accepted} of {count} records for {}",
                        self.destination
                    );
                }
                self.records.clear();
                self.counters.record_flush(count);
                self.batches_submitted += 1;
                debug!("Flushed {count} records to {}", self.destination);
                Ok(())
            }
            Err(source) => Err(ForwardError::Flush {
                destination: self.destination.to_string(),
                records: count,
                source,
            }),
        }
    }

    /// Final flush once the input is exhausted.
    pub async fn drain(&mut self) -> Result<(), ForwardError> {
        if !self.records.is_empty() {
            debug!("Draining {} buffered records", self.records.len());
        }
        self.flush().await
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted
    }
}
