// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One forwarding run from input to sink.
//!
//! ```text
//!   LineSource ──record──> BatchBuffer ──batch──> Sink
//!                               │
//!                           Counters <──read── StatsReporter (every second)
//! ```
//!
//! The run moves through `Running` (ingesting and reporting), `Draining` (input exhausted,
//! final flush pending) and ends `Terminated` after the final stats line, or `Failed` as soon
//! as a submission fails. Nothing is submitted after a failure.

use crate::buffer::BatchBuffer;
use crate::config::ForwarderConfig;
use crate::errors::{ConfigError, ForwardError};
use crate::sink::Sink;
use crate::source::LineSource;
use crate::stats::{Counters, StatsReporter};
use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderState {
    Running,
    Draining,
    Terminated,
    Failed,
}

impl fmt::Display for ForwarderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForwarderState::Running => "running",
            ForwarderState::Draining => "draining",
            ForwarderState::Terminated => "terminated",
            ForwarderState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: u64,
    pub records_forwarded: u64,
    pub batches_submitted: u64,
    pub elapsed: Duration,
}

pub struct Forwarder {
    config: ForwarderConfig,
    capacity: NonZeroUsize,
    sink: Arc<dyn Sink>,
    counters: Arc<Counters>,
    stats_out: Option<Box<dyn Write + Send>>,
    state: ForwarderState,
}

impl Forwarder {
    /// Validates `config` and starts the clock for the stats line.
    ///
    /// Sink-specific limits are left to whoever picked `sink`, see
    /// [`ForwarderConfig::validate`].
    pub fn new(config: ForwarderConfig, sink: Arc<dyn Sink>) -> Result<Self, ConfigError> {
        config.validate_run()?;
        let capacity = config.batch_capacity()?;
        Ok(Forwarder {
            config,
            capacity,
            sink,
            counters: Arc::new(Counters::new()),
            stats_out: None,
            state: ForwarderState::Running,
        })
    }

    /// Measures uptime from `start` instead of from construction.
    #[must_use]
    pub fn started_at(mut self, start: Instant) -> Self {
        self.counters = Arc::new(Counters::with_start(start));
        self
    }

    /// Sends stats lines to `out` instead of stdout.
    #[must_use]
    pub fn with_stats_writer(mut self, out: Box<dyn Write + Send>) -> Self {
        self.stats_out = Some(out);
        self
    }

    #[must_use]
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    #[must_use]
    pub fn state(&self) -> ForwarderState {
        self.state
    }

    fn transition(&mut self, next: ForwarderState) {
        debug!("Forwarder {} -> {next}", self.state);
        self.state = next;
    }

    /// Forwards every line of `reader`, then drains the buffer and prints a final stats line.
    ///
    /// The drain and the final line both complete before this returns. A failed submission
    /// returns immediately with the error and no final line.
    pub async fn run<R>(&mut self, reader: R) -> Result<RunSummary, ForwardError>
    where
        R: AsyncBufRead + Unpin,
    {
        let period = self.config.stats_interval;
        let reporter = match self.stats_out.take() {
            Some(out) => StatsReporter::with_writer(Arc::clone(&self.counters), period, out),
            None => StatsReporter::new(Arc::clone(&self.counters), period),
        };
        let cancel_token = CancellationToken::new();
        let reporter_task = tokio::spawn(reporter.run(cancel_token.clone()));

        let mut source = LineSource::new(reader, self.config.delay);
        let mut buffer = BatchBuffer::new(
            self.config.destination.as_str(),
            self.capacity,
            Arc::clone(&self.sink),
            Arc::clone(&self.counters),
        );

        info!(
            "Forwarding to {} in batches of {}",
            self.config.destination, self.capacity
        );
        let outcome = self.ingest(&mut source, &mut buffer).await;

        cancel_token.cancel();
        let reporter = reporter_task.await;

        if let Err(e) = outcome {
            self.transition(ForwarderState::Failed);
            return Err(e);
        }

        match reporter {
            Ok(mut reporter) => {
                reporter.report();
            }
            Err(e) => error!("Stats reporter task failed: {e}"),
        }
        self.transition(ForwarderState::Terminated);

        let summary = RunSummary {
            lines_read: source.lines_read(),
            records_forwarded: self.counters.total_forwarded(),
            batches_submitted: buffer.batches_submitted(),
            elapsed: self.counters.start().elapsed(),
        };
        info!(
            "Forwarded {} of {} lines in {} batches",
            summary.records_forwarded, summary.lines_read, summary.batches_submitted
        );
        Ok(summary)
    }

    async fn ingest<R>(
        &mut self,
        source: &mut LineSource<R>,
        buffer: &mut BatchBuffer,
    ) -> Result<(), ForwardError>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(record) = source.next_record().await {
            buffer.append(record).await?;
        }
        self.transition(ForwarderState::Draining);
        buffer.drain().await
    }
}
