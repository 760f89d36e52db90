// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Throughput counters shared between the ingestion path and the stats reporter.
//!
//! The ingestion path is the only writer. Buffered length and total forwarded live behind a
//! single lock so a reader sees the state either before or after a flush, never a mix.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
struct CounterState {
    buffered: usize,
    total_forwarded: u64,
}

#[derive(Debug)]
pub struct Counters {
    start: Instant,
    state: Mutex<CounterState>,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::with_start(Instant::now())
    }

    #[must_use]
    pub fn with_start(start: Instant) -> Self {
        Counters {
            start,
            state: Mutex::new(CounterState::default()),
        }
    }

    #[must_use]
    pub fn start(&self) -> Instant {
        self.start
    }

    pub(crate) fn set_buffered(&self, buffered: usize) {
        #[allow(clippy::expect_used)]
        let mut state = self.state.lock().expect("lock poisoned");
        state.buffered = buffered;
    }

    /// Credits a successful submission and empties the buffered count in one step.
    pub(crate) fn record_flush(&self, forwarded: usize) {
        #[allow(clippy::expect_used)]
        let mut state = self.state.lock().expect("lock poisoned");
        state.total_forwarded += forwarded as u64;
        state.buffered = 0;
    }

    #[must_use]
    pub fn total_forwarded(&self) -> u64 {
        #[allow(clippy::expect_used)]
        let state = self.state.lock().expect("lock poisoned");
        state.total_forwarded
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Instant::now())
    }

    #[must_use]
    pub fn snapshot_at(&self, now: Instant) -> StatsSnapshot {
        let state = {
            #[allow(clippy::expect_used)]
            let state = self.state.lock().expect("lock poisoned");
            *state
        };
        // Never zero, the rate divides by it
        let uptime_secs = now.saturating_duration_since(self.start).as_secs().max(1);
        StatsSnapshot {
            uptime_secs,
            buffered: state.buffered,
            total_forwarded: state.total_forwarded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub buffered: usize,
    pub total_forwarded: u64,
}

impl StatsSnapshot {
    #[must_use]
    pub fn per_sec(&self) -> u64 {
        self.total_forwarded / self.uptime_secs.max(1)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Uptime: {}, InBuffer: {}, Pushed {}, {}/sec",
            self.uptime_secs,
            self.buffered,
            self.total_forwarded,
            self.per_sec()
        )
    }
}

/// Prints a [`StatsSnapshot`] line on a fixed period until cancelled.
pub struct StatsReporter {
    counters: Arc<Counters>,
    period: Duration,
    out: Box<dyn Write + Send>,
}

impl StatsReporter {
    #[must_use]
    pub fn new(counters: Arc<Counters>, period: Duration) -> Self {
        Self::with_writer(counters, period, Box::new(std::io::stdout()))
    }

    #[must_use]
    pub fn with_writer(
        counters: Arc<Counters>,
        period: Duration,
        out: Box<dyn Write + Send>,
    ) -> Self {
        StatsReporter {
            counters,
            period,
            out,
        }
    }

    /// Takes a snapshot and writes it as one line.
    pub fn report(&mut self) -> StatsSnapshot {
        let snapshot = self.counters.snapshot();
        if let Err(e) = writeln!(self.out, "{snapshot}").and_then(|()| self.out.flush()) {
            debug!("Failed to write stats line: {e}");
        }
        snapshot
    }

    /// Reports every period until `cancel_token` fires, then hands the reporter back so the
    /// caller can emit a final snapshot after the periodic ones.
    pub async fn run(mut self, cancel_token: CancellationToken) -> Self {
        let mut ticker = interval(self.period);
        ticker.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                () = cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }

        debug!("Stats reporter stopped");
        self
    }
}
