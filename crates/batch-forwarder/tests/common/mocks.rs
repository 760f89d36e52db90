// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock sinks for driving the forwarder without a network

use async_trait::async_trait;
use batch_forwarder::errors::SinkError;
use batch_forwarder::record::Record;
use batch_forwarder::sink::Sink;
use std::sync::Mutex;

/// Mock sink that keeps every submitted batch and optionally fails one submission
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<(String, Vec<Record>)>>,
    attempts: Mutex<usize>,
    fail_on_attempt: Option<usize>,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Fails the `attempt`-th submission (0-based) and accepts the others
    pub fn failing_on(attempt: usize) -> Self {
        RecordingSink {
            fail_on_attempt: Some(attempt),
            ..Default::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|(_, records)| records.len())
            .collect()
    }

    pub fn batches(&self) -> Vec<(String, Vec<Record>)> {
        self.batches.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn submit(&self, destination: &str, records: &[Record]) -> Result<usize, SinkError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if self.fail_on_attempt == Some(attempt) {
            return Err(SinkError::Service("ResourceNotFoundException".to_string()));
        }
        self.batches
            .lock()
            .unwrap()
            .push((destination.to_string(), records.to_vec()));
        Ok(records.len())
    }
}
