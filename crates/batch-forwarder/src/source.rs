// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::record::Record;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Reads records line by line from an async reader.
///
/// A read error ends the stream the same way EOF does. When a delay is configured the source
/// sleeps after every handed-off line, before it reads the next one.
pub struct LineSource<R> {
    reader: R,
    delay: Option<Duration>,
    buf: Vec<u8>,
    lines_read: u64,
    handed_off: bool,
    exhausted: bool,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R, delay: Option<Duration>) -> Self {
        LineSource {
            reader,
            delay: delay.filter(|d| !d.is_zero()),
            buf: Vec::new(),
            lines_read: 0,
            handed_off: false,
            exhausted: false,
        }
    }

    /// Returns the next record, or `None` once the input is exhausted.
    pub async fn next_record(&mut self) -> Option<Record> {
        if self.exhausted {
            return None;
        }

        if self.handed_off {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => {
                debug!("Input exhausted after {} lines", self.lines_read);
                self.exhausted = true;
                None
            }
            Ok(_) => {
                self.lines_read += 1;
                self.handed_off = true;
                Some(Record::from_line(strip_terminator(&self.buf)))
            }
            Err(e) => {
                warn!(
                    "Failed to read input after {} lines, treating as end of stream: {e}",
                    self.lines_read
                );
                self.exhausted = true;
                None
            }
        }
    }

    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
