// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use bytes::{BufMut, Bytes, BytesMut};

/// One input line plus its trailing `\n`, as submitted to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Bytes);

impl Record {
    /// Builds a record from a line whose terminator has already been stripped.
    #[must_use]
    pub fn from_line(line: &[u8]) -> Self {
        let mut data = BytesMut::with_capacity(line.len() + 1);
        data.put_slice(line);
        data.put_u8(b'\n');
        Record(data.freeze())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for Record {
    fn from(line: &str) -> Self {
        Record::from_line(line.as_bytes())
    }
}
