// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Cloneable in-memory writer for capturing stats lines
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Builds `count` newline-terminated input lines
#[allow(dead_code)]
pub fn input_lines(count: usize) -> Vec<u8> {
    let mut input = Vec::new();
    for i in 0..count {
        writeln!(input, "{{\"seq\":{i}}}").unwrap();
    }
    input
}
