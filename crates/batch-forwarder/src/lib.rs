// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Buffered batch forwarding of line-delimited records.
//!
//! Lines read from an input stream are turned into [`record::Record`]s, accumulated in a
//! [`buffer::BatchBuffer`] and submitted to a [`sink::Sink`] whenever the batch reaches its
//! configured capacity, plus once more when the input is exhausted. A
//! [`stats::StatsReporter`] runs next to the ingestion path and prints a throughput line
//! every second.
//!
//! [`forwarder::Forwarder`] wires these pieces together for a single run.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod forwarder;
pub mod record;
pub mod sink;
pub mod source;
pub mod stats;
