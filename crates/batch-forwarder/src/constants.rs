// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Records per submission unless overridden on the command line.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Upper bound on records accepted by a single Firehose `PutRecordBatch` call.
pub const FIREHOSE_MAX_BATCH_RECORDS: usize = 500;

pub const STATS_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub const LOG_LEVEL_ENV: &str = "PIPE2FIREHOSE_LOG_LEVEL";
pub const HTTPS_PROXY_ENV: &str = "PIPE2FIREHOSE_HTTPS_PROXY";
