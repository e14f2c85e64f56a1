// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device handle configuration

use std::time::Duration;

use ledger_algorand_apdu::{ALGO_APDU_CLA, CHUNK_SIZE};

/// Default timeout for a single APDU exchange
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`DeviceHandle`][crate::DeviceHandle], fixed at construction
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Class byte for Algorand app commands
    pub cla: u8,

    /// Maximum data length per signing chunk (limited to [`CHUNK_SIZE`])
    pub chunk_size: usize,

    /// Timeout for each APDU exchange
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cla: ALGO_APDU_CLA,
            chunk_size: CHUNK_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Set the signing chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
