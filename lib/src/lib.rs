// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Algorand API Library (and CLI)
//!
//! Provides a [`DeviceHandle`] for issuing commands to the Algorand app over any
//! [`Transport`], with a [`LedgerProvider`] for discovering and connecting to
//! HID devices (with the `transport_hid` feature).

pub use ledger_transport::Exchange;

/// Re-export transports for consumer use
pub mod transport;
pub use transport::{ExchangeTransport, Transport};

/// Re-export `ledger-algorand-apdu` for consumers
pub use ledger_algorand_apdu::{self as apdu};

mod config;
pub use config::{Config, DEFAULT_REQUEST_TIMEOUT};

mod handle;
pub use handle::DeviceHandle;

pub mod sign;

mod error;
pub use error::Error;

#[cfg(feature = "transport_hid")]
mod provider;
#[cfg(feature = "transport_hid")]
pub use provider::{HidHandle, LedgerInfo, LedgerProvider};
