// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transport abstraction for issuing APDUs to a device
//!
//! [`Transport`] is the contract the [`DeviceHandle`][crate::DeviceHandle] relies on,
//! [`ExchangeTransport`] adapts any [`ledger_transport::Exchange`] implementation
//! (such as the HID transport) to it.

use async_trait::async_trait;
use ledger_apdu::APDUCommand;
use ledger_transport::Exchange;
use log::trace;

#[cfg(feature = "transport_hid")]
pub use ledger_transport_hid::{LedgerHIDError, TransportNativeHID};

use crate::Error;

/// Transport for raw APDU exchanges
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an APDU, returning the raw response (payload and trailing status word).
    ///
    /// Responses with a status outside `acceptable` fail with [`Error::Status`].
    async fn send(
        &self,
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
        acceptable: &[u16],
    ) -> Result<Vec<u8>, Error>;
}

/// Adaptor from [`Exchange`] implementations to [`Transport`]
#[derive(Debug)]
pub struct ExchangeTransport<E: Exchange>(E);

impl<E: Exchange> ExchangeTransport<E> {
    /// Wrap an [`Exchange`] implementation
    pub fn new(e: E) -> Self {
        Self(e)
    }

    /// Fetch the underlying [`Exchange`] implementation
    pub fn inner(&self) -> &E {
        &self.0
    }
}

impl<E: Exchange> From<E> for ExchangeTransport<E> {
    fn from(e: E) -> Self {
        Self(e)
    }
}

#[async_trait]
impl<E> Transport for ExchangeTransport<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::fmt::Display,
{
    async fn send(
        &self,
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
        acceptable: &[u16],
    ) -> Result<Vec<u8>, Error> {
        let cmd = APDUCommand {
            cla,
            ins,
            p1,
            p2,
            data: data.to_vec(),
        };

        let answer = self
            .0
            .exchange(&cmd)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = answer.retcode();
        trace!("Response (status: 0x{:04x}): {:02x?}", status, answer.data());

        if !acceptable.contains(&status) {
            return Err(Error::Status(status));
        }

        let mut resp = answer.data().to_vec();
        resp.extend_from_slice(&status.to_be_bytes());

        Ok(resp)
    }
}
