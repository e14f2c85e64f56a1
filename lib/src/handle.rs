// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the Algorand app
//! and is generic over [`Transport`] implementations.
//!
//! Commands return a [`CommandResult`], device status codes (and transport
//! failures, reported as [`SW_UNRECOGNIZED`][ledger_algorand_apdu::status::SW_UNRECOGNIZED])
//! are values rather than errors.

use std::{sync::Arc, time::Duration};

use encdec::Encode;
use log::{debug, trace, warn};
use tokio::sync::Mutex;

use ledger_algorand_apdu::prelude::*;

use crate::{config::Config, sign::SignSequence, transport::Transport, Error};

/// Algorand handle for a connected ledger device.
///
/// This is generic over [`Transport`] types to support different
/// underlying transports / providers. Clones share the underlying
/// transport, with requests serialised.
pub struct DeviceHandle<T: Transport> {
    /// Transport for communication
    t: Arc<Mutex<T>>,
    /// Handle configuration
    cfg: Config,
}

impl<T: Transport> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            cfg: self.cfg.clone(),
        }
    }
}

/// Create a [`DeviceHandle`] wrapper from a type implementing [`Transport`]
impl<T: Transport> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self::new(t, Config::default())
    }
}

/// Raw APDU request
#[derive(Clone, Debug)]
pub(crate) struct Request<'a> {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: &'a [u8],
    pub acceptable: &'a [u16],
}

/// Issue a request and parse the response, bounded by `timeout`
pub(crate) async fn exchange<R: Response, T: Transport + ?Sized>(
    t: &T,
    timeout: Duration,
    req: Request<'_>,
) -> CommandResult<R> {
    debug!(
        "Request cla: 0x{:02x} ins: 0x{:02x} p1: 0x{:02x} p2: 0x{:02x} ({} bytes)",
        req.cla,
        req.ins,
        req.p1,
        req.p2,
        req.data.len()
    );

    let f = t.send(req.cla, req.ins, req.p1, req.p2, req.data, req.acceptable);

    let resp = match tokio::time::timeout(timeout, f).await {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            warn!("Request failed: {}", e);
            return StatusError::from(e).into();
        }
        Err(e) => {
            warn!("Request timeout after {:?}", timeout);
            return StatusError::from(Error::from(e)).into();
        }
    };

    trace!("Response: {:02x?}", resp);

    R::parse(&resp)
}

/// Encode a request object to an APDU payload
fn encode_req<E: Encode<Error = ApduError>>(req: &E) -> Result<Vec<u8>, ApduError> {
    let mut buff = vec![0u8; req.encode_len()?];
    let n = req.encode(&mut buff)?;
    buff.truncate(n);
    Ok(buff)
}

impl<T: Transport> DeviceHandle<T> {
    /// Create a new handle with the provided configuration
    pub fn new(t: T, cfg: Config) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            cfg,
        }
    }

    /// Fetch handle configuration
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Issue a single request, holding the transport for its duration
    async fn request<R: Response>(&self, req: Request<'_>) -> CommandResult<R> {
        let t = self.t.lock().await;
        exchange(&*t, self.cfg.request_timeout, req).await
    }

    /// Fetch Algorand app version
    pub async fn version(&self) -> CommandResult<VersionInfo> {
        debug!("Requesting app version");

        self.request(Request {
            cla: self.cfg.cla,
            ins: VersionReq::INS,
            p1: 0,
            p2: 0,
            data: &[],
            acceptable: &[SW_OK],
        })
        .await
    }

    /// Fetch application info from the device dashboard / OS
    pub async fn app_info(&self) -> CommandResult<AppInfo> {
        debug!("Requesting app info");

        self.request(Request {
            cla: AppInfoReq::CLA,
            ins: AppInfoReq::INS,
            p1: 0,
            p2: 0,
            data: &[],
            acceptable: &[SW_OK],
        })
        .await
    }

    /// Fetch device info, only available from the dashboard
    pub async fn device_info(&self) -> CommandResult<DeviceInfo> {
        debug!("Requesting device info");

        self.request(Request {
            cla: DeviceInfoReq::CLA,
            ins: DeviceInfoReq::INS,
            p1: 0,
            p2: 0,
            data: &[],
            acceptable: &[SW_OK, StatusCode::AppDoesNotSeemToBeOpen as u16],
        })
        .await
    }

    /// Fetch the public key for an account, optionally confirming on the device
    pub async fn public_key(&self, account_id: u32, confirm: bool) -> CommandResult<String> {
        debug!("Requesting public key for account: {}", account_id);

        let r = self
            .address_req(AddressReq::public_key(account_id, confirm))
            .await;

        r.map(|a| a.public_key)
    }

    /// Fetch the public key and address for an account, optionally displaying
    /// the address on the device for confirmation
    pub async fn address(&self, account_id: u32, confirm: bool) -> CommandResult<AddressInfo> {
        debug!(
            "Requesting address for account: {} (confirm: {})",
            account_id, confirm
        );

        self.address_req(AddressReq::address(account_id, confirm))
            .await
    }

    async fn address_req(&self, req: AddressReq) -> CommandResult<AddressInfo> {
        let data = match encode_req(&req) {
            Ok(v) => v,
            Err(e) => return StatusError::unrecognized(e).into(),
        };

        self.request(Request {
            cla: self.cfg.cla,
            ins: req.ins(),
            p1: req.p1(),
            p2: req.p2(),
            data: &data,
            acceptable: &[SW_OK],
        })
        .await
    }

    /// Sign a msgpack encoded transaction (or text) with the key for the provided account.
    ///
    /// The payload is split into chunks which are sent in order, halting at the first
    /// failure. On success the signature from the final chunk is returned.
    pub async fn sign(&self, account_id: u32, msg: impl AsRef<[u8]>) -> CommandResult<SignResp> {
        let seq = SignSequence::new(&self.cfg, account_id, msg.as_ref());

        // Hold the transport for the whole sequence so chunks are not interleaved
        let t = self.t.lock().await;
        seq.run(&*t, &self.cfg).await
    }
}
