// Copyright (c) 2022-2023 The MobileCoin Foundation

//! HID device discovery and connection

use ledger_transport_hid::{hidapi::HidApi, TransportNativeHID};

use crate::{Config, DeviceHandle, Error, ExchangeTransport};

/// Device handle using the native HID transport
pub type HidHandle = DeviceHandle<ExchangeTransport<TransportNativeHID>>;

/// Ledger provider manages ledger devices and connections
pub struct LedgerProvider {
    hid_api: HidApi,
}

/// Ledger device information for listing, used by connect
#[derive(Clone, Debug)]
pub struct LedgerInfo(pub ledger_transport_hid::hidapi::DeviceInfo);

impl LedgerProvider {
    /// Create a new ledger provider
    /// NOTE: only one provider may exist at a time (workaround for global HID context errors on macos/m1)
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            hid_api: HidApi::new()?,
        })
    }

    /// List available ledger devices
    pub fn list_devices(&self) -> Vec<LedgerInfo> {
        let devices: Vec<_> = TransportNativeHID::list_ledgers(&self.hid_api)
            .cloned()
            .map(LedgerInfo)
            .collect();

        log::debug!("Found {} devices: {:?}", devices.len(), devices);

        devices
    }

    /// Connect to the specified device
    pub fn connect(&self, info: &LedgerInfo, cfg: Config) -> Result<HidHandle, Error> {
        let t = TransportNativeHID::open_device(&self.hid_api, &info.0)?;

        Ok(DeviceHandle::new(ExchangeTransport::new(t), cfg))
    }
}

impl std::fmt::Display for LedgerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:16} (USB, {:04x}:{:04x}, {})",
            self.0.product_string().unwrap_or("UNKNOWN"),
            self.0.vendor_id(),
            self.0.product_id(),
            self.0.serial_number().unwrap_or("UNKNOWN"),
        )
    }
}
