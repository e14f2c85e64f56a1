// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_algorand_apdu::{
    response::StatusError,
    status::{self, SW_UNRECOGNIZED},
    ApduError, PathError,
};
use tokio::time::error::Elapsed;

/// Ledger Algorand API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HID Init Error
    #[error("could not create HidApi instance")]
    HidInit,

    /// No matching device
    #[error("No ledger device found")]
    NoDevice,

    /// Transport failure (connection lost, device disconnected, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Device returned a status outside the acceptable set for the command
    #[error("{} (0x{:04x})", status::describe(*.0), .0)]
    Status(u16),

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// Invalid derivation path
    #[error("Invalid path format: {0}")]
    Path(PathError),

    /// APDU encoding error
    #[error("APDU error: {0}")]
    Apdu(ApduError),
}

impl Error {
    /// Status code reported for this failure, [`SW_UNRECOGNIZED`] unless
    /// the device supplied one
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Status(code) => *code,
            _ => SW_UNRECOGNIZED,
        }
    }
}

/// Convert failures to protocol-level errors for inclusion in a
/// [`CommandResult`][ledger_algorand_apdu::response::CommandResult]
impl From<Error> for StatusError {
    fn from(e: Error) -> Self {
        match e {
            Error::Status(code) => StatusError::new(code),
            e => StatusError::unrecognized(e),
        }
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl From<PathError> for Error {
    fn from(e: PathError) -> Self {
        Error::Path(e)
    }
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        Error::Apdu(e)
    }
}

#[cfg(feature = "transport_hid")]
impl From<ledger_transport_hid::LedgerHIDError> for Error {
    fn from(e: ledger_transport_hid::LedgerHIDError) -> Self {
        use ledger_transport_hid::LedgerHIDError;

        match e {
            LedgerHIDError::DeviceNotFound => Error::NoDevice,
            e => Error::Transport(format!("HID: {e}")),
        }
    }
}

#[cfg(feature = "transport_hid")]
impl From<ledger_transport_hid::hidapi::HidError> for Error {
    fn from(_: ledger_transport_hid::hidapi::HidError) -> Self {
        Error::HidInit
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Error::Status(0x6986).status_code(), 0x6986);
        assert_eq!(Error::RequestTimeout.status_code(), SW_UNRECOGNIZED);
        assert_eq!(
            Error::Transport("disconnected".into()).status_code(),
            SW_UNRECOGNIZED
        );
    }

    #[test]
    fn status_errors() {
        let e = StatusError::from(Error::Status(0x6986));
        assert_eq!(e.code, 0x6986);
        assert_eq!(e.message, "Transaction rejected");

        let e = StatusError::from(Error::Transport("disconnected".into()));
        assert_eq!(e.code, SW_UNRECOGNIZED);
        assert_eq!(e.message, "Transport error: disconnected");

        assert_eq!(
            Error::Status(0x6e00).to_string(),
            "App does not seem to be open (0x6e00)"
        );
    }
}
