// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Algorand app communication
//!
//! This module provides the wire-level protocol for talking to the Algorand ledger app:
//! derivation path encoding, chunk framing for oversized signing payloads, the status
//! code registry and a response parser for each supported command.
//!
//! Requests use the standard ledger APDU header (`CLA`, `INS`, `P1`, `P2`) followed by a
//! command-specific payload. Every response carries a big-endian 2-byte status word as its
//! final two bytes, all preceding bytes are the command-specific response payload.
//!
//! Derivation paths are encoded little-endian, account ids and target ids big-endian,
//! matching the device application.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chunk;
pub mod error;
pub mod path;
pub mod prelude;
pub mod response;
pub mod status;

pub use error::{ApduError, PathError};

/// Algorand APDU Class
pub const ALGO_APDU_CLA: u8 = 0x80;

/// Class byte for dashboard application info requests
pub const APP_INFO_CLA: u8 = 0xb0;

/// Instruction for dashboard application info requests
pub const APP_INFO_INS: u8 = 0x01;

/// Class byte for dashboard device info requests
pub const DEVICE_INFO_CLA: u8 = 0xe0;

/// Instruction for dashboard device info requests
pub const DEVICE_INFO_INS: u8 = 0x01;

/// Maximum payload carried by a single signing APDU
pub const CHUNK_SIZE: usize = 250;

/// Length of an ed25519 public key as returned by the device
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of the big-endian account id prefix
pub const ACCOUNT_ID_LEN: usize = 4;

/// Algorand APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x00,

    /// Fetch public key (U2F compatible, key only)
    GetPublicKey = 0x03,

    /// Fetch public key and address
    GetAddress = 0x04,

    /// Sign a msgpack encoded transaction
    SignMsgpack = 0x08,
}

/// P1 values for address and public key requests
pub mod p1 {
    /// Return the key without user interaction
    pub const ONLY_RETRIEVE: u8 = 0x00;
    /// Display the address on device for confirmation
    pub const SHOW_ADDRESS_IN_DEVICE: u8 = 0x01;
    /// First signing chunk, no account id
    pub const MSGPACK_FIRST: u8 = 0x00;
    /// First signing chunk, prefixed with a 4-byte account id
    pub const MSGPACK_FIRST_ACCOUNT_ID: u8 = 0x01;
    /// Continuation signing chunk
    pub const MSGPACK_ADD: u8 = 0x80;
}

/// P2 values for signing requests
pub mod p2 {
    /// Default / unused
    pub const DEFAULT: u8 = 0x00;
    /// More chunks follow
    pub const MSGPACK_ADD: u8 = 0x80;
    /// Final chunk
    pub const MSGPACK_LAST: u8 = 0x00;
}

/// Static APDU header information, implemented by request objects
pub trait ApduStatic {
    /// Class byte for the request
    const CLA: u8;

    /// Instruction byte for the request
    const INS: u8;

    /// P1 for the request (defaults to zero)
    fn p1(&self) -> u8 {
        0
    }

    /// P2 for the request (defaults to zero)
    fn p2(&self) -> u8 {
        0
    }
}

/// Helper macro for encoding `bitflags` types
#[macro_export]
macro_rules! encdec_bitflags {
    ($b:ty) => {
        impl encdec::Encode for $b {
            type Error = $crate::ApduError;

            fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
                if buff.is_empty() {
                    return Err($crate::ApduError::InvalidLength);
                }
                buff[0] = self.bits();
                Ok(1)
            }

            fn encode_len(&self) -> Result<usize, Self::Error> {
                Ok(1)
            }
        }

        impl encdec::DecodeOwned for $b {
            type Output = $b;
            type Error = $crate::ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Self::Error> {
                if buff.is_empty() {
                    return Err($crate::ApduError::InvalidLength);
                }
                let v = <$b>::from_bits_truncate(buff[0]);
                Ok((v, 1))
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod test {
    use alloc::vec::Vec;

    /// Helper to build a raw response buffer from payload and status word
    pub fn with_status(payload: &[u8], status: u16) -> Vec<u8> {
        let mut v = Vec::from(payload);
        v.extend_from_slice(&status.to_be_bytes());
        v
    }
}
