// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Public key / address APDUs

use alloc::string::String;

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};

use super::{ascii, Reader, Response};
use crate::{p1, ApduError, ApduStatic, Instruction, ACCOUNT_ID_LEN, ALGO_APDU_CLA, PUBLIC_KEY_LEN};

/// Public key / address request APDU
///
/// Sent with [`Instruction::GetAddress`] to fetch the key and address, or with
/// [`Instruction::GetPublicKey`] for the (U2F compatible) key-only response.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ACCOUNT_ID (BE)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AddressReq {
    /// Instruction, [`Instruction::GetAddress`] or [`Instruction::GetPublicKey`]
    pub ins: Instruction,
    /// Account id, used as the third (hardened) derivation level
    pub account_id: u32,
    /// Request on-device confirmation
    pub confirm: bool,
}

impl AddressReq {
    /// Create a new public key and address request
    pub fn address(account_id: u32, confirm: bool) -> Self {
        Self {
            ins: Instruction::GetAddress,
            account_id,
            confirm,
        }
    }

    /// Create a new public key only request
    pub fn public_key(account_id: u32, confirm: bool) -> Self {
        Self {
            ins: Instruction::GetPublicKey,
            account_id,
            confirm,
        }
    }

    /// Instruction byte, varies by request kind
    pub fn ins(&self) -> u8 {
        self.ins as u8
    }
}

impl ApduStatic for AddressReq {
    const CLA: u8 = ALGO_APDU_CLA;
    const INS: u8 = Instruction::GetAddress as u8;

    fn p1(&self) -> u8 {
        match self.confirm {
            true => p1::SHOW_ADDRESS_IN_DEVICE,
            false => p1::ONLY_RETRIEVE,
        }
    }
}

impl Encode for AddressReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(ACCOUNT_ID_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < ACCOUNT_ID_LEN {
            return Err(ApduError::InvalidLength);
        }

        BigEndian::write_u32(&mut buff[..ACCOUNT_ID_LEN], self.account_id);

        Ok(ACCOUNT_ID_LEN)
    }
}

/// Public key and address response
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                          PUBLIC_KEY                           /
/// /                     (32-byte ed25519 key)                     /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     ADDRESS (ASCII, optional)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressInfo {
    /// Public key (hex)
    pub public_key: String,
    /// Address, empty for public key only responses
    pub address: String,
}

impl DecodeOwned for AddressInfo {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut r = Reader::new(buff);

        let public_key = hex::encode(r.take(PUBLIC_KEY_LEN)?);
        let address = ascii(r.rest());

        Ok((
            Self {
                public_key,
                address,
            },
            r.index(),
        ))
    }
}

impl Response for AddressInfo {}
