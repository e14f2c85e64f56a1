// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application Information APDUs
//!
//! Served by the device dashboard / OS rather than the Algorand app, so use a
//! separate class byte.

use alloc::string::String;

use encdec::{DecodeOwned, Encode};

use super::{ascii, decode_payload, split_status, CommandResult, Reader, Response, StatusError};
use crate::{
    encdec_bitflags,
    status::{StatusCode, SW_OK},
    ApduError, ApduStatic, APP_INFO_CLA, APP_INFO_INS,
};

/// The only defined application info response format
pub const APP_INFO_FORMAT: u8 = 1;

/// Fetch application info APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct AppInfoReq;

impl ApduStatic for AppInfoReq {
    /// Application Info command APDU is class `0xb0`
    const CLA: u8 = APP_INFO_CLA;

    /// Application Info GET APDU is instruction `0x01`
    const INS: u8 = APP_INFO_INS;
}

impl Encode for AppInfoReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

bitflags::bitflags! {
    /// Application info flags (first byte of the flags field)
    pub struct AppFlags: u8 {
        /// Device booted in recovery mode
        const RECOVERY = 1 << 0;

        /// MCU firmware is signed
        const SIGNED_MCU_CODE = 1 << 1;

        /// Device is onboarded
        const ONBOARDED = 1 << 2;

        /// PIN has been validated
        const PIN_VALIDATED = 1 << 7;
    }
}

encdec_bitflags!(AppFlags);

/// Application information response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   FORMAT_ID   |   NAME_LEN    |            NAME...            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  VERSION_LEN  |                  VERSION...                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   FLAGS_LEN   |                   FLAGS...                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AppInfo {
    /// Application name
    pub app_name: String,
    /// Application version
    pub app_version: String,
    /// Length of the flags field
    pub flags_len: u8,
    /// Raw value of the first flags byte
    pub flags_value: u8,
    /// Device booted in recovery mode
    pub flag_recovery: bool,
    /// MCU firmware is signed
    pub flag_signed_mcu_code: bool,
    /// Device is onboarded
    pub flag_onboarded: bool,
    /// PIN has been validated
    pub flag_pin_validated: bool,
}

impl AppInfo {
    /// Fetch decoded flags
    pub fn flags(&self) -> AppFlags {
        AppFlags::from_bits_truncate(self.flags_value)
    }
}

impl DecodeOwned for AppInfo {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut r = Reader::new(buff);

        if r.byte()? != APP_INFO_FORMAT {
            return Err(ApduError::InvalidEncoding);
        }

        let app_name = ascii(r.field()?);
        let app_version = ascii(r.field()?);

        let flags = r.field()?;
        let flags_value = flags.first().copied().unwrap_or(0);
        let (f, _) = AppFlags::decode_owned(&[flags_value])?;

        Ok((
            Self {
                app_name,
                app_version,
                flags_len: flags.len() as u8,
                flags_value,
                flag_recovery: f.contains(AppFlags::RECOVERY),
                flag_signed_mcu_code: f.contains(AppFlags::SIGNED_MCU_CODE),
                flag_onboarded: f.contains(AppFlags::ONBOARDED),
                flag_pin_validated: f.contains(AppFlags::PIN_VALIDATED),
            },
            r.index(),
        ))
    }
}

impl Response for AppInfo {
    /// Check the format id before the status word, unknown formats are reported
    /// as [`StatusCode::DeviceIsBusy`] whatever the device returned
    fn parse(buff: &[u8]) -> CommandResult<Self> {
        let (payload, status) = match split_status(buff) {
            Ok(v) => v,
            Err(e) => return StatusError::unrecognized(e).into(),
        };

        if payload.first() != Some(&APP_INFO_FORMAT) {
            return StatusError::with_message(
                StatusCode::DeviceIsBusy as u16,
                "response format ID not recognized",
            )
            .into();
        }

        if status != SW_OK {
            return CommandResult::failure(status);
        }

        decode_payload(payload)
    }
}
