// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device information APDUs, served by the dashboard

use alloc::string::String;

use encdec::{DecodeOwned, Encode};

use super::{decode_payload, split_status, CommandResult, Reader, Response, StatusError};
use crate::{
    status::{StatusCode, SW_OK},
    ApduError, ApduStatic, DEVICE_INFO_CLA, DEVICE_INFO_INS,
};

/// Fetch device info APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct DeviceInfoReq;

impl ApduStatic for DeviceInfoReq {
    const CLA: u8 = DEVICE_INFO_CLA;
    const INS: u8 = DEVICE_INFO_INS;
}

impl Encode for DeviceInfoReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

/// Device information response
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           TARGET_ID                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    SE_LEN     |                SE_VERSION...                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   FLAGS_LEN   |                   FLAGS...                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    MCU_LEN    |         MCU_VERSION... (optional NUL)         /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceInfo {
    /// Target id (hex)
    pub target_id: String,
    /// Secure element version
    pub se_version: String,
    /// Device flags (hex)
    pub flag: String,
    /// MCU version
    pub mcu_version: String,
}

impl DecodeOwned for DeviceInfo {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut r = Reader::new(buff);

        let target_id = hex::encode(r.take(4)?);
        let se_version = String::from_utf8_lossy(r.field()?).into_owned();
        let flag = hex::encode(r.field()?);

        // Some firmware includes a trailing NUL in the MCU version
        let mut mcu = r.field()?;
        if let Some((&0, m)) = mcu.split_last() {
            mcu = m;
        }
        let mcu_version = String::from_utf8_lossy(mcu).into_owned();

        Ok((
            Self {
                target_id,
                se_version,
                flag,
                mcu_version,
            },
            r.index(),
        ))
    }
}

impl Response for DeviceInfo {
    /// [`StatusCode::AppDoesNotSeemToBeOpen`] indicates an app rather than the
    /// dashboard is open, and short-circuits parsing
    fn parse(buff: &[u8]) -> CommandResult<Self> {
        let (payload, status) = match split_status(buff) {
            Ok(v) => v,
            Err(e) => return StatusError::unrecognized(e).into(),
        };

        if status == StatusCode::AppDoesNotSeemToBeOpen as u16 {
            return StatusError::with_message(
                status,
                "This command is only available in the Dashboard",
            )
            .into();
        }

        if status != SW_OK {
            return CommandResult::failure(status);
        }

        decode_payload(payload)
    }
}

#[cfg(test)]
mod test {
    use alloc::vec::Vec;

    use super::*;
    use crate::{status::SW_UNRECOGNIZED, test::with_status};

    fn device_info_payload(mcu: &[u8]) -> Vec<u8> {
        let mut b = alloc::vec![0x33, 0x00, 0x00, 0x04];
        b.push(5);
        b.extend_from_slice(b"2.0.0");
        b.extend_from_slice(&[4, 0xa6, 0x00, 0x00, 0x00]);
        b.push(mcu.len() as u8);
        b.extend_from_slice(mcu);
        b
    }

    #[test]
    fn device_info_decode() {
        let b = with_status(&device_info_payload(b"1.12\0"), SW_OK);

        let i = DeviceInfo::parse(&b).into_result().unwrap();
        assert_eq!(
            i,
            DeviceInfo {
                target_id: "33000004".into(),
                se_version: "2.0.0".into(),
                flag: "a6000000".into(),
                mcu_version: "1.12".into(),
            }
        );
    }

    #[test]
    fn device_info_mcu_without_nul() {
        let b = with_status(&device_info_payload(b"1.12"), SW_OK);

        let i = DeviceInfo::parse(&b).into_result().unwrap();
        assert_eq!(i.mcu_version, "1.12");
    }

    #[test]
    fn device_info_app_open() {
        // Long enough to decode, but status short-circuits
        let b = with_status(&device_info_payload(b"1.12"), 0x6e00);

        let r = DeviceInfo::parse(&b);
        assert!(!r.is_success());
        assert_eq!(r.status(), 0x6e00);
        assert_eq!(r.message(), "This command is only available in the Dashboard");

        // Empty payload is fine too
        let r = DeviceInfo::parse(&with_status(&[], 0x6e00));
        assert_eq!(r.status(), 0x6e00);
    }

    #[test]
    fn device_info_truncated() {
        let mut p = device_info_payload(b"1.12");
        p.truncate(6);

        let r = DeviceInfo::parse(&with_status(&p, SW_OK));
        assert_eq!(r.status(), SW_UNRECOGNIZED);
    }
}
