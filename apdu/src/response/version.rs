// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version APDUs

use alloc::{format, string::String};

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};

use super::{Reader, Response};
use crate::{ApduError, ApduStatic, Instruction, ALGO_APDU_CLA};

/// Fetch application version APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq;

impl ApduStatic for VersionReq {
    const CLA: u8 = ALGO_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for VersionReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

/// Application version response
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TEST_MODE   |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    LOCKED     |             TARGET_ID (optional, BE)          /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /               |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VersionInfo {
    /// Application built in test mode
    pub test_mode: bool,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Patch version
    pub patch: u8,
    /// Device is locked
    pub device_locked: bool,
    /// Target id, zero if not reported
    pub target_id: u32,
}

impl VersionInfo {
    /// Target id as lower-case hex
    pub fn target_id_hex(&self) -> String {
        format!("{:x}", self.target_id)
    }
}

impl DecodeOwned for VersionInfo {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut r = Reader::new(buff);

        let test_mode = r.byte()? != 0;
        let major = r.byte()?;
        let minor = r.byte()?;
        let patch = r.byte()?;
        let device_locked = r.byte()? == 1;

        // Target id is only reported by newer firmware
        let target_id = match buff.len() >= 9 {
            true => BigEndian::read_u32(r.take(4)?),
            false => 0,
        };

        Ok((
            Self {
                test_mode,
                major,
                minor,
                patch,
                device_locked,
                target_id,
            },
            r.index(),
        ))
    }
}

impl Response for VersionInfo {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        response::CommandResult,
        status::{SW_OK, SW_UNRECOGNIZED},
        test::with_status,
    };

    #[test]
    fn version_with_target_id() {
        let b = with_status(&[0x00, 2, 1, 7, 0x00, 0x31, 0x10, 0x00, 0x04], SW_OK);

        let v = VersionInfo::parse(&b).into_result().unwrap();
        assert_eq!(
            v,
            VersionInfo {
                test_mode: false,
                major: 2,
                minor: 1,
                patch: 7,
                device_locked: false,
                target_id: 0x3110_0004,
            }
        );
        assert_eq!(v.target_id_hex(), "31100004");
    }

    #[test]
    fn version_without_target_id() {
        let b = with_status(&[0x01, 1, 2, 3, 0x01], SW_OK);

        let r = VersionInfo::parse(&b);
        assert_eq!(r.status(), SW_OK);

        let v = r.into_result().unwrap();
        assert!(v.test_mode);
        assert!(v.device_locked);
        assert_eq!(v.target_id, 0);
        assert_eq!(v.target_id_hex(), "0");
    }

    #[test]
    fn version_error_status() {
        let b = with_status(&[], 0x6e00);
        assert_eq!(VersionInfo::parse(&b), CommandResult::failure(0x6e00));
    }

    #[test]
    fn version_truncated() {
        let b = with_status(&[0x00, 1, 2], SW_OK);
        let r = VersionInfo::parse(&b);
        assert_eq!(r.status(), SW_UNRECOGNIZED);
    }
}
