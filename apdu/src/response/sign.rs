// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing response APDUs
//!
//! Requests are produced by [`ChunkFramer`][crate::chunk::ChunkFramer], each chunk
//! receives a response. Intermediate chunks return an empty payload, the final chunk
//! returns the signature.

use alloc::{format, vec::Vec};

use encdec::DecodeOwned;

use super::{ascii, split_status, CommandResult, Response, StatusError};
use crate::{
    status::{self, StatusCode, SW_OK},
    ApduError,
};

/// Status codes for which the device attaches an error message to the response
pub const SIGN_ERROR_MESSAGE_CODES: &[u16] = &[
    StatusCode::DataIsInvalid as u16,
    StatusCode::BadKeyHandle as u16,
    StatusCode::SignVerifyError as u16,
];

/// Status codes accepted by the transport for signing chunks
pub const SIGN_ACCEPTABLE_CODES: &[u16] = &[
    SW_OK,
    StatusCode::DataIsInvalid as u16,
    StatusCode::BadKeyHandle as u16,
    StatusCode::SignVerifyError as u16,
];

/// Signing chunk response
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                  SIGNATURE (empty until final chunk)          /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignResp {
    /// Signature, when provided by the device
    pub signature: Option<Vec<u8>>,
}

impl DecodeOwned for SignResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let signature = match buff.is_empty() {
            true => None,
            false => Some(buff.to_vec()),
        };

        Ok((Self { signature }, buff.len()))
    }
}

impl Response for SignResp {
    /// Error statuses may carry an ASCII message, appended to the description
    fn parse(buff: &[u8]) -> CommandResult<Self> {
        let (payload, status) = match split_status(buff) {
            Ok(v) => v,
            Err(e) => return StatusError::unrecognized(e).into(),
        };

        if status == SW_OK {
            return super::decode_payload(payload);
        }

        if SIGN_ERROR_MESSAGE_CODES.contains(&status) && !payload.is_empty() {
            let message = format!("{} : {}", status::describe(status), ascii(payload));
            return StatusError::with_message(status, message).into();
        }

        CommandResult::failure(status)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{status::Outcome, test::with_status};

    #[test]
    fn sign_intermediate_chunk() {
        let r = SignResp::parse(&with_status(&[], SW_OK));
        assert_eq!(r, CommandResult::success(SignResp { signature: None }));
    }

    #[test]
    fn sign_final_chunk() {
        let sig = [0x5a; 64];

        let r = SignResp::parse(&with_status(&sig, SW_OK));
        assert_eq!(r.status(), SW_OK);
        assert_eq!(
            r.into_result().unwrap().signature.as_deref(),
            Some(&sig[..])
        );
    }

    #[test]
    fn sign_error_with_message() {
        let r = SignResp::parse(&with_status(b"bad fee", 0x6984));
        assert_eq!(r.status(), 0x6984);
        assert_eq!(r.message(), "Data is invalid : bad fee");
        assert_eq!(r.outcome(), Outcome::Malformed);

        let r = SignResp::parse(&with_status(b"invalid path", 0x6a80));
        assert_eq!(r.message(), "Bad key handle : invalid path");

        let r = SignResp::parse(&with_status(b"x", 0x6f01));
        assert_eq!(r.message(), "Sign/verify error : x");
    }

    #[test]
    fn sign_error_without_message() {
        let r = SignResp::parse(&with_status(&[], 0x6984));
        assert_eq!(r, CommandResult::failure(0x6984));
        assert_eq!(r.message(), "Data is invalid");

        // Payloads are ignored for other error codes
        let r = SignResp::parse(&with_status(b"ignored", 0x6986));
        assert_eq!(r, CommandResult::failure(0x6986));
        assert_eq!(r.outcome(), Outcome::Rejected);
    }

    #[test]
    fn sign_short_response() {
        let r = SignResp::parse(&[0x90]);
        assert_eq!(r.status(), status::SW_UNRECOGNIZED);
    }
}
