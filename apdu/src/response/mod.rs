// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Response parsing
//!
//! Every response ends with a big-endian 2-byte status word. Parsers split this off,
//! decode the remaining payload and produce a [`CommandResult`], which always carries
//! the status code and its description. Non-success statuses are values, not errors.

use alloc::{
    borrow::Cow,
    string::{String, ToString},
};
use core::fmt;

use encdec::DecodeOwned;

use crate::{
    status::{self, Outcome, SW_OK, SW_UNRECOGNIZED},
    ApduError,
};

mod address;
pub use address::*;

mod app_info;
pub use app_info::*;

mod device_info;
pub use device_info::*;

mod sign;
pub use sign::*;

mod version;
pub use version::*;

/// Error outcome, carrying the status code and a description
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusError {
    /// Status code (device status, or [`SW_UNRECOGNIZED`] for failures below the protocol)
    pub code: u16,
    /// Human readable message
    pub message: String,
}

impl StatusError {
    /// Create an error for a status code using the registry description
    pub fn new(code: u16) -> Self {
        Self {
            code,
            message: status::describe(code).into_owned(),
        }
    }

    /// Create an error with a custom message
    pub fn with_message(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an [`SW_UNRECOGNIZED`] error from an underlying failure
    pub fn unrecognized(e: impl fmt::Display) -> Self {
        Self::with_message(SW_UNRECOGNIZED, e.to_string())
    }

    /// Outcome category for this error
    pub fn outcome(&self) -> Outcome {
        status::outcome(self.code)
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04x})", self.message, self.code)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StatusError {}

/// Outcome of a command, either a typed payload or a [`StatusError`]
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandResult<T> {
    /// Command succeeded
    Success {
        /// Status code (always [`SW_OK`])
        status: u16,
        /// Command-specific payload
        value: T,
    },
    /// Command failed
    Failure(StatusError),
}

impl<T> CommandResult<T> {
    /// Create a success result
    pub fn success(value: T) -> Self {
        Self::Success {
            status: SW_OK,
            value,
        }
    }

    /// Create a failure result for a status code
    pub fn failure(code: u16) -> Self {
        Self::Failure(StatusError::new(code))
    }

    /// Check whether the command succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Fetch the status code
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } => *status,
            Self::Failure(e) => e.code,
        }
    }

    /// Fetch the status description (or custom error message)
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Success { status, .. } => status::describe(*status),
            Self::Failure(e) => Cow::Borrowed(&e.message),
        }
    }

    /// Fetch the outcome category
    pub fn outcome(&self) -> Outcome {
        status::outcome(self.status())
    }

    /// Fetch the success payload, if available
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Map the success payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandResult<U> {
        match self {
            Self::Success { status, value } => CommandResult::Success {
                status,
                value: f(value),
            },
            Self::Failure(e) => CommandResult::Failure(e),
        }
    }

    /// Convert into a standard [`Result`]
    pub fn into_result(self) -> Result<T, StatusError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure(e) => Err(e),
        }
    }
}

impl<T> From<StatusError> for CommandResult<T> {
    fn from(e: StatusError) -> Self {
        Self::Failure(e)
    }
}

/// Response parser, implemented for each command response type
pub trait Response: DecodeOwned<Output = Self, Error = ApduError> + Sized {
    /// Parse a raw response buffer (including trailing status word)
    fn parse(buff: &[u8]) -> CommandResult<Self> {
        let (payload, status) = match split_status(buff) {
            Ok(v) => v,
            Err(e) => return StatusError::unrecognized(e).into(),
        };

        if status != SW_OK {
            return CommandResult::failure(status);
        }

        decode_payload(payload)
    }
}

/// Split a raw response into payload and status word
pub fn split_status(buff: &[u8]) -> Result<(&[u8], u16), ApduError> {
    if buff.len() < 2 {
        return Err(ApduError::InvalidLength);
    }

    let (payload, sw) = buff.split_at(buff.len() - 2);
    Ok((payload, u16::from_be_bytes([sw[0], sw[1]])))
}

/// Decode a payload into a success result, mapping decode failures to [`SW_UNRECOGNIZED`]
pub(crate) fn decode_payload<T: Response>(payload: &[u8]) -> CommandResult<T> {
    match T::decode_owned(payload) {
        Ok((v, _n)) => CommandResult::success(v),
        Err(e) => StatusError::unrecognized(e).into(),
    }
}

/// Decode bytes as 7-bit ASCII, clearing the high bit of each byte
pub(crate) fn ascii(b: &[u8]) -> String {
    b.iter().map(|c| (c & 0x7f) as char).collect()
}

/// Bounds-checked reader over a response payload
pub(crate) struct Reader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }

    /// Read a single byte
    pub fn byte(&mut self) -> Result<u8, ApduError> {
        let b = *self.buff.get(self.index).ok_or(ApduError::InvalidLength)?;
        self.index += 1;
        Ok(b)
    }

    /// Read `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ApduError> {
        let d = self
            .buff
            .get(self.index..self.index + n)
            .ok_or(ApduError::InvalidLength)?;
        self.index += n;
        Ok(d)
    }

    /// Read a length-prefixed field
    pub fn field(&mut self) -> Result<&'a [u8], ApduError> {
        let n = self.byte()? as usize;
        self.take(n)
    }

    /// Fetch remaining bytes
    pub fn rest(&mut self) -> &'a [u8] {
        let d = &self.buff[self.index.min(self.buff.len())..];
        self.index = self.buff.len();
        d
    }

    /// Fetch the number of bytes consumed
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::with_status;

    #[test]
    fn split_status_word() {
        let b = with_status(&[1, 2, 3], 0x6984);
        assert_eq!(split_status(&b), Ok((&[1u8, 2, 3][..], 0x6984)));

        assert_eq!(split_status(&[0x90, 0x00]), Ok((&[][..], SW_OK)));
        assert_eq!(split_status(&[0x90]), Err(ApduError::InvalidLength));
    }

    #[test]
    fn ascii_clears_high_bit() {
        assert_eq!(ascii(b"ALGO"), "ALGO");
        assert_eq!(ascii(&[0xc1, 0x42]), "AB");
    }

    #[test]
    fn reader_bounds() {
        let mut r = Reader::new(&[2, 0xaa, 0xbb, 5, 0x01]);
        assert_eq!(r.field(), Ok(&[0xaa, 0xbb][..]));
        assert_eq!(r.field(), Err(ApduError::InvalidLength));

        let mut r = Reader::new(&[]);
        assert_eq!(r.byte(), Err(ApduError::InvalidLength));
        assert!(r.rest().is_empty());
    }

    #[test]
    fn result_accessors() {
        let r = CommandResult::success(7u8);
        assert!(r.is_success());
        assert_eq!(r.status(), SW_OK);
        assert_eq!(r.message(), "No errors");
        assert_eq!(r.outcome(), Outcome::Success);
        assert_eq!(r.clone().map(|v| v + 1).into_result(), Ok(8));

        let r = CommandResult::<u8>::failure(0x6986);
        assert!(!r.is_success());
        assert_eq!(r.message(), "Transaction rejected");
        assert_eq!(r.outcome(), Outcome::Rejected);
        assert_eq!(r.value(), None);

        let e = StatusError::unrecognized(ApduError::InvalidLength);
        assert_eq!(e.code, SW_UNRECOGNIZED);
        assert_eq!(e.message, "Invalid response length");
    }
}
