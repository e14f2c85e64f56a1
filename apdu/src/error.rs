// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU encoding and path errors

use core::fmt;

/// APDU encode / decode errors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ApduError {
    /// Buffer too short for the expected encoding
    InvalidLength,

    /// Field contents could not be decoded
    InvalidEncoding,
}

impl fmt::Display for ApduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApduError::InvalidLength => write!(f, "Invalid response length"),
            ApduError::InvalidEncoding => write!(f, "Invalid response encoding"),
        }
    }
}

impl From<encdec::Error> for ApduError {
    fn from(e: encdec::Error) -> Self {
        match e {
            encdec::Error::Length => ApduError::InvalidLength,
            #[allow(unreachable_patterns)]
            _ => ApduError::InvalidEncoding,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ApduError {}

/// Derivation path errors, each an `InvalidPathFormat` case
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PathError {
    /// Textual path does not start with `m`
    MissingRoot,

    /// Path does not have exactly five levels
    InvalidDepth(usize),

    /// Path component is not a number
    NotANumber(usize),

    /// Component would overflow into the hardening bit
    HardenedOverflow(usize),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingRoot => {
                write!(f, "Path should start with \"m\" (e.g \"m/44'/283'/0'/0/0\")")
            }
            PathError::InvalidDepth(n) => write!(
                f,
                "Invalid path, expected 5 levels and found {n} (e.g \"m/44'/283'/0'/0/0\")"
            ),
            PathError::NotANumber(i) => write!(f, "Invalid path: component {i} is not a number"),
            PathError::HardenedOverflow(i) => write!(
                f,
                "Incorrect child {i} value (bigger or equal to 0x80000000)"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PathError {}
