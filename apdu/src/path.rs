// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP-0044 derivation path encoding
//!
//! Paths have exactly five levels (`m/44'/283'/ACCOUNT'/CHANGE/INDEX`). The first three
//! levels are always hardened, the last two are hardened only when explicitly marked
//! in textual form.
//!
//! ## Encoding
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    PURPOSE | HARDENED (LE)                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                   COIN_TYPE | HARDENED (LE)                   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    ACCOUNT | HARDENED (LE)                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          CHANGE (LE)                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       ADDRESS_INDEX (LE)                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::{fmt, str::FromStr};

use byteorder::{ByteOrder, LittleEndian};
use encdec::{DecodeOwned, Encode};

use crate::{ApduError, PathError};

/// Hardening bit for derivation indices
pub const HARDENED: u32 = 0x8000_0000;

/// Number of levels in a derivation path
pub const PATH_DEPTH: usize = 5;

/// Encoded path length in bytes
pub const PATH_ENCODED_LEN: usize = PATH_DEPTH * 4;

/// BIP-0044 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-0044 coin type for Algorand
pub const ALGO_COIN_TYPE: u32 = 283;

/// Number of leading levels that are always hardened
const HARDENED_LEVELS: usize = 3;

/// Derivation path input, either textual or as logical (un-hardened) components
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PathInput<'a> {
    /// Textual path, `m/44'/283'/0'/0/0`
    Text(&'a str),
    /// Logical components `[44, 283, 0, 0, 0]`, hardening applied to the first three
    Components(&'a [u32]),
}

impl<'a> From<&'a str> for PathInput<'a> {
    fn from(s: &'a str) -> Self {
        PathInput::Text(s)
    }
}

impl<'a> From<&'a [u32]> for PathInput<'a> {
    fn from(c: &'a [u32]) -> Self {
        PathInput::Components(c)
    }
}

impl<'a> From<&'a [u32; PATH_DEPTH]> for PathInput<'a> {
    fn from(c: &'a [u32; PATH_DEPTH]) -> Self {
        PathInput::Components(&c[..])
    }
}

/// Validated derivation path, holding encoded (hardening applied) indices
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DerivationPath([u32; PATH_DEPTH]);

impl DerivationPath {
    /// Canonical Algorand path for an account id, `m/44'/283'/ACCOUNT'/0/0`
    pub fn algorand(account: u32) -> Result<Self, PathError> {
        Self::from_components(&[BIP44_PURPOSE, ALGO_COIN_TYPE, account, 0, 0])
    }

    /// Build a path from logical components
    pub fn from_components(c: &[u32]) -> Result<Self, PathError> {
        if c.len() != PATH_DEPTH {
            return Err(PathError::InvalidDepth(c.len()));
        }

        let mut p = [0u32; PATH_DEPTH];
        for (i, v) in c.iter().enumerate() {
            p[i] = match i < HARDENED_LEVELS {
                true if *v >= HARDENED => return Err(PathError::HardenedOverflow(i)),
                true => *v | HARDENED,
                false => *v,
            };
        }

        Ok(Self(p))
    }

    /// Parse a textual path
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if !s.starts_with('m') {
            return Err(PathError::MissingRoot);
        }

        // Root plus five levels
        let n = s.split('/').count();
        if n != PATH_DEPTH + 1 {
            return Err(PathError::InvalidDepth(n.saturating_sub(1)));
        }

        let mut p = [0u32; PATH_DEPTH];
        for (i, seg) in s.split('/').skip(1).enumerate() {
            let (digits, marked) = match seg.strip_suffix('\'') {
                Some(d) => (d, true),
                None => (seg, false),
            };

            let v = u32::from_str(digits).map_err(|_| PathError::NotANumber(i))?;

            let hardened = marked || i < HARDENED_LEVELS;
            if hardened && v >= HARDENED {
                return Err(PathError::HardenedOverflow(i));
            }

            p[i] = match hardened {
                true => v | HARDENED,
                false => v,
            };
        }

        Ok(Self(p))
    }

    /// Build a path from either input form
    pub fn from_input(input: PathInput) -> Result<Self, PathError> {
        match input {
            PathInput::Text(s) => Self::parse(s),
            PathInput::Components(c) => Self::from_components(c),
        }
    }

    /// Encoded indices (with hardening applied)
    pub fn indices(&self) -> &[u32; PATH_DEPTH] {
        &self.0
    }

    /// Serialize to the 20-byte wire format
    pub fn to_bytes(&self) -> [u8; PATH_ENCODED_LEN] {
        let mut b = [0u8; PATH_ENCODED_LEN];
        LittleEndian::write_u32_into(&self.0, &mut b);
        b
    }
}

/// Serialize a textual or component path into the 20-byte wire format
pub fn serialize<'a>(path: impl Into<PathInput<'a>>) -> Result<[u8; PATH_ENCODED_LEN], PathError> {
    DerivationPath::from_input(path.into()).map(|p| p.to_bytes())
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&[u32]> for DerivationPath {
    type Error = PathError;

    fn try_from(c: &[u32]) -> Result<Self, Self::Error> {
        Self::from_components(c)
    }
}

/// Display path in textual form, marking hardened levels with `'`
impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for v in &self.0 {
            match v & HARDENED != 0 {
                true => write!(f, "/{}'", v & !HARDENED)?,
                false => write!(f, "/{v}")?,
            }
        }
        Ok(())
    }
}

impl Encode for DerivationPath {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PATH_ENCODED_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < PATH_ENCODED_LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[..PATH_ENCODED_LEN].copy_from_slice(&self.to_bytes());

        Ok(PATH_ENCODED_LEN)
    }
}

/// Decode an encoded path, the leading levels must carry the hardening bit
impl DecodeOwned for DerivationPath {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < PATH_ENCODED_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut p = [0u32; PATH_DEPTH];
        LittleEndian::read_u32_into(&buff[..PATH_ENCODED_LEN], &mut p);

        if p[..HARDENED_LEVELS].iter().any(|v| v & HARDENED == 0) {
            return Err(ApduError::InvalidEncoding);
        }

        Ok((Self(p), PATH_ENCODED_LEN))
    }
}
